//! Noise emitter компонент (шаги, бег, выстрелы, удары о стены)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::bus::NoiseEvent;

/// Множители громкости для типовых действий
pub const WALK_NOISE: f32 = 1.0;
pub const RUN_NOISE: f32 = 3.0;
pub const GUNSHOT_NOISE: f32 = 5.0;

/// Источник шума
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct NoiseEmitter {
    /// Базовый радиус громкости (метры)
    pub base_loudness: f32,
}

impl Default for NoiseEmitter {
    fn default() -> Self {
        Self { base_loudness: 10.0 }
    }
}

impl NoiseEmitter {
    /// Собрать NoiseEvent для действия с множителем громкости
    pub fn noise(&self, position: Vec3, source: Entity, multiplier: f32) -> NoiseEvent {
        NoiseEvent::new(position, self.base_loudness * multiplier.max(0.0), Some(source))
    }
}

/// Запрос "нашуметь" от entity с NoiseEmitter (шаги, бег, выстрел)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MakeNoise {
    pub emitter: Entity,
    /// Множитель громкости (WALK_NOISE, RUN_NOISE, GUNSHOT_NOISE)
    pub multiplier: f32,
}

/// System: MakeNoise → NoiseEvent (позиция и громкость берутся с emitter'а)
pub fn emit_requested_noise(
    mut requests: EventReader<MakeNoise>,
    emitters: Query<(&Transform, &NoiseEmitter)>,
    mut noises: EventWriter<NoiseEvent>,
) {
    for request in requests.read() {
        let Ok((transform, emitter)) = emitters.get(request.emitter) else {
            continue;
        };
        noises.write(emitter.noise(transform.translation, request.emitter, request.multiplier));
    }
}
