//! Perception component: awareness [0, 1] + edge-triggered события
//!
//! Awareness растёт от прямого взгляда (gain × vision factor × dt),
//! падает без него (decay × dt), получает разовые бонусы от шума.
//! События (suspicious / fully spotted / lost) срабатывают только на пересечении порогов.

use bevy::prelude::*;

use super::config::PerceptionConfig;
use super::vision::{evaluate_vision, Sightline, VisionSample};
use crate::math::inverse_lerp;
use crate::noise::{NoiseBus, NoiseEvent};
use crate::physics::SpatialQuery;

/// Пересечение порога awareness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AwarenessChange {
    /// threshold ≤ awareness < 1 (вход в зону подозрения)
    BecameSuspicious,
    /// awareness ≥ 1
    FullySpotted,
    /// Выход из зоны подозрения вниз (awareness < threshold)
    LostSuspicion,
}

/// Результат обработки услышанного шума
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hearing {
    /// Фактически добавленная awareness (до clamp)
    pub bonus: f32,
    pub became_suspicious: bool,
}

/// Восприятие guard'а
///
/// Живёт на guard entity. Цель (`target`) назначается системой захвата Intruder'а.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub config: PerceptionConfig,
    /// Наблюдаемая цель (None: смотреть не на кого, awareness затухает)
    pub target: Option<Entity>,

    awareness: f32,
    was_suspicious: bool,
    was_fully_aware: bool,
    last_known_position: Option<Vec3>,
    listening: bool,
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(PerceptionConfig::default())
    }
}

impl Perception {
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            config,
            target: None,
            awareness: 0.0,
            was_suspicious: false,
            was_fully_aware: false,
            last_known_position: None,
            listening: false,
        }
    }

    pub fn awareness(&self) -> f32 {
        self.awareness
    }

    /// threshold ≤ awareness < 1
    pub fn is_suspicious(&self) -> bool {
        self.awareness >= self.config.suspicious_threshold && self.awareness < 1.0
    }

    pub fn is_fully_aware(&self) -> bool {
        self.awareness >= 1.0
    }

    pub fn last_known_position(&self) -> Option<Vec3> {
        self.last_known_position
    }

    pub fn has_last_known_position(&self) -> bool {
        self.last_known_position.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Подписаться на NoiseBus (idempotent)
    pub fn start(&mut self, me: Entity, bus: &mut NoiseBus) {
        bus.subscribe(me);
        self.listening = true;
    }

    /// Отписаться от NoiseBus (idempotent)
    pub fn stop(&mut self, me: Entity, bus: &mut NoiseBus) {
        bus.unsubscribe(me);
        self.listening = false;
    }

    /// Построить взгляд из transform наблюдателя на позицию цели
    pub fn sightline(
        &self,
        observer: Entity,
        transform: &Transform,
        target: Entity,
        target_position: Vec3,
    ) -> Sightline {
        let eye = transform.translation + transform.rotation * Vec3::new(0.0, self.config.eye_height, 0.0);

        Sightline {
            eye,
            forward: transform.forward(),
            target_position,
            target,
            observer: Some(observer),
        }
    }

    /// Видна ли цель прямо сейчас (без изменения состояния)
    pub fn has_direct_visual(
        &self,
        sight: &Sightline,
        geometry: &dyn SpatialQuery,
        belongs_to_target: &dyn Fn(Entity) -> bool,
    ) -> bool {
        evaluate_vision(&self.config, sight, geometry, belongs_to_target).is_some()
    }

    /// Интегрировать один кадр
    ///
    /// `sighting`: результат vision evaluation + позиция цели (если видна).
    /// `None` (цель не видна или цели нет вообще) всегда означает затухание:
    /// awareness без цели не замораживается, а падает со скоростью forget.
    /// Возвращает пересечения порогов в порядке: Suspicious, FullySpotted, LostSuspicion.
    pub fn integrate(
        &mut self,
        sighting: Option<(VisionSample, Vec3)>,
        delta: f32,
    ) -> Vec<AwarenessChange> {
        let delta = delta.max(0.0);

        let change = match sighting {
            Some((sample, target_position)) => {
                self.last_known_position = Some(target_position);
                self.config.gain_rate() * sample.factor.max(0.0) * delta
            }
            None => -self.config.decay_rate() * delta,
        };

        self.set_awareness(self.awareness + change);
        self.detect_crossings()
    }

    /// Услышать шум
    ///
    /// None: шум за пределами слышимости (hearing_radius + loudness).
    /// FullySpotted от шума не срабатывает; это решит следующий integrate().
    pub fn hear(&mut self, listener_position: Vec3, event: &NoiseEvent) -> Option<Hearing> {
        let distance = listener_position.distance(event.position);
        let audible_range = self.config.hearing_radius + event.loudness;

        if distance > audible_range {
            return None;
        }

        let proximity = inverse_lerp(audible_range, 0.0, distance);
        let bonus = self.config.hearing_awareness_bonus * proximity;

        self.set_awareness(self.awareness + bonus);
        self.last_known_position = Some(event.position);

        let became_suspicious = !self.was_suspicious && self.is_suspicious();
        if became_suspicious {
            self.was_suspicious = true;
        }

        Some(Hearing {
            bonus,
            became_suspicious,
        })
    }

    /// Сбросить awareness и кэш порогов (без событий)
    pub fn reset(&mut self) {
        self.awareness = 0.0;
        self.was_suspicious = false;
        self.was_fully_aware = false;
        self.last_known_position = None;
    }

    fn set_awareness(&mut self, value: f32) {
        self.awareness = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    fn detect_crossings(&mut self) -> Vec<AwarenessChange> {
        let mut crossings = Vec::new();
        let suspicious_now = self.is_suspicious();
        let fully_now = self.is_fully_aware();

        if suspicious_now && !self.was_suspicious {
            crossings.push(AwarenessChange::BecameSuspicious);
        }

        if fully_now && !self.was_fully_aware {
            crossings.push(AwarenessChange::FullySpotted);
        }

        // Lost только при падении ниже порога (а не при переходе в fully aware)
        if self.was_suspicious && !suspicious_now && !fully_now {
            crossings.push(AwarenessChange::LostSuspicion);
        }

        self.was_suspicious = suspicious_now;
        self.was_fully_aware = fully_now;
        crossings
    }
}
