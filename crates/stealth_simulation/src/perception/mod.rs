//! Perception module: зрение (два конуса + occlusion) + слух (NoiseBus) → awareness
//!
//! Поток данных кадра:
//! - StealthSet::Listen: dispatch_noise (бонусы от шума применяются сразу)
//! - StealthSet::Perceive: perception_tick (vision → integrate → AwarenessChanged)

pub mod awareness;
pub mod config;
pub mod systems;
pub mod vision;

#[cfg(test)]
mod vision_tests;

// Re-export основных типов
pub use awareness::{AwarenessChange, Hearing, Perception};
pub use config::{PerceptionConfig, MIN_PERCEPTION_TIME};
pub use systems::{
    acquire_intruder_target, dispatch_noise, emit_noise_now, perception_tick, start_perception_listeners,
    stop_removed_listeners, AwarenessChanged,
};
pub use vision::{evaluate_vision, Sightline, VisionCone, VisionSample};

use bevy::prelude::*;

use crate::noise::{emit_requested_noise, MakeNoise, NoiseBus, NoiseEmitter, NoiseEvent};
use crate::StealthSet;

/// Perception Plugin
///
/// Регистрирует NoiseBus и perception системы в Update.
/// Порядок выполнения:
/// 1. StealthSet::Listen: lifecycle подписок, захват цели, рассылка шума
/// 2. StealthSet::Perceive: vision + awareness integration
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NoiseBus>()
            .add_event::<MakeNoise>()
            .add_event::<NoiseEvent>()
            .add_event::<AwarenessChanged>()
            .register_type::<Perception>()
            .register_type::<NoiseEmitter>()
            .add_systems(
                Update,
                (
                    start_perception_listeners,
                    stop_removed_listeners,
                    acquire_intruder_target,
                    emit_requested_noise,
                    dispatch_noise,
                )
                    .chain()
                    .in_set(StealthSet::Listen),
            )
            .add_systems(Update, perception_tick.in_set(StealthSet::Perceive));
    }
}
