//! AI decision-making module
//!
//! Behavior controller guard'а: Patrol / Suspicious / Alerted.
//! Работает в Update (frame tick) после perception, до patrol/weapon.

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::{
    BehaviorConfig, BehaviorController, GuardActuators, GuardState, Observation, Transition,
};
pub use events::GuardStateChanged;
pub use systems::{behavior_tick, stop_firing_on_controller_removed};

use bevy::prelude::*;

use crate::StealthSet;

/// AI Plugin
///
/// Регистрирует behavior controller в Update (StealthSet::Decide).
/// Порядок выполнения:
/// 1. behavior_tick: FSM transitions + per-state логика
/// 2. stop_firing_on_controller_removed: отмена огня при удалении controller'а
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<GuardStateChanged>()
            .register_type::<BehaviorController>()
            .add_systems(
                Update,
                (behavior_tick, stop_firing_on_controller_removed)
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(StealthSet::Decide),
            );
    }
}
