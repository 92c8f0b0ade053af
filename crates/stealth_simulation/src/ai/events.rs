//! AI Events: смены режима guard'а

use bevy::prelude::*;

use super::components::GuardState;

/// Guard сменил режим поведения
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardStateChanged {
    pub guard: Entity,
    pub from: GuardState,
    pub to: GuardState,
}
