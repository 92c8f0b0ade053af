//! Акторы stealth симуляции: Guard (NPC) и Intruder (цель)

use bevy::prelude::*;

use crate::ai::BehaviorController;
use crate::noise::NoiseEmitter;
use crate::patrol::PatrolWalker;
use crate::perception::Perception;
use crate::physics::PhysicsBody;
use crate::steering::Steering;
use crate::weapon::BurstFire;

/// Guard: NPC с восприятием, FSM и steering
///
/// Автоматически добавляет всю "тройку" perception / controller / steering
/// плюс патруль, оружие и физическое тело через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    PhysicsBody,
    Perception,
    BehaviorController,
    Steering,
    PatrolWalker,
    BurstFire
)]
pub struct Guard {
    /// Отображаемое имя (логи)
    pub name: String,
}

impl Guard {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Intruder: цель, которую ищут guard'ы (игрок)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, PhysicsBody, NoiseEmitter)]
pub struct Intruder;
