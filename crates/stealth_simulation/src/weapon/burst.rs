//! Burst fire: очереди по N выстрелов с паузой между очередями
//!
//! Явная countdown state machine вместо корутины: stop_firing() синхронно
//! возвращает в Idle, после него ни одного выстрела.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Минимальный интервал между выстрелами (сек)
pub const MIN_SHOT_INTERVAL: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstFireConfig {
    /// Интервал между выстрелами внутри очереди (сек)
    pub fire_rate: f32,
    pub bullets_per_burst: u32,
    /// Дополнительная пауза после очереди (сек)
    pub burst_cooldown: f32,
}

impl Default for BurstFireConfig {
    fn default() -> Self {
        Self {
            fire_rate: 0.4,
            bullets_per_burst: 3,
            burst_cooldown: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum FireState {
    #[default]
    Idle,
    Firing {
        /// Время до следующего выстрела
        countdown: f32,
        /// Выстрелов в текущей очереди
        fired_in_burst: u32,
    },
}

/// Оружие guard'а
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct BurstFire {
    pub config: BurstFireConfig,
    target: Option<Entity>,
    state: FireState,
}

impl BurstFire {
    pub fn new(config: BurstFireConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        self.target = target;
    }

    pub fn state(&self) -> FireState {
        self.state
    }

    pub fn is_firing(&self) -> bool {
        matches!(self.state, FireState::Firing { .. })
    }

    /// Начать огонь (no-op, если уже стреляем). Первый выстрел: на следующем tick.
    pub fn start_firing(&mut self) {
        if !self.is_firing() {
            self.state = FireState::Firing {
                countdown: 0.0,
                fired_in_burst: 0,
            };
        }
    }

    /// Прекратить огонь немедленно
    pub fn stop_firing(&mut self) {
        self.state = FireState::Idle;
    }

    /// Продвинуть таймеры; возвращает число выстрелов за этот tick
    pub fn tick(&mut self, delta: f32) -> u32 {
        let FireState::Firing {
            mut countdown,
            mut fired_in_burst,
        } = self.state
        else {
            return 0;
        };

        if self.config.bullets_per_burst == 0 {
            return 0;
        }

        let fire_rate = self.config.fire_rate.max(MIN_SHOT_INTERVAL);
        let cooldown = self.config.burst_cooldown.max(0.0);

        countdown -= delta.max(0.0);
        let mut shots = 0;

        while countdown <= 0.0 {
            shots += 1;
            fired_in_burst += 1;

            if fired_in_burst >= self.config.bullets_per_burst {
                fired_in_burst = 0;
                countdown += fire_rate + cooldown;
            } else {
                countdown += fire_rate;
            }
        }

        self.state = FireState::Firing {
            countdown,
            fired_in_burst,
        };
        shots
    }
}
