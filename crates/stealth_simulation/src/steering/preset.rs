//! Locomotion presets (patrol / suspicious / alerted)
//!
//! Preset (чистые данные) применяется к SteeringConfig целиком,
//! алгоритм steering от preset'а не меняется.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Набор locomotion параметров одного режима поведения
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct BehaviorPreset {
    pub max_speed: f32,
    pub acceleration: f32,
    pub rotation_speed: f32,
    pub wander_weight: f32,
    pub wander_change_interval: f32,
    pub wander_angle_range: f32,
    pub wander_responsiveness: f32,
}

impl BehaviorPreset {
    /// Медленно, умеренный wander
    pub const PATROL: Self = Self {
        max_speed: 4.5,
        acceleration: 6.0,
        rotation_speed: 4.0,
        wander_weight: 0.3,
        wander_change_interval: 2.5,
        wander_angle_range: 25.0,
        wander_responsiveness: 1.5,
    };

    /// Средняя скорость, сильный и частый wander
    pub const SUSPICIOUS: Self = Self {
        max_speed: 5.5,
        acceleration: 7.0,
        rotation_speed: 5.5,
        wander_weight: 0.6,
        wander_change_interval: 1.5,
        wander_angle_range: 45.0,
        wander_responsiveness: 2.5,
    };

    /// Быстро, без wander (остальные wander поля = базовые значения SteeringConfig)
    pub const ALERTED: Self = Self {
        max_speed: 7.5,
        acceleration: 10.0,
        rotation_speed: 7.0,
        wander_weight: 0.0,
        wander_change_interval: 2.0,
        wander_angle_range: 35.0,
        wander_responsiveness: 2.0,
    };
}

/// Три preset'а guard'а (по одному на режим)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringPresets {
    pub patrol: BehaviorPreset,
    pub suspicious: BehaviorPreset,
    pub alerted: BehaviorPreset,
}

impl Default for SteeringPresets {
    fn default() -> Self {
        Self {
            patrol: BehaviorPreset::PATROL,
            suspicious: BehaviorPreset::SUSPICIOUS,
            alerted: BehaviorPreset::ALERTED,
        }
    }
}

impl SteeringPresets {
    /// Копия с неотрицательными скоростями/весами
    pub fn sanitized(&self) -> Self {
        Self {
            patrol: self.patrol.sanitized(),
            suspicious: self.suspicious.sanitized(),
            alerted: self.alerted.sanitized(),
        }
    }
}

impl BehaviorPreset {
    /// Поля preset'а по имени (валидация конфигов)
    pub fn fields(&self) -> [(&'static str, f32); 7] {
        [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("rotation_speed", self.rotation_speed),
            ("wander_weight", self.wander_weight),
            ("wander_change_interval", self.wander_change_interval),
            ("wander_angle_range", self.wander_angle_range),
            ("wander_responsiveness", self.wander_responsiveness),
        ]
    }

    /// NaN → 0 (f32::max уже игнорирует NaN, clamp и abs нет)
    pub fn sanitized(&self) -> Self {
        let finite = |value: f32| if value.is_finite() { value } else { 0.0 };

        Self {
            max_speed: self.max_speed.max(0.0),
            acceleration: self.acceleration.max(0.0),
            rotation_speed: self.rotation_speed.max(0.0),
            wander_weight: finite(self.wander_weight).clamp(0.0, 1.0),
            wander_change_interval: self.wander_change_interval.max(0.0),
            wander_angle_range: finite(self.wander_angle_range).abs(),
            wander_responsiveness: self.wander_responsiveness.max(0.0),
        }
    }
}
