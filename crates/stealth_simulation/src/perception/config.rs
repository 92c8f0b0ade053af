//! Perception tuning (vision cones, awareness rates, hearing)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Минимальное время (сек) для делителей awareness rate
pub const MIN_PERCEPTION_TIME: f32 = 0.01;

/// Параметры восприятия guard'а
///
/// Углы: полные FOV в градусах (half-angle = fov / 2).
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Primary cone: узкое центральное зрение
    pub primary_fov: f32,
    pub primary_view_distance: f32,
    /// Peripheral cone: широкое, но короткое
    pub peripheral_fov: f32,
    pub peripheral_view_distance: f32,
    /// Допуск по вертикали между глазами и целью (метры)
    pub height_tolerance: f32,
    /// Высота глаз над origin персонажа
    pub eye_height: f32,

    /// Время (сек) прямого взгляда до полного обнаружения
    pub time_to_fully_spot: f32,
    /// Время (сек) полного забывания без стимулов
    pub time_to_forget: f32,
    /// Порог awareness для Suspicious
    pub suspicious_threshold: f32,

    /// Радиус слышимости обычных звуков (метры)
    pub hearing_radius: f32,
    /// Прибавка awareness за услышанный звук (при distance = 0)
    pub hearing_awareness_bonus: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            primary_fov: 60.0,
            primary_view_distance: 25.0,
            peripheral_fov: 120.0,
            peripheral_view_distance: 12.0,
            height_tolerance: 2.0,
            eye_height: 0.0,
            time_to_fully_spot: 1.5,
            time_to_forget: 3.0,
            suspicious_threshold: 0.2,
            hearing_radius: 15.0,
            hearing_awareness_bonus: 0.3,
        }
    }
}

impl PerceptionConfig {
    /// Скорость роста awareness (1/сек) при vision factor = 1
    pub fn gain_rate(&self) -> f32 {
        1.0 / self.time_to_fully_spot.max(MIN_PERCEPTION_TIME)
    }

    /// Скорость затухания awareness (1/сек)
    pub fn decay_rate(&self) -> f32 {
        1.0 / self.time_to_forget.max(MIN_PERCEPTION_TIME)
    }

    /// Копия с зажатыми в допустимые диапазоны значениями
    pub fn sanitized(&self) -> Self {
        Self {
            primary_fov: self.primary_fov.clamp(0.0, 360.0),
            primary_view_distance: self.primary_view_distance.max(0.0),
            peripheral_fov: self.peripheral_fov.clamp(0.0, 360.0),
            peripheral_view_distance: self.peripheral_view_distance.max(0.0),
            height_tolerance: self.height_tolerance.max(0.0),
            eye_height: self.eye_height,
            time_to_fully_spot: self.time_to_fully_spot.max(MIN_PERCEPTION_TIME),
            time_to_forget: self.time_to_forget.max(MIN_PERCEPTION_TIME),
            suspicious_threshold: self.suspicious_threshold.clamp(0.0, 1.0),
            hearing_radius: self.hearing_radius.max(0.0),
            hearing_awareness_bonus: self.hearing_awareness_bonus.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_never_divide_by_zero() {
        let config = PerceptionConfig {
            time_to_fully_spot: 0.0,
            time_to_forget: -4.0,
            ..default()
        };

        assert!(config.gain_rate().is_finite());
        assert!(config.decay_rate().is_finite());
        assert_eq!(config.gain_rate(), 1.0 / MIN_PERCEPTION_TIME);
    }

    #[test]
    fn test_sanitized_clamps_ranges() {
        let config = PerceptionConfig {
            primary_fov: 500.0,
            peripheral_view_distance: -3.0,
            suspicious_threshold: 1.7,
            hearing_awareness_bonus: -0.5,
            ..default()
        }
        .sanitized();

        assert_eq!(config.primary_fov, 360.0);
        assert_eq!(config.peripheral_view_distance, 0.0);
        assert_eq!(config.suspicious_threshold, 1.0);
        assert_eq!(config.hearing_awareness_bonus, 0.0);
    }
}
