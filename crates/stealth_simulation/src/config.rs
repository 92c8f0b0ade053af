//! Guard archetypes (TOML) + simulation config resource
//!
//! Archetype собирает все tunables guard'а. Отсутствующие секции/поля
//! берутся из Default (значения исходного тюнинга).

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::BehaviorConfig;
use crate::logger;
use crate::patrol::PatrolConfig;
use crate::perception::PerceptionConfig;
use crate::steering::{SteeringConfig, SteeringPresets};
use crate::weapon::BurstFireConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse archetype TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue { field: String, value: f32 },
}

/// Полный набор параметров guard'а
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardArchetype {
    pub name: String,
    pub perception: PerceptionConfig,
    pub steering: SteeringConfig,
    pub presets: SteeringPresets,
    pub behavior: BehaviorConfig,
    pub weapon: BurstFireConfig,
    pub patrol: PatrolConfig,
}

impl Default for GuardArchetype {
    fn default() -> Self {
        Self {
            name: "guard".to_string(),
            perception: PerceptionConfig::default(),
            steering: SteeringConfig::default(),
            presets: SteeringPresets::default(),
            behavior: BehaviorConfig::default(),
            weapon: BurstFireConfig::default(),
            patrol: PatrolConfig::default(),
        }
    }
}

impl GuardArchetype {
    /// Разобрать archetype из TOML строки (+ validate)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let archetype: GuardArchetype = toml::from_str(content)?;
        archetype.validate()?;
        Ok(archetype)
    }

    /// Загрузить archetype из файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let archetype = Self::from_toml_str(&content)?;
        logger::log_info(&format!("Loaded guard archetype '{}' from {:?}", archetype.name, path));
        Ok(archetype)
    }

    /// Отклонить NaN / бесконечности (sanitized() их не чинит)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.perception;
        let s = &self.steering;

        let fields = [
            ("perception.primary_fov", p.primary_fov),
            ("perception.primary_view_distance", p.primary_view_distance),
            ("perception.peripheral_fov", p.peripheral_fov),
            ("perception.peripheral_view_distance", p.peripheral_view_distance),
            ("perception.height_tolerance", p.height_tolerance),
            ("perception.eye_height", p.eye_height),
            ("perception.time_to_fully_spot", p.time_to_fully_spot),
            ("perception.time_to_forget", p.time_to_forget),
            ("perception.suspicious_threshold", p.suspicious_threshold),
            ("perception.hearing_radius", p.hearing_radius),
            ("perception.hearing_awareness_bonus", p.hearing_awareness_bonus),
            ("steering.max_speed", s.max_speed),
            ("steering.acceleration", s.acceleration),
            ("steering.damping", s.damping),
            ("steering.slow_down_distance", s.slow_down_distance),
            ("steering.stop_distance", s.stop_distance),
            ("steering.rotation_speed", s.rotation_speed),
            ("steering.avoid_radius", s.avoid_radius),
            ("steering.avoid_distance", s.avoid_distance),
            ("steering.avoid_strength", s.avoid_strength),
            ("steering.wander_weight", s.wander_weight),
            ("steering.wander_change_interval", s.wander_change_interval),
            ("steering.wander_angle_range", s.wander_angle_range),
            ("steering.wander_responsiveness", s.wander_responsiveness),
            ("behavior.lose_target_delay", self.behavior.lose_target_delay),
            ("weapon.fire_rate", self.weapon.fire_rate),
            ("weapon.burst_cooldown", self.weapon.burst_cooldown),
            ("patrol.waypoint_threshold", self.patrol.waypoint_threshold),
        ];

        if let Some(&(field, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                value,
            });
        }

        let presets = [
            ("patrol", &self.presets.patrol),
            ("suspicious", &self.presets.suspicious),
            ("alerted", &self.presets.alerted),
        ];
        for (mode, preset) in presets {
            if let Some((name, value)) = preset.fields().into_iter().find(|(_, value)| !value.is_finite()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("presets.{mode}.{name}"),
                    value,
                });
            }
        }

        Ok(())
    }

    /// Копия с зажатыми значениями (warning в лог, если что-то поменялось)
    pub fn sanitized(&self) -> Self {
        let sanitized = Self {
            name: self.name.clone(),
            perception: self.perception.sanitized(),
            steering: self.steering.sanitized(),
            presets: self.presets.sanitized(),
            behavior: self.behavior.sanitized(),
            weapon: self.weapon,
            patrol: PatrolConfig {
                waypoint_threshold: self.patrol.waypoint_threshold.max(0.0),
                ..self.patrol
            },
        };

        if &sanitized != self {
            logger::log_warning(&format!(
                "Guard archetype '{}' had out-of-range values; clamped",
                self.name
            ));
        }

        sanitized
    }
}

/// Параметры запуска симуляции
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота physics tick (FixedUpdate)
    pub physics_hz: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics_hz: 60.0,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GuardState;
    use crate::steering::BehaviorPreset;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let archetype = GuardArchetype::from_toml_str("").expect("empty archetype");
        assert_eq!(archetype, GuardArchetype::default());
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let toml = r#"
            name = "sniper"

            [perception]
            primary_view_distance = 40.0
            time_to_fully_spot = 0.8

            [behavior]
            initial_state = "Suspicious"

            [presets.alerted]
            max_speed = 3.0
            acceleration = 4.0
            rotation_speed = 2.0
            wander_weight = 0.0
            wander_change_interval = 2.0
            wander_angle_range = 35.0
            wander_responsiveness = 2.0
        "#;

        let archetype = GuardArchetype::from_toml_str(toml).expect("valid archetype");
        assert_eq!(archetype.name, "sniper");
        assert_eq!(archetype.perception.primary_view_distance, 40.0);
        assert_eq!(archetype.perception.primary_fov, 60.0);
        assert_eq!(archetype.behavior.initial_state, GuardState::Suspicious);
        assert_eq!(archetype.presets.alerted.max_speed, 3.0);
        assert_eq!(archetype.presets.patrol, SteeringPresets::default().patrol);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = GuardArchetype::from_toml_str("[perception\nprimary_fov = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let archetype = GuardArchetype {
            perception: PerceptionConfig {
                time_to_forget: f32::NAN,
                ..default()
            },
            ..default()
        };

        match archetype.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "perception.time_to_forget"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_preset_values_rejected() {
        let toml = r#"
            [presets.patrol]
            max_speed = 4.5
            acceleration = 6.0
            rotation_speed = 4.0
            wander_weight = 0.3
            wander_change_interval = 2.5
            wander_angle_range = nan
            wander_responsiveness = 1.5
        "#;

        match GuardArchetype::from_toml_str(toml) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "presets.patrol.wander_angle_range"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        let archetype = GuardArchetype {
            presets: SteeringPresets {
                alerted: BehaviorPreset {
                    max_speed: f32::INFINITY,
                    ..BehaviorPreset::ALERTED
                },
                ..default()
            },
            ..default()
        };
        match archetype.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "presets.alerted.max_speed"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_wander_values_rejected() {
        let result = GuardArchetype::from_toml_str("[steering]\nwander_weight = nan\n");
        match result {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "steering.wander_weight"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_sanitized_clamps_negative_values() {
        let archetype = GuardArchetype {
            steering: SteeringConfig {
                stop_distance: -1.0,
                max_speed: -5.0,
                ..default()
            },
            behavior: BehaviorConfig {
                lose_target_delay: -2.0,
                ..default()
            },
            ..default()
        }
        .sanitized();

        assert_eq!(archetype.steering.stop_distance, 0.0);
        assert_eq!(archetype.steering.max_speed, 0.0);
        assert_eq!(archetype.behavior.lose_target_delay, 0.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = GuardArchetype::load("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_bundled_archetypes_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/guards");
        for name in ["sentry.toml", "hunter.toml"] {
            let archetype = GuardArchetype::load(dir.join(name)).expect("bundled archetype");
            assert_eq!(archetype, archetype.sanitized());
        }
    }
}
