//! Steering unit: target point → acceleration + facing (один physics step)
//!
//! Шаги: idle damping → arrival → stop state → base direction → wander →
//! obstacle avoidance → clamped acceleration → facing slerp.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::preset::BehaviorPreset;
use crate::math::{inverse_lerp, project_on_plane, rotate_yaw_pitch, slerp_direction};
use crate::physics::{PhysicsBody, SpatialQuery};

/// Параметры steering (активный preset + постоянная часть)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    // Movement
    pub max_speed: f32,
    pub acceleration: f32,
    pub damping: f32,

    // Arrival
    pub slow_down_distance: f32,
    pub stop_distance: f32,

    pub rotation_speed: f32,

    // Obstacle avoidance
    pub avoid_radius: f32,
    pub avoid_distance: f32,
    pub avoid_strength: f32,

    // Wander
    pub wander_weight: f32,
    pub wander_change_interval: f32,
    pub wander_angle_range: f32,
    pub wander_responsiveness: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 6.0,
            acceleration: 8.0,
            damping: 1.2,
            slow_down_distance: 2.5,
            stop_distance: 0.5,
            rotation_speed: 6.0,
            avoid_radius: 1.0,
            avoid_distance: 4.0,
            avoid_strength: 3.0,
            wander_weight: 0.4,
            wander_change_interval: 2.0,
            wander_angle_range: 35.0,
            wander_responsiveness: 2.0,
        }
    }
}

impl SteeringConfig {
    /// Заменить preset-часть параметров
    pub fn apply_preset(&mut self, preset: &BehaviorPreset) {
        self.max_speed = preset.max_speed;
        self.acceleration = preset.acceleration;
        self.rotation_speed = preset.rotation_speed;
        self.wander_weight = preset.wander_weight;
        self.wander_change_interval = preset.wander_change_interval;
        self.wander_angle_range = preset.wander_angle_range;
        self.wander_responsiveness = preset.wander_responsiveness;
    }

    /// Текущая preset-часть параметров
    pub fn preset(&self) -> BehaviorPreset {
        BehaviorPreset {
            max_speed: self.max_speed,
            acceleration: self.acceleration,
            rotation_speed: self.rotation_speed,
            wander_weight: self.wander_weight,
            wander_change_interval: self.wander_change_interval,
            wander_angle_range: self.wander_angle_range,
            wander_responsiveness: self.wander_responsiveness,
        }
    }

    pub fn sanitized(&self) -> Self {
        let mut config = Self {
            damping: self.damping.max(0.0),
            stop_distance: self.stop_distance.max(0.0),
            avoid_radius: self.avoid_radius.max(0.0),
            avoid_distance: self.avoid_distance.max(0.0),
            avoid_strength: self.avoid_strength.max(0.0),
            ..*self
        };
        config.slow_down_distance = self.slow_down_distance.max(config.stop_distance);
        config.apply_preset(&self.preset().sanitized());
        config
    }
}

/// Цель steering: фиксированная точка или entity (позиция читается каждый step)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum SteeringTarget {
    Point(Vec3),
    Entity(Entity),
}

/// Входные данные одного step
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Разрешённая позиция цели (None: цели нет или она исчезла)
    pub target_position: Option<Vec3>,
    pub delta: f32,
    /// Entity тела (исключается из avoidance probe)
    pub body: Option<Entity>,
}

/// Результат step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringOutcome {
    /// Нет цели: idle damping
    Idle,
    /// Внутри stop_distance: stop state
    Arrived,
    /// Движение к цели; `facing`: новая ориентация тела
    Driving { desired_direction: Vec3, facing: Quat },
}

/// Steering компонент guard'а
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Steering {
    pub config: SteeringConfig,
    target: Option<SteeringTarget>,
    look_direction: Option<Vec3>,
    wander_intent: Option<Vec3>,
    wander_timer: f32,
}

impl Default for Steering {
    fn default() -> Self {
        Self::new(SteeringConfig::default())
    }
}

impl Steering {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            target: None,
            look_direction: None,
            wander_intent: None,
            wander_timer: config.wander_change_interval,
        }
    }

    pub fn target(&self) -> Option<SteeringTarget> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<SteeringTarget>) {
        self.target = target;
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn apply_preset(&mut self, preset: &BehaviorPreset) {
        self.config.apply_preset(preset);
    }

    pub fn look_direction(&self) -> Option<Vec3> {
        self.look_direction
    }

    pub fn wander_intent(&self) -> Option<Vec3> {
        self.wander_intent
    }

    /// Один physics step
    ///
    /// Пишет velocity в `body`; ориентацию возвращает в `SteeringOutcome::Driving`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        context: &SteeringContext,
        body: &mut PhysicsBody,
        geometry: &dyn SpatialQuery,
        rng: &mut R,
    ) -> SteeringOutcome {
        let delta = context.delta.max(0.0);
        let config = self.config;

        let forward = context.forward.normalize_or_zero();
        let look = *self.look_direction.get_or_insert(forward);
        self.wander_intent.get_or_insert(forward);

        let Some(target) = context.target_position else {
            body.damp_towards_rest(config.damping * delta);
            body.stop_rotation();
            return SteeringOutcome::Idle;
        };

        let to_target = target - context.position;
        let distance = to_target.length();

        let speed_scale = if distance <= config.slow_down_distance {
            inverse_lerp(config.stop_distance, config.slow_down_distance, distance)
        } else {
            1.0
        };

        let base_direction = to_target.normalize_or_zero();
        if distance <= config.stop_distance || base_direction == Vec3::ZERO {
            body.damp_towards_rest(config.damping * delta);
            body.stop_rotation();
            return SteeringOutcome::Arrived;
        }

        let mut desired = base_direction;

        if config.wander_weight > 0.0 {
            desired = self.apply_wander(desired, forward, delta, rng);
        }

        desired = Self::avoid_obstacles(&config, desired, context, geometry);

        // Velocity control (acceleration mode)
        let desired_velocity = desired * config.max_speed * speed_scale;
        let velocity_delta = desired_velocity - body.velocity;
        let acceleration = velocity_delta.clamp_length_max(config.acceleration.max(0.0));
        body.apply_acceleration(acceleration, delta);

        // Facing
        let new_look = slerp_direction(look, desired, config.rotation_speed * delta);
        let new_look = if new_look == Vec3::ZERO { look } else { new_look };
        self.look_direction = Some(new_look);

        let facing = Transform::IDENTITY.looking_to(new_look, context.up).rotation;

        SteeringOutcome::Driving {
            desired_direction: desired,
            facing,
        }
    }

    /// Двухэтапный wander: blend к intent, затем плавное приближение
    fn apply_wander<R: Rng + ?Sized>(&mut self, desired: Vec3, forward: Vec3, delta: f32, rng: &mut R) -> Vec3 {
        let config = &self.config;

        self.wander_timer -= delta;
        if self.wander_timer <= 0.0 {
            self.wander_timer = config.wander_change_interval;

            // gen_range паникует на NaN/∞ границах
            let range = if config.wander_angle_range.is_finite() {
                config.wander_angle_range.abs()
            } else {
                0.0
            };
            let yaw = rng.gen_range(-range..=range);
            let pitch = rng.gen_range(-range..=range);

            let intent = rotate_yaw_pitch(forward, yaw, pitch);
            if intent != Vec3::ZERO {
                self.wander_intent = Some(intent);
            }
        }

        let intent = self.wander_intent.unwrap_or(desired);
        let blended = slerp_direction(desired, intent, config.wander_weight);
        let eased = slerp_direction(desired, blended, config.wander_responsiveness * delta);

        if eased == Vec3::ZERO {
            desired
        } else {
            eased
        }
    }

    /// Sphere sweep вперёд; при попадании добавить скольжение вдоль поверхности
    fn avoid_obstacles(
        config: &SteeringConfig,
        desired: Vec3,
        context: &SteeringContext,
        geometry: &dyn SpatialQuery,
    ) -> Vec3 {
        let Ok(direction) = Dir3::new(desired) else {
            return desired;
        };

        let Some(hit) = geometry.cast_sphere(
            context.position,
            config.avoid_radius,
            direction,
            config.avoid_distance,
            context.body,
        ) else {
            return desired;
        };

        let slide = project_on_plane(desired, hit.normal).normalize_or_zero();
        let adjusted = (desired + slide * config.avoid_strength).normalize_or_zero();

        if adjusted == Vec3::ZERO {
            desired
        } else {
            adjusted
        }
    }
}
