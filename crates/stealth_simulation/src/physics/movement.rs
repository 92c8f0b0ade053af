//! Rigid-body-like состояние персонажа и интеграция velocity
//!
//! Архитектура:
//! - PhysicsBody хранит linear/angular velocity (пишет steering)
//! - Headless: интегрируем velocity → Transform сами (без Rapier)
//! - С Rapier: синхронизируем PhysicsBody → rapier `Velocity`, интегрирует Rapier
//!
//! Детерминизм: всё в FixedUpdate, порядок систем через `.chain()`

use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;

/// Физическое тело персонажа (velocity владеет steering)
///
/// Силы применяются в режиме acceleration (не зависят от массы),
/// mass хранится для внешних систем (knockback и т.п.).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    /// Linear velocity (m/s)
    pub velocity: Vec3,
    /// Angular velocity (rad/s, scaled axis)
    pub angular_velocity: Vec3,
    /// Масса (kg)
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 70.0,
        }
    }
}

impl PhysicsBody {
    /// Acceleration-mode сила: Δv = a · dt (масса игнорируется)
    pub fn apply_acceleration(&mut self, acceleration: Vec3, delta: f32) {
        self.velocity += acceleration * delta;
    }

    /// Экспоненциальное затухание velocity к нулю (lerp с коэффициентом `rate`)
    ///
    /// `rate` зажат в [0, 1]: при больших damping·dt velocity сразу обнуляется.
    pub fn damp_towards_rest(&mut self, rate: f32) {
        self.velocity = self.velocity.lerp(Vec3::ZERO, rate.clamp(0.0, 1.0));
    }

    pub fn stop_rotation(&mut self) {
        self.angular_velocity = Vec3::ZERO;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Система интеграции velocity → Transform (headless режим, без Rapier)
///
/// Тела с rapier `Velocity` пропускаем: их двигает Rapier pipeline.
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &mut Transform), Without<Velocity>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;

        if body.angular_velocity != Vec3::ZERO {
            transform.rotate(Quat::from_scaled_axis(body.angular_velocity * delta));
        }
    }
}

/// Система синхронизации PhysicsBody → rapier `Velocity`
pub fn sync_velocity_to_rapier(mut query: Query<(&PhysicsBody, &mut Velocity)>) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
        rapier_velocity.angvel = body.angular_velocity;
    }
}
