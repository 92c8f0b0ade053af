//! Steering system (FixedUpdate): Steering + PhysicsBody → velocity + rotation

use bevy::prelude::*;

use super::unit::{Steering, SteeringContext, SteeringOutcome, SteeringTarget};
use crate::physics::{PhysicsBody, WorldProbe};
use crate::DeterministicRng;

/// Physics step всех steering агентов
///
/// Цели-entity резолвятся до мутаций (цель может сама быть steering агентом).
/// Исчезнувшая цель = нет цели (idle damping).
pub fn steer_agents(
    mut agents: Query<(Entity, &mut Transform, &mut PhysicsBody, &mut Steering)>,
    others: Query<&Transform, Without<Steering>>,
    probe: WorldProbe,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    let resolved: Vec<(Entity, Option<Vec3>)> = agents
        .iter()
        .map(|(entity, _, _, steering)| {
            let target_position = steering.target().and_then(|target| match target {
                SteeringTarget::Point(point) => Some(point),
                SteeringTarget::Entity(target) => agents
                    .get(target)
                    .ok()
                    .map(|(_, transform, _, _)| transform.translation)
                    .or_else(|| others.get(target).ok().map(|transform| transform.translation)),
            });
            (entity, target_position)
        })
        .collect();

    probe.with(|geometry| {
        for (entity, target_position) in resolved {
            let Ok((_, mut transform, mut body, mut steering)) = agents.get_mut(entity) else {
                continue;
            };

            let context = SteeringContext {
                position: transform.translation,
                forward: transform.forward().as_vec3(),
                up: transform.up().as_vec3(),
                target_position,
                delta,
                body: Some(entity),
            };

            if let SteeringOutcome::Driving { facing, .. } =
                steering.step(&context, &mut body, geometry, &mut rng.rng)
            {
                transform.rotation = facing;
            }
        }
    });
}
