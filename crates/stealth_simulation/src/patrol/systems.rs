//! Patrol system: выбор следующего узла → цель Steering

use bevy::prelude::*;

use super::graph::WaypointGraph;
use super::walker::PatrolWalker;
use crate::steering::{Steering, SteeringTarget};
use crate::DeterministicRng;

/// Продвинуть включённых patrol walker'ов
pub fn advance_patrol(
    mut walkers: Query<(&Transform, &mut PatrolWalker, &mut Steering)>,
    graph: Option<Res<WaypointGraph>>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let Some(graph) = graph else {
        return;
    };
    let delta = time.delta_secs();

    for (transform, mut walker, mut steering) in walkers.iter_mut() {
        if let Some(next) = walker.advance(transform.translation, &graph, delta, &mut rng.rng) {
            steering.set_target(Some(SteeringTarget::Point(next)));
        }
    }
}
