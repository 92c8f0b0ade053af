//! Behavior systems: perception snapshot → FSM tick → actuators

use bevy::prelude::*;

use crate::ai::components::{BehaviorController, GuardActuators, Observation};
use crate::ai::events::GuardStateChanged;
use crate::logger;
use crate::patrol::{PatrolWalker, WaypointGraph};
use crate::perception::Perception;
use crate::physics::{is_self_or_descendant, WorldProbe};
use crate::steering::Steering;
use crate::weapon::BurstFire;
use crate::DeterministicRng;

/// System: FSM transitions + per-state logic (frame tick, после perception)
pub fn behavior_tick(
    mut guards: Query<(
        Entity,
        &Transform,
        &Perception,
        &mut BehaviorController,
        &mut Steering,
        Option<&mut PatrolWalker>,
        Option<&mut BurstFire>,
    )>,
    targets: Query<&Transform>,
    parents: Query<&ChildOf>,
    graph: Option<Res<WaypointGraph>>,
    probe: WorldProbe,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    mut transitions: EventWriter<GuardStateChanged>,
) {
    let delta = time.delta_secs();
    let target_exists = |entity: Entity| targets.contains(entity);

    probe.with(|geometry| {
        for (entity, transform, perception, mut controller, mut steering, mut patrol, mut weapon) in guards.iter_mut() {
            let has_direct_visual = perception.target.is_some_and(|target| {
                let Ok(target_transform) = targets.get(target) else {
                    return false;
                };
                let sight = perception.sightline(entity, transform, target, target_transform.translation);
                perception.has_direct_visual(&sight, geometry, &|hit| is_self_or_descendant(hit, target, &parents))
            });

            let observation = Observation::from_perception(perception, has_direct_visual);

            let mut actuators = GuardActuators {
                position: transform.translation,
                steering: &mut *steering,
                patrol: patrol.as_deref_mut(),
                weapon: weapon.as_deref_mut(),
                graph: graph.as_deref(),
                rng: &mut rng.rng,
            };

            if let Some(transition) = controller.tick(&observation, delta, &mut actuators, &target_exists) {
                logger::log_info(&format!(
                    "🚨 {:?} STATE {:?} → {:?}",
                    entity, transition.from, transition.to
                ));
                transitions.write(GuardStateChanged {
                    guard: entity,
                    from: transition.from,
                    to: transition.to,
                });
            }
        }
    });
}

/// System: controller удалён (или guard despawned) → прекратить огонь
pub fn stop_firing_on_controller_removed(
    mut removed: RemovedComponents<BehaviorController>,
    mut weapons: Query<&mut BurstFire>,
) {
    for entity in removed.read() {
        if let Ok(mut weapon) = weapons.get_mut(entity) {
            weapon.stop_firing();
        }
    }
}
