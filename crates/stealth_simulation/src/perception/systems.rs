//! Perception systems: noise dispatch, lifecycle, per-frame awareness tick

use bevy::prelude::*;

use super::awareness::{AwarenessChange, Perception};
use super::vision::evaluate_vision;
use crate::components::Intruder;
use crate::logger;
use crate::noise::{NoiseBus, NoiseEvent};
use crate::physics::{is_self_or_descendant, WorldProbe};

/// Событие: awareness наблюдателя пересекла порог
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AwarenessChanged {
    pub observer: Entity,
    pub change: AwarenessChange,
    /// Awareness сразу после пересечения
    pub awareness: f32,
}

/// Подписать новые Perception на NoiseBus
pub fn start_perception_listeners(
    mut added: Query<(Entity, &mut Perception), Added<Perception>>,
    mut bus: ResMut<NoiseBus>,
) {
    for (entity, mut perception) in added.iter_mut() {
        perception.start(entity, &mut bus);
        logger::log(&format!("👂 {:?} subscribed to noise bus", entity));
    }
}

/// Отписать entity, у которых Perception удалён (или entity despawned)
pub fn stop_removed_listeners(
    mut removed: RemovedComponents<Perception>,
    mut bus: ResMut<NoiseBus>,
) {
    for entity in removed.read() {
        if bus.unsubscribe(entity) {
            logger::log(&format!("🔇 {:?} unsubscribed from noise bus", entity));
        }
    }
}

/// Назначить Intruder'а целью perception без цели (или с исчезнувшей целью)
pub fn acquire_intruder_target(
    mut observers: Query<&mut Perception>,
    intruders: Query<Entity, With<Intruder>>,
) {
    let intruder = intruders.iter().next();

    for mut perception in observers.iter_mut() {
        let target_alive = perception
            .target
            .is_some_and(|target| intruders.contains(target));

        if !target_alive && perception.target != intruder {
            perception.target = intruder;
        }
    }
}

/// Разослать NoiseEvent'ы кадра подписчикам NoiseBus
///
/// Handler'ы только мутируют свою Perception и не имеют доступа к EventWriter<NoiseEvent>,
/// поэтому рекурсивной рассылки шума быть не может.
pub fn dispatch_noise(
    mut noises: EventReader<NoiseEvent>,
    bus: Res<NoiseBus>,
    mut listeners: Query<(&Transform, &mut Perception)>,
    mut changes: EventWriter<AwarenessChanged>,
) {
    for noise in noises.read() {
        bus.emit(noise, |listener, event| {
            let Ok((transform, mut perception)) = listeners.get_mut(listener) else {
                return;
            };

            let Some(hearing) = perception.hear(transform.translation, event) else {
                return;
            };

            if hearing.became_suspicious {
                logger::log(&format!(
                    "❓ {:?} heard noise at {:?} (loudness {:.1}) → suspicious",
                    listener, event.position, event.loudness
                ));
                changes.write(AwarenessChanged {
                    observer: listener,
                    change: AwarenessChange::BecameSuspicious,
                    awareness: perception.awareness(),
                });
            }
        });
    }
}

/// Разослать шум немедленно (вне расписания систем)
///
/// Для тестов и кода, у которого есть `&mut World`. Возвращает число уведомлённых подписчиков.
pub fn emit_noise_now(world: &mut World, event: NoiseEvent) -> usize {
    let Some(bus) = world.get_resource::<NoiseBus>().cloned() else {
        logger::log_warning("emit_noise_now: NoiseBus resource missing");
        return 0;
    };

    let mut suspicious = Vec::new();
    let notified = bus.emit(&event, |listener, noise| {
        let Some(position) = world.get::<Transform>(listener).map(|t| t.translation) else {
            return;
        };
        let Some(mut perception) = world.get_mut::<Perception>(listener) else {
            return;
        };

        if let Some(hearing) = perception.hear(position, noise) {
            if hearing.became_suspicious {
                suspicious.push((listener, perception.awareness()));
            }
        }
    });

    for (observer, awareness) in suspicious {
        world.send_event(AwarenessChanged {
            observer,
            change: AwarenessChange::BecameSuspicious,
            awareness,
        });
    }

    notified
}

/// Per-frame vision + awareness integration
pub fn perception_tick(
    mut observers: Query<(Entity, &Transform, &mut Perception)>,
    targets: Query<&Transform>,
    parents: Query<&ChildOf>,
    probe: WorldProbe,
    time: Res<Time>,
    mut changes: EventWriter<AwarenessChanged>,
) {
    let delta = time.delta_secs();

    probe.with(|geometry| {
        for (entity, transform, mut perception) in observers.iter_mut() {
            let sighting = perception.target.and_then(|target| {
                let target_position = targets.get(target).ok()?.translation;
                let sight = perception.sightline(entity, transform, target, target_position);
                let belongs_to_target = |hit: Entity| is_self_or_descendant(hit, target, &parents);
                let sample = evaluate_vision(&perception.config, &sight, geometry, &belongs_to_target)?;
                Some((sample, target_position))
            });

            for change in perception.integrate(sighting, delta) {
                logger::log(&format!(
                    "👁 {:?} awareness {:.2} → {:?}",
                    entity,
                    perception.awareness(),
                    change
                ));
                changes.write(AwarenessChanged {
                    observer: entity,
                    change,
                    awareness: perception.awareness(),
                });
            }
        }
    });
}
