//! Weapon system: tick BurstFire → ShotFired события

use bevy::prelude::*;

use super::burst::BurstFire;
use crate::logger;

/// Событие выстрела (баллистика/урон вне этого модуля)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShotFired {
    pub shooter: Entity,
    pub target: Option<Entity>,
    pub origin: Vec3,
    /// Текущее направление взгляда стрелка (наведение делает Steering)
    pub direction: Dir3,
}

pub fn fire_weapons(
    mut weapons: Query<(Entity, &Transform, &mut BurstFire)>,
    time: Res<Time>,
    mut shots: EventWriter<ShotFired>,
) {
    let delta = time.delta_secs();

    for (entity, transform, mut weapon) in weapons.iter_mut() {
        let fired = weapon.tick(delta);

        for _ in 0..fired {
            shots.write(ShotFired {
                shooter: entity,
                target: weapon.target(),
                origin: transform.translation,
                direction: transform.forward(),
            });
        }

        if fired > 0 {
            logger::log(&format!("💥 {:?} fired {} shot(s)", entity, fired));
        }
    }
}
