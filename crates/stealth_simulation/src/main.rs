//! Headless stealth симуляция
//!
//! Guard патрулирует квадрат, intruder крадётся мимо, шумит и попадается на глаза.
//! Печатает смены режима guard'а и выстрелы.

use bevy::prelude::*;
use stealth_simulation::{
    create_headless_app, log_error, spawn_guard, spawn_intruder, GuardArchetype, GuardStateChanged, Intruder,
    MakeNoise, ObstacleField, PhysicsBody, ShotFired, WaypointGraph,
};

const TICKS: u32 = 1200;
const RUN_NOISE_TICK: u32 = 300;

/// Intruder идёт с постоянной скоростью через патрульный квадрат
fn walk_intruder(mut intruders: Query<&mut PhysicsBody, With<Intruder>>) {
    for mut body in intruders.iter_mut() {
        body.velocity = Vec3::new(-1.2, 0.0, 0.0);
    }
}

fn report_transitions(mut transitions: EventReader<GuardStateChanged>, mut shots: EventReader<ShotFired>) {
    for transition in transitions.read() {
        println!(
            "Guard {:?}: {:?} → {:?}",
            transition.guard, transition.from, transition.to
        );
    }

    let fired = shots.read().count();
    if fired > 0 {
        println!("  {} shot(s) fired", fired);
    }
}

fn main() {
    let seed = 42;
    println!("Starting stealth headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_systems(Update, (walk_intruder, report_transitions));

    let archetype_path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/guards/sentry.toml");
    let archetype = GuardArchetype::load(archetype_path).unwrap_or_else(|error| {
        log_error(&format!("{error}; using default archetype"));
        GuardArchetype::default()
    });

    let world = app.world_mut();
    world.insert_resource(WaypointGraph::looped([
        Vec3::new(-8.0, 0.0, -8.0),
        Vec3::new(8.0, 0.0, -8.0),
        Vec3::new(8.0, 0.0, 8.0),
        Vec3::new(-8.0, 0.0, 8.0),
    ]));
    world.insert_resource(
        ObstacleField::new()
            .with_cuboid(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 2.0))
            .with_sphere(Vec3::new(12.0, 0.0, 0.0), 1.5),
    );

    let guard = spawn_guard(world, &archetype, Transform::from_xyz(-8.0, 0.0, -8.0));
    let intruder = spawn_intruder(world, Transform::from_xyz(20.0, 0.0, 4.0));
    println!("Guard {:?} vs intruder {:?}", guard, intruder);

    for tick in 0..TICKS {
        if tick == RUN_NOISE_TICK {
            app.world_mut().send_event(MakeNoise {
                emitter: intruder,
                multiplier: stealth_simulation::noise::RUN_NOISE,
            });
        }

        app.update();

        if tick % 200 == 0 {
            let world = app.world();
            if let (Some(guard_transform), Some(perception)) = (
                world.get::<Transform>(guard),
                world.get::<stealth_simulation::Perception>(guard),
            ) {
                println!(
                    "Tick {}: guard at {:.1?}, awareness {:.2}",
                    tick,
                    guard_transform.translation,
                    perception.awareness()
                );
            }
        }
    }

    println!("Simulation complete!");
}
