//! Stealth Simulation Core
//!
//! ECS-симуляция stealth NPC на Bevy 0.16 (headless)
//!
//! Каждый guard = тройка Perception → BehaviorController → Steering:
//! - Update (frame tick): шум, зрение, awareness, FSM, патруль, оружие
//! - FixedUpdate (physics tick): steering → интеграция velocity

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod config;
pub mod logger;
pub mod math;
pub mod noise;
pub mod patrol;
pub mod perception;
pub mod physics;
pub mod steering;
pub mod weapon;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, BehaviorConfig, BehaviorController, GuardState, GuardStateChanged};
pub use components::{Guard, Intruder};
pub use config::{ConfigError, GuardArchetype, SimulationConfig};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, ConsoleLogger, LogLevel, LogPrinter,
    MemoryLogger,
};
pub use noise::{MakeNoise, NoiseBus, NoiseEmitter, NoiseEvent};
pub use patrol::{PatrolWalker, Waypoint, WaypointGraph};
pub use perception::{emit_noise_now, AwarenessChange, AwarenessChanged, Perception, PerceptionPlugin};
pub use physics::{ObstacleField, PhysicsBody};
pub use steering::{BehaviorPreset, Steering, SteeringPresets, SteeringTarget};
pub use weapon::{BurstFire, ShotFired};

/// Порядок frame tick (Update)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StealthSet {
    /// Подписки, захват цели, рассылка шума
    Listen,
    /// Vision + awareness
    Perceive,
    /// Behavior FSM
    Decide,
    /// Патруль + оружие
    Act,
}

/// Порядок physics tick (FixedUpdate)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Steer,
    Integrate,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Читает `SimulationConfig` (если уже вставлен), иначе default.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .copied()
            .unwrap_or_default();

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(config.seed));
        }

        app
            // Fixed timestep для physics tick
            .insert_resource(Time::<Fixed>::from_hz(config.physics_hz))
            .insert_resource(config)
            .add_event::<ShotFired>()
            .register_type::<Guard>()
            .register_type::<Intruder>()
            .register_type::<Steering>()
            .register_type::<PhysicsBody>()
            .register_type::<PatrolWalker>()
            .register_type::<BurstFire>()
            .configure_sets(
                Update,
                (
                    StealthSet::Listen,
                    StealthSet::Perceive,
                    StealthSet::Decide,
                    StealthSet::Act,
                )
                    .chain(),
            )
            .configure_sets(FixedUpdate, (PhysicsSet::Steer, PhysicsSet::Integrate).chain())
            // Подсистемы
            .add_plugins((PerceptionPlugin, AIPlugin))
            .add_systems(
                Update,
                (patrol::advance_patrol, weapon::fire_weapons)
                    .chain()
                    .in_set(StealthSet::Act),
            )
            .add_systems(FixedUpdate, steering::steer_agents.in_set(PhysicsSet::Steer))
            .add_systems(
                FixedUpdate,
                (
                    physics::integrate_velocity_to_transform,
                    physics::sync_velocity_to_rapier,
                )
                    .chain()
                    .in_set(PhysicsSet::Integrate),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: каждый `app.update()` = один physics tick.
pub fn create_headless_app(seed: u64) -> App {
    let config = SimulationConfig {
        seed,
        ..default()
    };

    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(config)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / config.physics_hz,
        )))
        .add_plugins(SimulationPlugin);

    app
}

/// Заспавнить guard'а по archetype (значения предварительно зажимаются)
pub fn spawn_guard(world: &mut World, archetype: &GuardArchetype, transform: Transform) -> Entity {
    let archetype = archetype.sanitized();

    world
        .spawn((
            Guard::new(archetype.name.clone()),
            transform,
            Perception::new(archetype.perception),
            Steering::new(archetype.steering),
            BehaviorController::new(archetype.behavior, archetype.presets),
            PatrolWalker::new(archetype.patrol),
            BurstFire::new(archetype.weapon),
        ))
        .id()
}

/// Заспавнить intruder'а (цель guard'ов)
pub fn spawn_intruder(world: &mut World, transform: Transform) -> Entity {
    world.spawn((Intruder, transform)).id()
}

/// Snapshot мира для сравнения детерминизма
/// (упрощённая версия: Debug-представление компонентов, отсортированное по Entity)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
