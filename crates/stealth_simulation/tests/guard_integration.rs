//! Интеграционные тесты guard'а: perception → FSM → steering/оружие в headless App

use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use bevy_rapier3d::prelude::{Collider, NoUserData, RapierPhysicsPlugin};
use stealth_simulation::{
    create_headless_app, emit_noise_now, spawn_guard, spawn_intruder, BehaviorController, BurstFire, GuardArchetype,
    GuardState, GuardStateChanged, NoiseBus, NoiseEvent, ObstacleField, Perception, PhysicsBody, ShotFired,
    StealthSet, Steering, SteeringTarget, WaypointGraph,
};

/// Лог событий за весь прогон (Events живут только 2 кадра)
#[derive(Resource, Default)]
struct EventLog {
    transitions: Vec<GuardStateChanged>,
    shots: Vec<ShotFired>,
}

fn record_events(
    mut log: ResMut<EventLog>,
    mut transitions: EventReader<GuardStateChanged>,
    mut shots: EventReader<ShotFired>,
) {
    log.transitions.extend(transitions.read().copied());
    log.shots.extend(shots.read().copied());
}

fn test_app() -> App {
    let mut app = create_headless_app(7);
    app.init_resource::<EventLog>()
        .add_systems(Update, record_events.after(StealthSet::Act));
    app.world_mut().insert_resource(WaypointGraph::looped([
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -30.0),
    ]));
    app
}

fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

fn state_of(app: &App, guard: Entity) -> GuardState {
    app.world()
        .get::<BehaviorController>(guard)
        .map(|controller| controller.state())
        .expect("guard has controller")
}

#[test]
fn test_guard_alerts_on_visible_intruder() {
    let mut app = test_app();
    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::default());
    let intruder = spawn_intruder(world, Transform::from_xyz(0.0, 0.0, -8.0));

    run(&mut app, 30);

    assert_eq!(state_of(&app, guard), GuardState::Alerted);

    let log = app.world().resource::<EventLog>();
    assert_eq!(
        log.transitions.first(),
        Some(&GuardStateChanged {
            guard,
            from: GuardState::Patrol,
            to: GuardState::Alerted,
        })
    );
    assert!(!log.shots.is_empty());
    assert!(log.shots.iter().all(|shot| shot.shooter == guard && shot.target == Some(intruder)));

    let steering = app.world().get::<Steering>(guard).expect("steering");
    assert_eq!(steering.target(), Some(SteeringTarget::Entity(intruder)));

    // Guard двигается к intruder'у
    let position = app.world().get::<Transform>(guard).expect("transform").translation;
    assert!(position.z < 0.0);
}

#[test]
fn test_wall_blocks_vision() {
    let mut app = test_app();
    app.world_mut().insert_resource(
        ObstacleField::new().with_cuboid(Vec3::new(0.0, 0.0, -4.0), Vec3::new(5.0, 3.0, 0.25)),
    );
    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::from_xyz(0.0, 0.0, 0.0));
    spawn_intruder(world, Transform::from_xyz(0.0, 0.0, -8.0));

    run(&mut app, 20);

    assert_eq!(state_of(&app, guard), GuardState::Patrol);
    let perception = app.world().get::<Perception>(guard).expect("perception");
    assert_eq!(perception.awareness(), 0.0);
}

#[test]
fn test_rapier_wall_blocks_vision() {
    let mut app = test_app();
    app.add_plugins((TransformPlugin, RapierPhysicsPlugin::<NoUserData>::default()));

    app.world_mut()
        .spawn((Collider::cuboid(5.0, 3.0, 0.25), Transform::from_xyz(0.0, 0.0, -4.0)));
    // Стена должна попасть в Rapier query pipeline до появления guard'а
    run(&mut app, 3);

    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::default());
    spawn_intruder(world, Transform::from_xyz(0.0, 0.0, -8.0));

    run(&mut app, 20);

    assert_eq!(state_of(&app, guard), GuardState::Patrol);
    let perception = app.world().get::<Perception>(guard).expect("perception");
    assert_eq!(perception.awareness(), 0.0);
}

#[test]
fn test_noise_makes_guard_investigate() {
    let mut app = test_app();
    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::default());
    // За спиной: вне обоих конусов
    let intruder_position = Vec3::new(0.0, 0.0, 6.0);
    let intruder = spawn_intruder(world, Transform::from_translation(intruder_position));

    // Подписка на NoiseBus
    app.update();
    assert!(app.world().resource::<NoiseBus>().is_subscribed(guard));

    let notified = emit_noise_now(
        app.world_mut(),
        NoiseEvent::new(intruder_position, 10.0, Some(intruder)),
    );
    assert_eq!(notified, 1);

    // Бонус применён сразу, до следующего кадра: 0.3 * (1 - 6/25)
    let perception = app.world().get::<Perception>(guard).expect("perception");
    assert!((perception.awareness() - 0.228).abs() < 1e-4);
    assert!(perception.is_suspicious());
    assert_eq!(perception.last_known_position(), Some(intruder_position));

    app.update();
    assert_eq!(state_of(&app, guard), GuardState::Suspicious);

    app.update();
    let steering = app.world().get::<Steering>(guard).expect("steering");
    assert_eq!(steering.target(), Some(SteeringTarget::Point(intruder_position)));
}

#[test]
fn test_awareness_decays_without_any_target() {
    let mut app = test_app();
    let guard = spawn_guard(app.world_mut(), &GuardArchetype::default(), Transform::default());
    app.update();

    // Intruder'а нет: шум без источника
    emit_noise_now(app.world_mut(), NoiseEvent::new(Vec3::new(0.0, 0.0, 3.0), 10.0, None));
    let heard = app.world().get::<Perception>(guard).expect("perception").awareness();
    assert!(heard > 0.0);

    // 0.5 сек без цели: минус 0.5 / time_to_forget
    run(&mut app, 30);
    let perception = app.world().get::<Perception>(guard).expect("perception");
    assert_eq!(perception.target, None);
    assert!((heard - perception.awareness() - 0.5 / 3.0).abs() < 1e-3);
}

#[test]
fn test_lost_intruder_falls_back_through_suspicious() {
    let mut app = test_app();
    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::default());
    let intruder = spawn_intruder(world, Transform::from_xyz(0.0, 0.0, -6.0));

    run(&mut app, 10);
    assert_eq!(state_of(&app, guard), GuardState::Alerted);

    // Intruder исчезает далеко за пределами видимости
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(intruder) {
        transform.translation = Vec3::new(0.0, 0.0, 200.0);
    }

    // lose_target_delay = 3 сек; awareness к этому моменту уже ниже порога,
    // поэтому Suspicious сразу сменяется Patrol
    run(&mut app, 240);
    assert_eq!(state_of(&app, guard), GuardState::Patrol);
    assert!(!app.world().get::<BurstFire>(guard).expect("weapon").is_firing());

    let log = app.world().resource::<EventLog>();
    let path: Vec<GuardState> = log.transitions.iter().map(|t| t.to).collect();
    assert_eq!(path, vec![GuardState::Alerted, GuardState::Suspicious, GuardState::Patrol]);

    // После выхода из Alerted выстрелов нет
    let shots_before = log.shots.len();
    run(&mut app, 120);
    assert_eq!(app.world().resource::<EventLog>().shots.len(), shots_before);
}

#[test]
fn test_removing_perception_unsubscribes() {
    let mut app = test_app();
    let guard = spawn_guard(app.world_mut(), &GuardArchetype::default(), Transform::default());

    app.update();
    assert!(app.world().resource::<NoiseBus>().is_subscribed(guard));

    app.world_mut().entity_mut(guard).remove::<Perception>();
    app.update();
    assert!(!app.world().resource::<NoiseBus>().is_subscribed(guard));

    // Despawn тоже отписывает
    let other = spawn_guard(app.world_mut(), &GuardArchetype::default(), Transform::from_xyz(5.0, 0.0, 0.0));
    app.update();
    app.world_mut().despawn(other);
    app.update();
    assert!(app.world().resource::<NoiseBus>().is_empty());
}

#[test]
fn test_removing_controller_stops_firing() {
    let mut app = test_app();
    let world = app.world_mut();
    let guard = spawn_guard(world, &GuardArchetype::default(), Transform::default());
    spawn_intruder(world, Transform::from_xyz(0.0, 0.0, -8.0));

    run(&mut app, 10);
    assert!(app.world().get::<BurstFire>(guard).expect("weapon").is_firing());

    app.world_mut().entity_mut(guard).remove::<BehaviorController>();
    app.update();
    assert!(!app.world().get::<BurstFire>(guard).expect("weapon").is_firing());
}

#[test]
fn test_despawned_steering_target_means_idle_damping() {
    let mut app = test_app();
    let world = app.world_mut();
    let beacon = world.spawn(Transform::from_xyz(0.0, 0.0, -50.0)).id();

    let mut steering = Steering::default();
    steering.set_target(Some(SteeringTarget::Entity(beacon)));
    let agent = world
        .spawn((
            Transform::default(),
            PhysicsBody {
                velocity: Vec3::new(0.0, 0.0, -3.0),
                ..default()
            },
            steering,
        ))
        .id();

    world.despawn(beacon);

    let mut previous = 3.0;
    for _ in 0..30 {
        app.update();
        let speed = app.world().get::<PhysicsBody>(agent).expect("body").speed();
        assert!(speed <= previous);
        previous = speed;
    }
    assert!(previous < 3.0);
}
