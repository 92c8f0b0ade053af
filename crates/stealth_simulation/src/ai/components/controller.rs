//! Behavior controller: Patrol → Suspicious → Alerted FSM
//!
//! Переходы проверяются раз в кадр по perception snapshot'у (`Observation`).
//! Side effects (preset, цель steering, патруль, оружие) идут через `GuardActuators`.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logger;
use crate::patrol::{PatrolWalker, WaypointGraph};
use crate::perception::Perception;
use crate::steering::{Steering, SteeringPresets, SteeringTarget};
use crate::weapon::BurstFire;

/// Режим поведения guard'а
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum GuardState {
    #[default]
    Patrol,
    Suspicious,
    Alerted,
}

/// Параметры controller'а
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub initial_state: GuardState,
    /// Сколько секунд без визуального контакта до потери цели
    pub lose_target_delay: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            initial_state: GuardState::Patrol,
            lose_target_delay: 3.0,
        }
    }
}

impl BehaviorConfig {
    pub fn sanitized(&self) -> Self {
        Self {
            lose_target_delay: self.lose_target_delay.max(0.0),
            ..*self
        }
    }
}

/// Perception snapshot кадра
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observation {
    pub has_direct_visual: bool,
    pub is_suspicious: bool,
    pub is_fully_aware: bool,
    pub last_known_position: Option<Vec3>,
    /// Цель, настроенная в Perception (источник для re-acquire)
    pub perception_target: Option<Entity>,
}

impl Observation {
    pub fn from_perception(perception: &Perception, has_direct_visual: bool) -> Self {
        Self {
            has_direct_visual,
            is_suspicious: perception.is_suspicious(),
            is_fully_aware: perception.is_fully_aware(),
            last_known_position: perception.last_known_position(),
            perception_target: perception.target,
        }
    }
}

/// Исполнительные подсистемы guard'а
pub struct GuardActuators<'a, R: Rng + ?Sized> {
    pub position: Vec3,
    pub steering: &'a mut Steering,
    pub patrol: Option<&'a mut PatrolWalker>,
    pub weapon: Option<&'a mut BurstFire>,
    pub graph: Option<&'a WaypointGraph>,
    pub rng: &'a mut R,
}

/// Смена режима
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: GuardState,
    pub to: GuardState,
}

/// FSM guard'а
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BehaviorController {
    pub config: BehaviorConfig,
    pub presets: SteeringPresets,
    state: GuardState,
    /// Entry actions начального режима ещё не выполнены
    pending_entry: bool,
    time_since_last_seen: f32,
    tracked_target: Option<Entity>,
    /// Точка, к которой идём в Suspicious (last known position)
    scratch_point: Option<Vec3>,
}

impl Default for BehaviorController {
    fn default() -> Self {
        Self::new(BehaviorConfig::default(), SteeringPresets::default())
    }
}

impl BehaviorController {
    pub fn new(config: BehaviorConfig, presets: SteeringPresets) -> Self {
        Self {
            config,
            presets,
            state: config.initial_state,
            pending_entry: true,
            time_since_last_seen: 0.0,
            tracked_target: None,
            scratch_point: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn time_since_last_seen(&self) -> f32 {
        self.time_since_last_seen
    }

    pub fn tracked_target(&self) -> Option<Entity> {
        self.tracked_target
    }

    pub fn scratch_point(&self) -> Option<Vec3> {
        self.scratch_point
    }

    /// Один кадр FSM
    ///
    /// `target_exists`: жива ли entity (для проверки tracked target).
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        observation: &Observation,
        delta: f32,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) -> Option<Transition> {
        if self.pending_entry {
            self.pending_entry = false;
            self.enter(self.state, observation, actuators, target_exists);
        }

        match self.state {
            GuardState::Patrol => self.update_patrol(observation, actuators, target_exists),
            GuardState::Suspicious => self.update_suspicious(observation, actuators, target_exists),
            GuardState::Alerted => self.update_alerted(observation, delta, actuators, target_exists),
        }
    }

    /// Перейти в `next` (переход в текущий режим: no-op)
    pub fn request_transition<R: Rng + ?Sized>(
        &mut self,
        next: GuardState,
        observation: &Observation,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) -> Option<Transition> {
        if next == self.state {
            return None;
        }

        let from = self.state;
        self.exit(from, actuators);
        self.state = next;
        self.pending_entry = false;
        self.enter(next, observation, actuators, target_exists);

        Some(Transition { from, to: next })
    }

    fn update_patrol<R: Rng + ?Sized>(
        &mut self,
        observation: &Observation,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) -> Option<Transition> {
        if observation.has_direct_visual || observation.is_fully_aware {
            return self.request_transition(GuardState::Alerted, observation, actuators, target_exists);
        }

        if observation.is_suspicious {
            return self.request_transition(GuardState::Suspicious, observation, actuators, target_exists);
        }

        None
    }

    fn update_suspicious<R: Rng + ?Sized>(
        &mut self,
        observation: &Observation,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) -> Option<Transition> {
        if observation.has_direct_visual || observation.is_fully_aware {
            return self.request_transition(GuardState::Alerted, observation, actuators, target_exists);
        }

        if !observation.is_suspicious {
            return self.request_transition(GuardState::Patrol, observation, actuators, target_exists);
        }

        if let Some(point) = observation.last_known_position {
            self.scratch_point = Some(point);
            actuators.steering.set_target(Some(SteeringTarget::Point(point)));
        }

        None
    }

    fn update_alerted<R: Rng + ?Sized>(
        &mut self,
        observation: &Observation,
        delta: f32,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) -> Option<Transition> {
        let previous = self.tracked_target;
        let acquired = self.reacquire_target(observation, target_exists);

        // Оружие всегда стреляет по текущей tracked target (или без цели, пока её нет)
        if self.tracked_target != previous {
            if let Some(weapon) = actuators.weapon.as_deref_mut() {
                weapon.set_target(self.tracked_target);
            }
        }

        if !acquired {
            // Цели нет: повторим в следующем кадре
            return None;
        }

        if let Some(target) = self.tracked_target {
            actuators.steering.set_target(Some(SteeringTarget::Entity(target)));
        }

        if observation.has_direct_visual {
            self.time_since_last_seen = 0.0;
            return None;
        }

        self.time_since_last_seen += delta.max(0.0);
        if self.time_since_last_seen < self.config.lose_target_delay {
            return None;
        }

        let next = if observation.last_known_position.is_some() {
            GuardState::Suspicious
        } else {
            GuardState::Patrol
        };
        self.request_transition(next, observation, actuators, target_exists)
    }

    /// Убедиться, что tracked target жив; иначе взять цель из Perception
    fn reacquire_target(&mut self, observation: &Observation, target_exists: &dyn Fn(Entity) -> bool) -> bool {
        if self.tracked_target.is_some_and(target_exists) {
            return true;
        }

        let had_target = self.tracked_target.is_some();
        self.tracked_target = observation.perception_target.filter(|&target| target_exists(target));
        if had_target && self.tracked_target.is_none() {
            logger::log_warning("BehaviorController: tracked target lost, retrying every frame");
        }
        self.tracked_target.is_some()
    }

    fn enter<R: Rng + ?Sized>(
        &mut self,
        state: GuardState,
        observation: &Observation,
        actuators: &mut GuardActuators<'_, R>,
        target_exists: &dyn Fn(Entity) -> bool,
    ) {
        match state {
            GuardState::Patrol => {
                actuators.steering.apply_preset(&self.presets.patrol);
                actuators.steering.clear_target();

                if let Some(patrol) = actuators.patrol.as_deref_mut() {
                    patrol.enable();
                    match actuators.graph {
                        Some(graph) => {
                            let next = patrol.jump_to_closest_node(actuators.position, graph, &mut *actuators.rng);
                            if let Some(next) = next {
                                actuators.steering.set_target(Some(SteeringTarget::Point(next)));
                            }
                        }
                        None => logger::log_warning("BehaviorController: no waypoint graph for patrol"),
                    }
                }
            }
            GuardState::Suspicious => {
                actuators.steering.apply_preset(&self.presets.suspicious);
                if let Some(patrol) = actuators.patrol.as_deref_mut() {
                    patrol.disable();
                }
            }
            GuardState::Alerted => {
                actuators.steering.apply_preset(&self.presets.alerted);
                self.time_since_last_seen = 0.0;

                if let Some(patrol) = actuators.patrol.as_deref_mut() {
                    patrol.disable();
                }

                self.reacquire_target(observation, target_exists);
                if let Some(weapon) = actuators.weapon.as_deref_mut() {
                    weapon.set_target(self.tracked_target);
                    weapon.start_firing();
                }
            }
        }
    }

    fn exit<R: Rng + ?Sized>(&mut self, state: GuardState, actuators: &mut GuardActuators<'_, R>) {
        if state == GuardState::Alerted {
            if let Some(weapon) = actuators.weapon.as_deref_mut() {
                weapon.stop_firing();
            }
        }
    }
}
