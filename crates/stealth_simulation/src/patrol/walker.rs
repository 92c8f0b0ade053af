//! PatrolWalker: обход waypoint графа (enable / disable / jump to closest)
//!
//! Walker только выбирает узлы; движение к узлу делает Steering.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::graph::WaypointGraph;
use crate::logger;

/// Параметры обхода
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Дистанция "прибыли на узел"
    pub waypoint_threshold: f32,
    /// Случайная связь вместо первой
    pub random_next: bool,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            waypoint_threshold: 1.0,
            random_next: false,
        }
    }
}

/// Состояние обхода патруля
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolWalker {
    pub config: PatrolConfig,
    enabled: bool,
    current: Option<usize>,
    next: Option<usize>,
    /// Оставшаяся пауза на текущем узле
    waiting: Option<f32>,
}

impl PatrolWalker {
    pub fn new(config: PatrolConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.is_some()
    }

    pub fn current_node(&self) -> Option<usize> {
        self.current
    }

    pub fn next_node(&self) -> Option<usize> {
        self.next
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Выключить обход (пауза на узле отменяется)
    pub fn disable(&mut self) {
        self.enabled = false;
        self.waiting = None;
    }

    /// Встать на ближайший узел и выбрать следующий
    ///
    /// Возвращает позицию следующего узла (новая цель steering).
    pub fn jump_to_closest_node<R: Rng + ?Sized>(
        &mut self,
        position: Vec3,
        graph: &WaypointGraph,
        rng: &mut R,
    ) -> Option<Vec3> {
        self.waiting = None;

        let Some(closest) = graph.closest(position) else {
            logger::log_warning("PatrolWalker: waypoint graph is empty");
            self.current = None;
            self.next = None;
            return None;
        };

        self.current = Some(closest);
        self.pick_next(graph, rng)
    }

    /// Один кадр обхода
    ///
    /// Возвращает Some(позиция), когда выбран новый узел.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        position: Vec3,
        graph: &WaypointGraph,
        delta: f32,
        rng: &mut R,
    ) -> Option<Vec3> {
        if !self.enabled {
            return None;
        }

        if let Some(remaining) = self.waiting {
            let remaining = remaining - delta;
            if remaining > 0.0 {
                self.waiting = Some(remaining);
                return None;
            }
            self.waiting = None;
            return self.pick_next(graph, rng);
        }

        let next = self.next?;
        let node = graph.get(next)?;

        if position.distance(node.translation()) >= self.config.waypoint_threshold {
            return None;
        }

        self.current = Some(next);
        if node.wait_time > 0.0 {
            self.waiting = Some(node.wait_time);
            return None;
        }

        self.pick_next(graph, rng)
    }

    fn pick_next<R: Rng + ?Sized>(&mut self, graph: &WaypointGraph, rng: &mut R) -> Option<Vec3> {
        let links = self.current.map(|current| graph.valid_links(current)).unwrap_or_default();

        self.next = if links.is_empty() {
            None
        } else if self.config.random_next {
            Some(links[rng.gen_range(0..links.len())])
        } else {
            Some(links[0])
        };

        self.next.and_then(|next| graph.get(next)).map(|node| node.translation())
    }
}
