//! Waypoint graph (resource): узлы патруля со связями и паузами

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Узел патрульного графа
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: [f32; 3],
    /// Индексы связанных узлов (первый: маршрут по умолчанию)
    #[serde(default)]
    pub links: Vec<usize>,
    /// Пауза после прибытия (сек)
    #[serde(default)]
    pub wait_time: f32,
}

impl Waypoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            links: Vec::new(),
            wait_time: 0.0,
        }
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = usize>) -> Self {
        self.links = links.into_iter().collect();
        self
    }

    pub fn with_wait(mut self, wait_time: f32) -> Self {
        self.wait_time = wait_time.max(0.0);
        self
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Патрульный граф уровня
#[derive(Resource, Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct WaypointGraph {
    pub nodes: Vec<Waypoint>,
}

impl WaypointGraph {
    pub fn new(nodes: Vec<Waypoint>) -> Self {
        Self { nodes }
    }

    /// Замкнутый маршрут: 0 → 1 → … → n-1 → 0
    pub fn looped(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let positions: Vec<Vec3> = positions.into_iter().collect();
        let count = positions.len();

        let nodes = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Waypoint::new(position).with_links([(index + 1) % count]))
            .collect();

        Self { nodes }
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ближайший к `position` узел
    pub fn closest(&self, position: Vec3) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, node.translation().distance_squared(position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Связи, ведущие на существующие узлы
    pub fn valid_links(&self, index: usize) -> Vec<usize> {
        self.get(index)
            .map(|node| node.links.iter().copied().filter(|&link| link < self.nodes.len()).collect())
            .unwrap_or_default()
    }
}
