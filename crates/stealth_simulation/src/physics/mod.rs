//! Physics bridge
//!
//! Rigid-body-like состояние (PhysicsBody), интеграция velocity, spatial queries
//! (ray cast / sphere sweep) для vision и obstacle avoidance.

pub mod movement;
pub mod probe;
pub mod query;

// Re-export основных типов
pub use movement::{integrate_velocity_to_transform, sync_velocity_to_rapier, PhysicsBody};
pub use probe::{is_self_or_descendant, RapierProbe, WorldProbe};
pub use query::{NoGeometry, Obstacle, ObstacleField, ObstacleShape, ProbeHit, SpatialQuery};
