//! Patrol module: waypoint graph + обход

pub mod graph;
pub mod systems;
pub mod walker;

pub use graph::{Waypoint, WaypointGraph};
pub use systems::advance_patrol;
pub use walker::{PatrolConfig, PatrolWalker};
