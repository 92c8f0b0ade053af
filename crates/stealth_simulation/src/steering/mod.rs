//! Steering module: arrival, wander, obstacle avoidance, facing
//!
//! Работает в FixedUpdate (physics tick) перед интеграцией velocity.

pub mod preset;
pub mod systems;
pub mod unit;


// Re-export основных типов
pub use preset::{BehaviorPreset, SteeringPresets};
pub use systems::steer_agents;
pub use unit::{Steering, SteeringConfig, SteeringContext, SteeringOutcome, SteeringTarget};
