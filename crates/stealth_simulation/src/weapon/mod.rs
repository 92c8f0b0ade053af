//! Weapon module: burst fire guard'а

pub mod burst;
pub mod systems;

pub use burst::{BurstFire, BurstFireConfig, FireState, MIN_SHOT_INTERVAL};
pub use systems::{fire_weapons, ShotFired};
