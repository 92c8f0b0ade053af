//! AI systems

pub mod behavior;

// Re-export all systems
pub use behavior::*;
