//! Noise module: bus + emitters
//!
//! Поток данных:
//! MakeNoise → emit_requested_noise → NoiseEvent → dispatch_noise (perception) → NoiseBus::emit → Perception::hear
//!
//! Shared state: только список подписчиков NoiseBus (меняется в start/stop perception).

pub mod bus;
pub mod emitter;


// Re-export основных типов
pub use bus::{NoiseBus, NoiseEvent};
pub use emitter::{emit_requested_noise, MakeNoise, NoiseEmitter, GUNSHOT_NOISE, RUN_NOISE, WALK_NOISE};
