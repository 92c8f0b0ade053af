//! Базовые ECS компоненты для симуляции
//!
//! Архитектура: Required Components (Bevy 0.16)
//! - Guard требует Perception + BehaviorController + Steering автоматически

pub mod actor;

pub use actor::{Guard, Intruder};
