//! Flow-sensitive checking of method bodies.

pub mod engine;
pub mod env;
mod patterns;

pub use engine::FlowChecker;
pub use env::{FlowEnv, VarState};
