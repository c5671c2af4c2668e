//! AI game master module.
//!
//! Contains the Claude-backed narrator and its conversation memory.

mod agent;
pub mod memory;

pub use agent::{GameMaster, GmConfig};
pub use memory::GmMemory;
