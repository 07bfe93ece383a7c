//! Session Management: falling kana, matching, scoring and statistics
//!
//! # Components
//! - `entity.rs`: Falling kana record
//! - `engine.rs`: Spawn / fall engine and field geometry
//! - `stats.rs`: Per-character session and lifetime statistics
//! - `state.rs`: GameState and the session controller

pub mod engine;
pub mod entity;
pub mod state;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{ADVANCE_INTERVAL, MISS_LIMIT, SPAWN_INTERVAL};
pub use state::{Command, Event, GameState, Key, TerminalReason};
