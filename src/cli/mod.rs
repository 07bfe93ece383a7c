//! CLI Interface: user input, terminal rendering and startup settings
//!
//! # Components
//! - `input.rs`: Keystroke capture using crossterm
//! - `display.rs`: Terminal rendering and UI
//! - `clock.rs`: Advance / spawn tick scheduling
//! - `settings.rs`: Startup settings form

pub mod clock;
pub mod display;
pub mod input;
pub mod settings;
