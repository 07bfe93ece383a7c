//! Persistence: user settings and per-character statistics
//!
//! # Components
//! - `sqlite.rs`: SQLite-backed `Store` (settings key/value table + kana_stats)
//!
//! The game only talks to the `Store` trait. Every call may fail; callers
//! fall back to defaults on load and drop failed writes.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::session::stats::CharacterStat;
use std::error::Error;

/// Score limit used when nothing is stored
pub const DEFAULT_SCORE_LIMIT: u32 = 100;

/// Durable settings and lifetime statistics
pub trait Store {
    /// Lifetime stats for every tracked character
    fn kana_statistics(&self) -> Result<Vec<CharacterStat>, Box<dyn Error>>;

    /// Overwrite the lifetime record for one character
    fn save_kana_stats(&self, stat: &CharacterStat) -> Result<(), Box<dyn Error>>;

    /// Stored row selection, `None` if never saved
    fn selected_rows(&self) -> Result<Option<Vec<String>>, Box<dyn Error>>;

    /// Persist a row selection. `None` clears it.
    fn save_selected_rows(&self, rows: Option<&[String]>) -> Result<(), Box<dyn Error>>;

    fn auto_progress(&self) -> Result<bool, Box<dyn Error>>;

    fn save_auto_progress(&self, enabled: bool) -> Result<(), Box<dyn Error>>;

    fn score_limit(&self) -> Result<u32, Box<dyn Error>>;

    fn save_score_limit(&self, limit: u32) -> Result<(), Box<dyn Error>>;
}
