//! SQLite store
//!
//! Layout:
//! - `settings(key TEXT PRIMARY KEY, value TEXT)`: selected rows (JSON array),
//!   auto progress ("1"/"0"), score limit (decimal)
//! - `kana_stats(char TEXT PRIMARY KEY, correct_count, miss_count, streak)`

use super::{Store, DEFAULT_SCORE_LIMIT};
use crate::session::stats::CharacterStat;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fs;
use std::path::Path;

const SELECTED_ROWS_KEY: &str = "selected_rows";
const AUTO_PROGRESS_KEY: &str = "auto_progress";
const SCORE_LIMIT_KEY: &str = "score_limit";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS kana_stats (
    char TEXT PRIMARY KEY,
    correct_count INTEGER NOT NULL DEFAULT 0,
    miss_count INTEGER NOT NULL DEFAULT 0,
    streak INTEGER NOT NULL DEFAULT 0
);
"#;

/// Settings and stats in a single SQLite file
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err("store: database path is required".into());
        }

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        let store = SqliteStore { conn };
        store.migrate()?;

        log::info!("store opened at {}", path.display());
        Ok(store)
    }

    /// In-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, Box<dyn Error>> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), Box<dyn Error>> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<(), Box<dyn Error>> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn kana_statistics(&self) -> Result<Vec<CharacterStat>, Box<dyn Error>> {
        let mut stmt = self
            .conn
            .prepare("SELECT char, correct_count, miss_count, streak FROM kana_stats")?;
        let rows = stmt.query_map([], |row| {
            Ok(CharacterStat {
                character: row.get(0)?,
                correct_count: row.get(1)?,
                miss_count: row.get(2)?,
                streak: row.get(3)?,
            })
        })?;

        let mut stats = Vec::new();
        for stat in rows {
            stats.push(stat?);
        }
        Ok(stats)
    }

    fn save_kana_stats(&self, stat: &CharacterStat) -> Result<(), Box<dyn Error>> {
        self.conn.execute(
            "INSERT INTO kana_stats (char, correct_count, miss_count, streak)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(char) DO UPDATE SET
                correct_count = excluded.correct_count,
                miss_count = excluded.miss_count,
                streak = excluded.streak",
            params![
                stat.character,
                stat.correct_count,
                stat.miss_count,
                stat.streak
            ],
        )?;
        Ok(())
    }

    fn selected_rows(&self) -> Result<Option<Vec<String>>, Box<dyn Error>> {
        match self.get_setting(SELECTED_ROWS_KEY)? {
            Some(value) => {
                let rows: Vec<String> = serde_json::from_str(&value)
                    .map_err(|e| format!("store: decode selected rows: {}", e))?;
                Ok(Some(rows))
            }
            None => Ok(None),
        }
    }

    fn save_selected_rows(&self, rows: Option<&[String]>) -> Result<(), Box<dyn Error>> {
        match rows {
            Some(rows) => self.set_setting(SELECTED_ROWS_KEY, &serde_json::to_string(rows)?),
            None => self.delete_setting(SELECTED_ROWS_KEY),
        }
    }

    fn auto_progress(&self) -> Result<bool, Box<dyn Error>> {
        Ok(matches!(
            self.get_setting(AUTO_PROGRESS_KEY)?.as_deref(),
            Some("1") | Some("true") | Some("TRUE")
        ))
    }

    fn save_auto_progress(&self, enabled: bool) -> Result<(), Box<dyn Error>> {
        self.set_setting(AUTO_PROGRESS_KEY, if enabled { "1" } else { "0" })
    }

    fn score_limit(&self) -> Result<u32, Box<dyn Error>> {
        match self.get_setting(SCORE_LIMIT_KEY)? {
            Some(value) => {
                let limit: i64 = value
                    .trim()
                    .parse()
                    .map_err(|e| format!("store: decode score limit '{}': {}", value, e))?;
                Ok(limit.clamp(0, u32::MAX as i64) as u32)
            }
            None => Ok(DEFAULT_SCORE_LIMIT),
        }
    }

    fn save_score_limit(&self, limit: u32) -> Result<(), Box<dyn Error>> {
        self.set_setting(SCORE_LIMIT_KEY, &limit.to_string())
    }
}
