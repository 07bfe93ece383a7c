//! In-memory `Store` used by session tests

use crate::session::stats::CharacterStat;
use crate::store::{Store, DEFAULT_SCORE_LIMIT};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::rc::Rc;

/// Records every write; optionally fails every call
#[derive(Default)]
pub struct RecordingStore {
    pub stats: Vec<CharacterStat>,
    pub rows: Option<Vec<String>>,
    pub auto_progress: bool,
    pub score_limit: Option<u32>,
    pub fail: bool,
    pub saved: RefCell<Vec<CharacterStat>>,
    pub saved_rows: RefCell<Vec<Option<Vec<String>>>>,
    pub saved_limit: Cell<Option<u32>>,
    pub saved_auto: Cell<Option<bool>>,
}

impl RecordingStore {
    pub fn failing() -> Self {
        RecordingStore {
            fail: true,
            ..Default::default()
        }
    }

    pub fn saved_stats(&self) -> Vec<CharacterStat> {
        self.saved.borrow().clone()
    }

    pub fn saved_rows(&self) -> Vec<Option<Vec<String>>> {
        self.saved_rows.borrow().clone()
    }

    pub fn saved_score_limit(&self) -> Option<u32> {
        self.saved_limit.get()
    }

    pub fn saved_auto_progress(&self) -> Option<bool> {
        self.saved_auto.get()
    }

    fn check(&self) -> Result<(), Box<dyn Error>> {
        if self.fail {
            return Err("store unavailable".into());
        }
        Ok(())
    }
}

impl Store for RecordingStore {
    fn kana_statistics(&self) -> Result<Vec<CharacterStat>, Box<dyn Error>> {
        self.check()?;
        Ok(self.stats.clone())
    }

    fn save_kana_stats(&self, stat: &CharacterStat) -> Result<(), Box<dyn Error>> {
        self.check()?;
        self.saved.borrow_mut().push(stat.clone());
        Ok(())
    }

    fn selected_rows(&self) -> Result<Option<Vec<String>>, Box<dyn Error>> {
        self.check()?;
        Ok(self.rows.clone())
    }

    fn save_selected_rows(&self, rows: Option<&[String]>) -> Result<(), Box<dyn Error>> {
        self.check()?;
        self.saved_rows.borrow_mut().push(rows.map(|r| r.to_vec()));
        Ok(())
    }

    fn auto_progress(&self) -> Result<bool, Box<dyn Error>> {
        self.check()?;
        Ok(self.auto_progress)
    }

    fn save_auto_progress(&self, enabled: bool) -> Result<(), Box<dyn Error>> {
        self.check()?;
        self.saved_auto.set(Some(enabled));
        Ok(())
    }

    fn score_limit(&self) -> Result<u32, Box<dyn Error>> {
        self.check()?;
        Ok(self.score_limit.unwrap_or(DEFAULT_SCORE_LIMIT))
    }

    fn save_score_limit(&self, limit: u32) -> Result<(), Box<dyn Error>> {
        self.check()?;
        self.saved_limit.set(Some(limit));
        Ok(())
    }
}

/// Lets a test keep a handle on the store it gave away
impl Store for Rc<RecordingStore> {
    fn kana_statistics(&self) -> Result<Vec<CharacterStat>, Box<dyn Error>> {
        (**self).kana_statistics()
    }

    fn save_kana_stats(&self, stat: &CharacterStat) -> Result<(), Box<dyn Error>> {
        (**self).save_kana_stats(stat)
    }

    fn selected_rows(&self) -> Result<Option<Vec<String>>, Box<dyn Error>> {
        (**self).selected_rows()
    }

    fn save_selected_rows(&self, rows: Option<&[String]>) -> Result<(), Box<dyn Error>> {
        (**self).save_selected_rows(rows)
    }

    fn auto_progress(&self) -> Result<bool, Box<dyn Error>> {
        (**self).auto_progress()
    }

    fn save_auto_progress(&self, enabled: bool) -> Result<(), Box<dyn Error>> {
        (**self).save_auto_progress(enabled)
    }

    fn score_limit(&self) -> Result<u32, Box<dyn Error>> {
        (**self).score_limit()
    }

    fn save_score_limit(&self, limit: u32) -> Result<(), Box<dyn Error>> {
        (**self).save_score_limit(limit)
    }
}
