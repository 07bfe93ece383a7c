//! Per-character statistics: session counts, lifetime counts, streaks
//!
//! Two views are kept per character:
//! - session: what happened this run (shown in the progress table)
//! - overall: lifetime record loaded from the store, updated on flush
//!
//! Deltas since the last flush are tracked separately from the session
//! totals, so a later flush never re-adds counts that were already merged.

use crate::store::Store;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Counters for one character
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStat {
    pub character: String,
    pub correct_count: u32,
    pub miss_count: u32,
    /// Consecutive correct answers since the last miss
    pub streak: u32,
}

impl CharacterStat {
    fn empty(character: &str) -> Self {
        CharacterStat {
            character: character.to_string(),
            ..Default::default()
        }
    }
}

/// Session and lifetime statistics with a dirty flag guarding flushes
#[derive(Clone, Debug, Default)]
pub struct StatsAggregator {
    overall: FxHashMap<String, CharacterStat>,
    session: FxHashMap<String, CharacterStat>,
    /// Unflushed deltas (correct/miss counts only)
    pending: FxHashMap<String, CharacterStat>,
    /// Running streak per character, seeded from the lifetime record
    current_streak: FxHashMap<String, u32>,
    dirty: bool,
}

#[allow(dead_code)]
impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed lifetime stats (and streaks) from previously stored records
    pub fn with_overall<I: IntoIterator<Item = CharacterStat>>(stats: I) -> Self {
        let mut aggregator = Self::new();
        for stat in stats {
            aggregator
                .current_streak
                .insert(stat.character.clone(), stat.streak);
            aggregator.overall.insert(stat.character.clone(), stat);
        }
        aggregator
    }

    /// Count a correct answer and extend the streak
    pub fn record_correct(&mut self, character: &str) {
        let streak = self.current_streak.entry(character.to_string()).or_insert(0);
        *streak += 1;
        let streak = *streak;

        let session = self
            .session
            .entry(character.to_string())
            .or_insert_with(|| CharacterStat::empty(character));
        session.correct_count += 1;
        session.streak = streak;

        self.pending
            .entry(character.to_string())
            .or_insert_with(|| CharacterStat::empty(character))
            .correct_count += 1;

        self.dirty = true;
    }

    /// Count a miss and reset the streak
    pub fn record_miss(&mut self, character: &str) {
        self.current_streak.insert(character.to_string(), 0);

        let session = self
            .session
            .entry(character.to_string())
            .or_insert_with(|| CharacterStat::empty(character));
        session.miss_count += 1;
        session.streak = 0;

        self.pending
            .entry(character.to_string())
            .or_insert_with(|| CharacterStat::empty(character))
            .miss_count += 1;

        self.dirty = true;
    }

    /// Merge pending deltas into the lifetime record and write each changed
    /// character through to the store. Returns the number of writes attempted.
    ///
    /// Counts accumulate; the streak is replaced by the current value.
    /// Failed writes are logged and dropped.
    pub fn flush(&mut self, store: Option<&dyn Store>) -> usize {
        if !self.dirty {
            return 0;
        }

        let mut writes = 0;
        for (character, delta) in self.pending.drain() {
            let streak = self.current_streak.get(&character).copied().unwrap_or(0);
            if delta.correct_count == 0 && delta.miss_count == 0 && streak == 0 {
                continue;
            }

            let overall = self
                .overall
                .entry(character.clone())
                .or_insert_with(|| CharacterStat::empty(&character));
            overall.correct_count += delta.correct_count;
            overall.miss_count += delta.miss_count;
            overall.streak = streak;

            if let Some(store) = store {
                writes += 1;
                if let Err(e) = store.save_kana_stats(overall) {
                    log::warn!("dropping stats write for '{}': {}", character, e);
                }
            }
        }

        self.dirty = false;
        log::debug!("stats flushed ({} writes)", writes);
        writes
    }

    /// Whether there are unflushed deltas
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Correct answers for a character this session
    pub fn session_correct_count(&self, character: &str) -> u32 {
        self.session
            .get(character)
            .map(|s| s.correct_count)
            .unwrap_or(0)
    }

    /// Session record for a character
    pub fn session(&self, character: &str) -> Option<&CharacterStat> {
        self.session.get(character)
    }

    /// Lifetime record for a character (as of the last flush)
    pub fn overall(&self, character: &str) -> Option<&CharacterStat> {
        self.overall.get(character)
    }

    /// Current running streak for a character
    pub fn streak(&self, character: &str) -> u32 {
        self.current_streak.get(character).copied().unwrap_or(0)
    }
}
