//! Game state and session controller
//!
//! Maintains:
//! - Falling kana, input buffer, score and miss count
//! - Row selection, score limit and auto-progress settings
//! - Session vs. lifetime statistics
//! - Running / terminal state (first termination reason wins)
//!
//! The event loop feeds one `Event` at a time into `GameState::handle` and
//! acts on the returned `Command`.

use super::engine::{FallEngine, Field, MISS_LIMIT};
use super::entity::Kana;
use super::stats::{CharacterStat, StatsAggregator};
use crate::kana::{CharacterSet, RowTable};
use crate::store::{Store, DEFAULT_SCORE_LIMIT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points for each correct answer
pub const POINTS_PER_MATCH: u32 = 10;

/// Why a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalReason {
    /// Score limit reached
    Score,
    /// Miss limit reached
    Misses,
    /// Player ended the session
    Quit,
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminalReason::Score => "score",
            TerminalReason::Misses => "misses",
            TerminalReason::Quit => "quit",
        };
        f.write_str(s)
    }
}

/// Keys the game reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Printable character
    Char(char),
    Backspace,
    /// Submit the input buffer
    Enter,
    /// End the session, or leave the review screen
    Escape,
    /// Ctrl+C: flush and exit immediately
    Interrupt,
}

/// Input delivered by the event loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Resize { width: u16, height: u16 },
    Key(Key),
    AdvanceTick,
    SpawnTick,
}

/// What the event loop should do next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Idle,
    ScheduleAdvance,
    ScheduleSpawn,
    Exit,
}

/// Complete game state
pub struct GameState {
    charset: CharacterSet,
    rows: RowTable,
    engine: FallEngine,
    input: String,
    score: u32,
    score_limit: u32,
    missed: u32,
    terminal: Option<TerminalReason>,
    /// Empty means every row
    selected_rows: FxHashSet<String>,
    /// Stored and shown, not acted on yet
    auto_progress: bool,
    stats: StatsAggregator,
    store: Option<Box<dyn Store>>,
    rng: StdRng,
}

impl GameState {
    /// Hiragana game with settings and lifetime stats loaded from `store`
    pub fn new(store: Option<Box<dyn Store>>) -> Self {
        Self::with_tables(
            CharacterSet::hiragana(),
            RowTable::hiragana(),
            store,
            StdRng::from_entropy(),
        )
    }

    /// Game over explicit tables and RNG. Store load failures fall back to
    /// defaults: every row selected, auto progress off, default score limit.
    pub fn with_tables(
        charset: CharacterSet,
        rows: RowTable,
        store: Option<Box<dyn Store>>,
        rng: StdRng,
    ) -> Self {
        let selected_rows = rows.default_row_ids().into_iter().collect();

        let mut state = GameState {
            charset,
            rows,
            engine: FallEngine::new(Field::default()),
            input: String::new(),
            score: 0,
            score_limit: DEFAULT_SCORE_LIMIT,
            missed: 0,
            terminal: None,
            selected_rows,
            auto_progress: false,
            stats: StatsAggregator::new(),
            store,
            rng,
        };
        state.load_settings();
        state
    }

    fn load_settings(&mut self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };

        match store.selected_rows() {
            Ok(Some(rows)) if !rows.is_empty() => {
                self.selected_rows = rows.into_iter().collect();
            }
            Ok(_) => {}
            Err(e) => log::warn!("using default rows: {}", e),
        }

        match store.auto_progress() {
            Ok(enabled) => self.auto_progress = enabled,
            Err(e) => log::warn!("using default auto progress: {}", e),
        }

        match store.score_limit() {
            Ok(limit) => self.score_limit = limit,
            Err(e) => log::warn!("using default score limit: {}", e),
        }

        match store.kana_statistics() {
            Ok(stats) => self.stats = StatsAggregator::with_overall(stats),
            Err(e) => log::warn!("starting without lifetime stats: {}", e),
        }
    }

    /// Dispatch one event
    pub fn handle(&mut self, event: Event) -> Command {
        match event {
            Event::Resize { width, height } => {
                self.engine.resize(Field::from_terminal(width, height));
                Command::Idle
            }
            Event::Key(key) => self.handle_key(key),
            Event::AdvanceTick => {
                if self.is_terminal() {
                    return Command::Idle;
                }
                self.advance();
                if self.is_terminal() {
                    Command::Idle
                } else {
                    Command::ScheduleAdvance
                }
            }
            Event::SpawnTick => {
                if self.is_terminal() {
                    return Command::Idle;
                }
                self.spawn();
                Command::ScheduleSpawn
            }
        }
    }

    fn handle_key(&mut self, key: Key) -> Command {
        match key {
            Key::Interrupt => {
                self.flush();
                return Command::Exit;
            }
            Key::Escape => {
                if self.is_terminal() {
                    self.flush();
                    return Command::Exit;
                }
                self.quit();
                return Command::Idle;
            }
            _ if self.is_terminal() => return Command::Idle,
            Key::Enter => {
                let input = std::mem::take(&mut self.input);
                self.submit(&input);
            }
            Key::Backspace => {
                self.input.pop();
            }
            Key::Char(c) => {
                if !c.is_control() {
                    self.input.push(c);
                }
            }
        }
        Command::Idle
    }

    /// Drop a new kana from the active character set
    pub fn spawn(&mut self) {
        if self.is_terminal() {
            return;
        }
        let active = self.rows.active_characters(&self.charset, &self.selected_rows);
        self.engine.spawn(&mut self.rng, &self.charset, &active);
    }

    /// Move every kana down; kana reaching the floor count as misses
    pub fn advance(&mut self) {
        if self.is_terminal() {
            return;
        }

        let budget = MISS_LIMIT.saturating_sub(self.missed);
        for kana in self.engine.advance(budget) {
            log::debug!("missed {} ({})", kana.character, kana.romaji);
            self.stats.record_miss(&kana.character);
            self.missed += 1;
        }

        if self.missed >= MISS_LIMIT {
            self.end_game(TerminalReason::Misses);
        }
    }

    /// Match `text` against the falling kana. The first kana with that exact
    /// romaji is removed and scored. Returns whether anything matched.
    pub fn submit(&mut self, text: &str) -> bool {
        if self.is_terminal() {
            return false;
        }

        let Some(kana) = self.engine.take_matching(text) else {
            return false;
        };

        self.score += POINTS_PER_MATCH;
        self.stats.record_correct(&kana.character);

        if self.score_limit > 0 && self.score >= self.score_limit {
            self.end_game(TerminalReason::Score);
        }
        true
    }

    /// Player asked to stop
    pub fn quit(&mut self) {
        self.end_game(TerminalReason::Quit);
    }

    /// Enter the terminal state. The first reason sticks; stats are flushed
    /// on every call.
    fn end_game(&mut self, reason: TerminalReason) {
        if self.terminal.is_none() {
            log::info!("session ended ({}), score {}, missed {}", reason, self.score, self.missed);
            self.terminal = Some(reason);
        }
        self.flush();
    }

    /// Write unflushed stat deltas through to the store
    pub fn flush(&mut self) -> usize {
        self.stats.flush(self.store.as_deref())
    }

    /// Set and persist the practice rows. Empty selects every row.
    pub fn set_selected_rows(&mut self, rows: &[String]) {
        self.selected_rows = rows.iter().cloned().collect();
        if let Some(store) = self.store.as_deref() {
            let stored = if rows.is_empty() { None } else { Some(rows) };
            if let Err(e) = store.save_selected_rows(stored) {
                log::warn!("could not save selected rows: {}", e);
            }
        }
    }

    /// Selected row ids in table order (empty means every row)
    pub fn selected_row_ids(&self) -> Vec<String> {
        self.rows
            .rows()
            .iter()
            .filter(|row| self.selected_rows.contains(&row.id))
            .map(|row| row.id.clone())
            .collect()
    }

    pub fn set_auto_progress(&mut self, enabled: bool) {
        self.auto_progress = enabled;
        if let Some(store) = self.store.as_deref() {
            if let Err(e) = store.save_auto_progress(enabled) {
                log::warn!("could not save auto progress: {}", e);
            }
        }
    }

    /// Set and persist the score limit (0 = endless)
    pub fn set_score_limit(&mut self, limit: u32) {
        self.score_limit = limit;
        if let Some(store) = self.store.as_deref() {
            if let Err(e) = store.save_score_limit(limit) {
                log::warn!("could not save score limit: {}", e);
            }
        }
    }

    /// Characters that may currently spawn
    #[allow(dead_code)]
    pub fn active_characters(&self) -> Vec<&str> {
        self.rows.active_characters(&self.charset, &self.selected_rows)
    }

    /// Missed kana, one per character, sorted by character
    pub fn missed_characters(&self) -> Vec<&Kana> {
        let mut seen = FxHashSet::default();
        let mut unique: Vec<&Kana> = self
            .engine
            .missed()
            .iter()
            .filter(|k| seen.insert(k.character.as_str()))
            .collect();
        unique.sort_by(|a, b| a.character.cmp(&b.character));
        unique
    }

    pub fn kanas(&self) -> &[Kana] {
        self.engine.kanas()
    }

    pub fn missed_history(&self) -> &[Kana] {
        self.engine.missed()
    }

    pub fn field(&self) -> Field {
        self.engine.field()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn score_limit(&self) -> u32 {
        self.score_limit
    }

    pub fn missed_count(&self) -> u32 {
        self.missed
    }

    pub fn terminal_reason(&self) -> Option<TerminalReason> {
        self.terminal
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn auto_progress(&self) -> bool {
        self.auto_progress
    }

    #[allow(dead_code)]
    pub fn charset(&self) -> &CharacterSet {
        &self.charset
    }

    pub fn rows(&self) -> &RowTable {
        &self.rows
    }

    pub fn session_correct_count(&self, character: &str) -> u32 {
        self.stats.session_correct_count(character)
    }

    /// Lifetime record for a character as of the last flush
    #[allow(dead_code)]
    pub fn overall_stat(&self, character: &str) -> Option<&CharacterStat> {
        self.stats.overall(character)
    }

    #[allow(dead_code)]
    pub fn streak(&self, character: &str) -> u32 {
        self.stats.streak(character)
    }

    #[allow(dead_code)]
    pub fn is_dirty(&self) -> bool {
        self.stats.is_dirty()
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut FallEngine {
        &mut self.engine
    }
}

impl Drop for GameState {
    fn drop(&mut self) {
        // Last chance to persist the session
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::RecordingStore;
    use std::rc::Rc;

    fn small_game(store: Option<Box<dyn Store>>) -> GameState {
        GameState::with_tables(
            CharacterSet::new("test", [("あ", "a"), ("か", "ka")]),
            RowTable::hiragana(),
            store,
            StdRng::seed_from_u64(42),
        )
    }

    fn drop_kana(state: &mut GameState, character: &str, romaji: &str, speed: f64) {
        state
            .engine_mut()
            .push(Kana::new(character, romaji, 5, speed));
    }

    fn type_text(state: &mut GameState, text: &str) {
        for c in text.chars() {
            state.handle(Event::Key(Key::Char(c)));
        }
    }

    #[test]
    fn test_defaults_without_store() {
        let state = small_game(None);
        assert_eq!(state.score(), 0);
        assert_eq!(state.score_limit(), DEFAULT_SCORE_LIMIT);
        assert!(!state.auto_progress());
        assert!(!state.is_terminal());
        assert_eq!(state.selected_row_ids().len(), 11);
        assert_eq!(state.active_characters(), vec!["あ", "か"]);
    }

    #[test]
    fn test_settings_loaded_from_store() {
        let store = RecordingStore {
            rows: Some(vec!["k".to_string()]),
            auto_progress: true,
            score_limit: Some(20),
            stats: vec![CharacterStat {
                character: "か".to_string(),
                correct_count: 4,
                miss_count: 1,
                streak: 3,
            }],
            ..Default::default()
        };
        let state = small_game(Some(Box::new(store)));
        assert_eq!(state.selected_row_ids(), vec!["k".to_string()]);
        assert!(state.auto_progress());
        assert_eq!(state.score_limit(), 20);
        assert_eq!(state.streak("か"), 3);
        assert_eq!(state.active_characters(), vec!["か"]);
    }

    #[test]
    fn test_failing_store_falls_back_to_defaults() {
        let state = small_game(Some(Box::new(RecordingStore::failing())));
        assert_eq!(state.score_limit(), DEFAULT_SCORE_LIMIT);
        assert!(!state.auto_progress());
        assert_eq!(state.selected_row_ids().len(), 11);
    }

    #[test]
    fn test_spawn_uses_active_set() {
        let mut state = small_game(None);
        for _ in 0..50 {
            state.handle(Event::SpawnTick);
        }
        assert_eq!(state.kanas().len(), 50);
        assert!(state
            .kanas()
            .iter()
            .all(|k| (k.character == "あ" && k.romaji == "a") || (k.character == "か" && k.romaji == "ka")));
    }

    #[test]
    fn test_typing_and_submit_scores() {
        let mut state = small_game(None);
        drop_kana(&mut state, "あ", "a", 0.2);

        type_text(&mut state, "a");
        assert_eq!(state.input(), "a");
        assert_eq!(state.handle(Event::Key(Key::Enter)), Command::Idle);

        assert_eq!(state.score(), 10);
        assert!(state.kanas().is_empty());
        assert_eq!(state.streak("あ"), 1);
        assert_eq!(state.session_correct_count("あ"), 1);
        assert_eq!(state.input(), "");
    }

    #[test]
    fn test_wrong_submit_clears_input_without_scoring() {
        let mut state = small_game(None);
        drop_kana(&mut state, "か", "ka", 0.2);

        type_text(&mut state, "kx");
        state.handle(Event::Key(Key::Backspace));
        assert_eq!(state.input(), "k");
        state.handle(Event::Key(Key::Enter));

        assert_eq!(state.score(), 0);
        assert_eq!(state.kanas().len(), 1);
        assert_eq!(state.input(), "");
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_backspace_on_empty_and_control_chars() {
        let mut state = small_game(None);
        state.handle(Event::Key(Key::Backspace));
        state.handle(Event::Key(Key::Char('\t')));
        assert_eq!(state.input(), "");
    }

    #[test]
    fn test_submit_matches_at_most_one() {
        let mut state = small_game(None);
        drop_kana(&mut state, "あ", "a", 0.2);
        drop_kana(&mut state, "あ", "a", 0.2);

        assert!(state.submit("a"));
        assert_eq!(state.kanas().len(), 1);
        assert_eq!(state.score(), 10);
    }

    #[test]
    fn test_score_limit_ends_session() {
        let store = Rc::new(RecordingStore::default());
        let mut state = small_game(Some(Box::new(Rc::clone(&store))));
        state.set_score_limit(20);
        drop_kana(&mut state, "あ", "a", 0.2);
        drop_kana(&mut state, "か", "ka", 0.2);

        assert!(state.submit("a"));
        assert!(!state.is_terminal());
        assert!(state.submit("ka"));
        assert_eq!(state.score(), 20);
        assert_eq!(state.terminal_reason(), Some(TerminalReason::Score));

        // flushed on termination
        assert!(!state.is_dirty());
        assert_eq!(store.saved_stats().len(), 2);
        assert_eq!(store.saved_score_limit(), Some(20));
    }

    #[test]
    fn test_zero_score_limit_is_endless() {
        let mut state = small_game(None);
        state.set_score_limit(0);
        for _ in 0..30 {
            drop_kana(&mut state, "か", "ka", 0.2);
            assert!(state.submit("ka"));
        }
        assert_eq!(state.score(), 300);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_miss_limit_ends_session() {
        let store = Rc::new(RecordingStore::default());
        let mut state = small_game(Some(Box::new(Rc::clone(&store))));
        state.handle(Event::Resize { width: 80, height: 4 });
        assert_eq!(state.field().height, 1);

        for _ in 0..9 {
            drop_kana(&mut state, "あ", "a", 1.0);
        }
        assert_eq!(state.handle(Event::AdvanceTick), Command::ScheduleAdvance);
        assert_eq!(state.missed_count(), 9);
        assert!(!state.is_terminal());
        assert_eq!(state.streak("あ"), 0);

        drop_kana(&mut state, "か", "ka", 1.0);
        drop_kana(&mut state, "か", "ka", 1.0);
        assert_eq!(state.handle(Event::AdvanceTick), Command::Idle);
        assert_eq!(state.missed_count(), 10);
        assert_eq!(state.terminal_reason(), Some(TerminalReason::Misses));
        assert_eq!(state.missed_history().len(), 10);
        assert_eq!(state.kanas().len(), 1);
        assert_eq!(store.saved_stats().len(), 2);

        // a quit arriving afterwards does not change the reason
        state.quit();
        assert_eq!(state.terminal_reason(), Some(TerminalReason::Misses));
    }

    #[test]
    fn test_quit_wins_over_later_misses() {
        let mut state = small_game(None);
        state.handle(Event::Resize { width: 80, height: 4 });
        for _ in 0..10 {
            drop_kana(&mut state, "あ", "a", 1.0);
        }

        assert_eq!(state.handle(Event::Key(Key::Escape)), Command::Idle);
        assert_eq!(state.terminal_reason(), Some(TerminalReason::Quit));

        assert_eq!(state.handle(Event::AdvanceTick), Command::Idle);
        assert_eq!(state.missed_count(), 0);
        assert_eq!(state.terminal_reason(), Some(TerminalReason::Quit));
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = small_game(None);
        drop_kana(&mut state, "あ", "a", 0.2);
        state.quit();

        let before: Vec<f64> = state.kanas().iter().map(|k| k.y).collect();
        assert_eq!(state.handle(Event::AdvanceTick), Command::Idle);
        assert_eq!(state.handle(Event::SpawnTick), Command::Idle);
        type_text(&mut state, "a");
        state.handle(Event::Key(Key::Enter));
        assert!(!state.submit("a"));

        let after: Vec<f64> = state.kanas().iter().map(|k| k.y).collect();
        assert_eq!(before, after);
        assert_eq!(state.score(), 0);
        assert_eq!(state.input(), "");
        assert_eq!(state.missed_count(), 0);
    }

    #[test]
    fn test_escape_twice_exits() {
        let mut state = small_game(None);
        assert_eq!(state.handle(Event::Key(Key::Escape)), Command::Idle);
        assert_eq!(state.handle(Event::Key(Key::Escape)), Command::Exit);
    }

    #[test]
    fn test_interrupt_flushes_and_exits() {
        let store = Rc::new(RecordingStore::default());
        let mut state = small_game(Some(Box::new(Rc::clone(&store))));
        drop_kana(&mut state, "か", "ka", 0.2);
        state.submit("ka");
        assert!(state.is_dirty());

        assert_eq!(state.handle(Event::Key(Key::Interrupt)), Command::Exit);
        assert!(!state.is_dirty());
        assert_eq!(store.saved_stats().len(), 1);
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_ticks_reschedule_while_running() {
        let mut state = small_game(None);
        assert_eq!(state.handle(Event::AdvanceTick), Command::ScheduleAdvance);
        assert_eq!(state.handle(Event::SpawnTick), Command::ScheduleSpawn);
        assert_eq!(state.kanas().len(), 1);
    }

    #[test]
    fn test_flush_twice_writes_once() {
        let store = Rc::new(RecordingStore::default());
        let mut state = small_game(Some(Box::new(Rc::clone(&store))));
        drop_kana(&mut state, "あ", "a", 0.2);
        state.submit("a");

        assert_eq!(state.flush(), 1);
        assert_eq!(state.flush(), 0);
        assert_eq!(store.saved_stats().len(), 1);
    }

    #[test]
    fn test_drop_flushes_pending_stats() {
        let store = Rc::new(RecordingStore::default());
        {
            let mut state = small_game(Some(Box::new(Rc::clone(&store))));
            drop_kana(&mut state, "あ", "a", 0.2);
            state.submit("a");
        }
        assert_eq!(store.saved_stats().len(), 1);
    }

    #[test]
    fn test_set_selected_rows_persists() {
        let store = Rc::new(RecordingStore::default());
        let mut state = small_game(Some(Box::new(Rc::clone(&store))));

        state.set_selected_rows(&["vowels".to_string()]);
        assert_eq!(state.active_characters(), vec!["あ"]);
        state.set_selected_rows(&[]);
        assert_eq!(state.active_characters(), vec!["あ", "か"]);

        assert_eq!(
            store.saved_rows(),
            vec![Some(vec!["vowels".to_string()]), None]
        );

        state.set_auto_progress(true);
        assert_eq!(store.saved_auto_progress(), Some(true));
    }

    #[test]
    fn test_missed_characters_are_unique_and_sorted() {
        let mut state = small_game(None);
        state.handle(Event::Resize { width: 80, height: 4 });
        drop_kana(&mut state, "か", "ka", 1.0);
        drop_kana(&mut state, "あ", "a", 1.0);
        drop_kana(&mut state, "か", "ka", 1.0);
        state.handle(Event::AdvanceTick);

        assert_eq!(state.missed_history().len(), 3);
        let unique: Vec<&str> = state
            .missed_characters()
            .iter()
            .map(|k| k.character.as_str())
            .collect();
        assert_eq!(unique, vec!["あ", "か"]);
    }
}
