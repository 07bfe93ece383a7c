//! Spawn / fall engine
//!
//! Owns the playing field geometry, the kana currently falling, and the
//! history of kana that reached the floor.

use super::entity::Kana;
use crate::kana::CharacterSet;
use rand::Rng;
use std::time::Duration;

/// Interval between advance ticks
pub const ADVANCE_INTERVAL: Duration = Duration::from_millis(100);
/// Interval between spawn ticks
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(4);

/// Columns kept clear on both sides of the field when spawning
pub const SPAWN_MARGIN: u16 = 5;
/// Slowest fall speed, rows per advance tick
pub const MIN_SPEED: f64 = 0.15;
/// Speeds are drawn from [MIN_SPEED, MIN_SPEED + SPEED_SPREAD)
pub const SPEED_SPREAD: f64 = 0.1;
/// Misses that end a session
pub const MISS_LIMIT: u32 = 10;

/// Rows reserved under the field for the status bar and help line
const STATUS_ROWS: u16 = 3;

/// Screen and playing field dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Full terminal width
    #[allow(dead_code)]
    pub width: u16,
    /// Playing field height (terminal rows minus status area)
    pub height: u16,
    /// Playing field width (left third of the screen)
    pub game_width: u16,
}

impl Field {
    /// Field for a terminal of `cols` x `rows`
    pub fn from_terminal(cols: u16, rows: u16) -> Self {
        Field {
            width: cols,
            height: rows.saturating_sub(STATUS_ROWS),
            game_width: cols / 3,
        }
    }

    /// Column for a new kana, kept `SPAWN_MARGIN` away from both edges.
    /// Fields too narrow for the margins get a single fixed column.
    fn spawn_column<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        let span = self.game_width.saturating_sub(2 * SPAWN_MARGIN);
        if span == 0 {
            return SPAWN_MARGIN.min(self.game_width.saturating_sub(1));
        }
        SPAWN_MARGIN + rng.gen_range(0..span)
    }
}

impl Default for Field {
    fn default() -> Self {
        Field {
            width: 80,
            height: 24,
            game_width: 26,
        }
    }
}

/// Falling kana plus miss history
#[derive(Clone, Debug, Default)]
pub struct FallEngine {
    field: Field,
    kanas: Vec<Kana>,
    missed: Vec<Kana>,
}

impl FallEngine {
    pub fn new(field: Field) -> Self {
        FallEngine {
            field,
            kanas: Vec::new(),
            missed: Vec::new(),
        }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn resize(&mut self, field: Field) {
        self.field = field;
    }

    /// Kana currently on the field
    pub fn kanas(&self) -> &[Kana] {
        &self.kanas
    }

    /// Every kana that reached the floor, in order, duplicates kept
    pub fn missed(&self) -> &[Kana] {
        &self.missed
    }

    /// Drop a new kana picked uniformly from `active`.
    /// Does nothing if `active` is empty.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        charset: &CharacterSet,
        active: &[&str],
    ) -> Option<&Kana> {
        if active.is_empty() {
            return None;
        }

        let character = active[rng.gen_range(0..active.len())];
        let romaji = charset.transliteration(character)?;
        let x = self.field.spawn_column(rng);
        let speed = MIN_SPEED + rng.gen::<f64>() * SPEED_SPREAD;

        log::trace!("spawn {} ({}) at x={} speed={:.3}", character, romaji, x, speed);
        self.kanas.push(Kana::new(character, romaji, x, speed));
        self.kanas.last()
    }

    /// Move every kana down one tick. Kana that reach the floor are removed,
    /// appended to the miss history and returned.
    ///
    /// At most `miss_budget` misses are taken; once the budget is used up the
    /// pass stops and the remaining kana stay where they are.
    pub fn advance(&mut self, miss_budget: u32) -> Vec<Kana> {
        let mut landed = Vec::new();

        for idx in (0..self.kanas.len()).rev() {
            if landed.len() as u32 >= miss_budget {
                break;
            }

            self.kanas[idx].advance();
            if self.kanas[idx].has_landed(self.field.height) {
                let kana = self.kanas.remove(idx);
                self.missed.push(kana.clone());
                landed.push(kana);
            }
        }

        landed
    }

    /// Remove and return the first kana whose romaji equals `input`
    pub fn take_matching(&mut self, input: &str) -> Option<Kana> {
        let idx = self.kanas.iter().position(|k| k.romaji == input)?;
        Some(self.kanas.remove(idx))
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, kana: Kana) {
        self.kanas.push(kana);
    }
}
