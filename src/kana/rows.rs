//! Practice rows and active-character filtering
//!
//! A row groups related kana (e.g. the K-row か き く け こ). The player picks
//! which rows to practice; only characters from those rows may spawn.
//! Characters that belong to no row are never filtered out.

use super::CharacterSet;
use rustc_hash::{FxHashMap, FxHashSet};

const HIRAGANA_ROWS: &[(&str, &str, &[&str])] = &[
    ("vowels", "Vowels (あ)", &["あ", "い", "う", "え", "お"]),
    ("k", "K-row (か)", &["か", "き", "く", "け", "こ"]),
    ("s", "S-row (さ)", &["さ", "し", "す", "せ", "そ"]),
    ("t", "T-row (た)", &["た", "ち", "つ", "て", "と"]),
    ("n", "N-row (な)", &["な", "に", "ぬ", "ね", "の"]),
    ("h", "H-row (は)", &["は", "ひ", "ふ", "へ", "ほ"]),
    ("m", "M-row (ま)", &["ま", "み", "む", "め", "も"]),
    ("y", "Y-row (や)", &["や", "ゆ", "よ"]),
    ("r", "R-row (ら)", &["ら", "り", "る", "れ", "ろ"]),
    ("w", "W-row (わ)", &["わ", "を"]),
    ("n-only", "N (ん)", &["ん"]),
];

/// A named group of characters used to scope practice
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub label: String,
    pub characters: Vec<String>,
}

/// Immutable row list plus a character → row id lookup
#[derive(Clone, Debug)]
pub struct RowTable {
    rows: Vec<Row>,
    char_to_row: FxHashMap<String, usize>,
}

impl RowTable {
    /// Build a table. Row ids are expected to be unique; a character listed
    /// in more than one row belongs to the first.
    pub fn new(rows: Vec<Row>) -> Self {
        let mut char_to_row = FxHashMap::default();
        for (idx, row) in rows.iter().enumerate() {
            for ch in &row.characters {
                char_to_row.entry(ch.clone()).or_insert(idx);
            }
        }
        RowTable { rows, char_to_row }
    }

    /// The basic hiragana rows
    pub fn hiragana() -> Self {
        let rows = HIRAGANA_ROWS
            .iter()
            .map(|(id, label, chars)| Row {
                id: id.to_string(),
                label: label.to_string(),
                characters: chars.iter().map(|c| c.to_string()).collect(),
            })
            .collect();
        Self::new(rows)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row id for a character, `None` if it belongs to no row
    pub fn row_of(&self, character: &str) -> Option<&str> {
        self.char_to_row
            .get(character)
            .map(|&idx| self.rows[idx].id.as_str())
    }

    pub fn contains_row(&self, id: &str) -> bool {
        self.rows.iter().any(|row| row.id == id)
    }

    /// Every row id in table order
    pub fn default_row_ids(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.id.clone()).collect()
    }

    /// Clean up a user selection: trim, drop blanks and unknown ids, dedupe,
    /// order by table. An empty result selects every row.
    pub fn normalize_selection<S: AsRef<str>>(&self, selection: &[S]) -> Vec<String> {
        let wanted: FxHashSet<&str> = selection
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect();

        let normalized: Vec<String> = self
            .rows
            .iter()
            .filter(|row| wanted.contains(row.id.as_str()))
            .map(|row| row.id.clone())
            .collect();

        if normalized.is_empty() {
            return self.default_row_ids();
        }
        normalized
    }

    /// Characters that may spawn for the given row selection.
    ///
    /// An empty selection means every character. Characters outside all rows
    /// are always kept. If filtering removes everything, the full set is
    /// returned so a running game always has something to spawn.
    pub fn active_characters<'a>(
        &self,
        charset: &'a CharacterSet,
        selected: &FxHashSet<String>,
    ) -> Vec<&'a str> {
        let all = charset.characters();
        if all.is_empty() || selected.is_empty() {
            return all;
        }

        let filtered: Vec<&str> = all
            .iter()
            .copied()
            .filter(|ch| match self.row_of(ch) {
                None => true,
                Some(row_id) => selected.contains(row_id),
            })
            .collect();

        if filtered.is_empty() {
            return all;
        }
        filtered
    }
}

impl Default for RowTable {
    fn default() -> Self {
        Self::hiragana()
    }
}
