//! Character sets: immutable character → romaji tables
//!
//! Entries keep their table order so spawning and the progress view are
//! stable across runs.

use rustc_hash::FxHashMap;

/// Basic hiragana, gojūon order.
const HIRAGANA: &[(&str, &str)] = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("を", "wo"), ("ん", "n"),
];

/// A named set of characters with their transliterations
#[derive(Clone, Debug)]
pub struct CharacterSet {
    name: String,
    /// (character, romaji) in table order
    entries: Vec<(String, String)>,
    /// Character → position in `entries`
    index: FxHashMap<String, usize>,
}

#[allow(dead_code)]
impl CharacterSet {
    /// Build a set from (character, romaji) pairs.
    /// A repeated character keeps its first romaji.
    pub fn new<I, C, R>(name: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: Into<String>,
        R: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = FxHashMap::default();

        for (character, romaji) in pairs {
            let character = character.into();
            if index.contains_key(&character) {
                continue;
            }
            index.insert(character.clone(), entries.len());
            entries.push((character, romaji.into()));
        }

        CharacterSet {
            name: name.to_string(),
            entries,
            index,
        }
    }

    /// The basic hiragana set
    pub fn hiragana() -> Self {
        Self::new("Hiragana", HIRAGANA.iter().copied())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All characters in table order
    pub fn characters(&self) -> Vec<&str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Romaji for a character, if the set contains it
    pub fn transliteration(&self, character: &str) -> Option<&str> {
        self.index
            .get(character)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, character: &str) -> bool {
        self.index.contains_key(character)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self::hiragana()
    }
}
