//! Falling kana entity

/// A kana falling down the playing field
#[derive(Clone, Debug, PartialEq)]
pub struct Kana {
    pub character: String,
    pub romaji: String,
    /// Column inside the playing field
    pub x: u16,
    /// Fractional row, grows every advance tick
    pub y: f64,
    /// Rows per advance tick (> 0)
    pub speed: f64,
}

impl Kana {
    pub fn new(character: &str, romaji: &str, x: u16, speed: f64) -> Self {
        Kana {
            character: character.to_string(),
            romaji: romaji.to_string(),
            x,
            y: 0.0,
            speed,
        }
    }

    /// Move down by one tick's worth
    pub fn advance(&mut self) {
        self.y += self.speed;
    }

    /// Row the kana currently occupies
    pub fn row(&self) -> u32 {
        self.y as u32
    }

    /// Whether the kana has reached a floor at `height` rows
    pub fn has_landed(&self, height: u16) -> bool {
        self.row() >= u32::from(height)
    }
}
