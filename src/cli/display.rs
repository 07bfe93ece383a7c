//! Terminal display and UI rendering
//!
//! Features:
//! - Playing field (left third) with falling kana
//! - Progress table: correct answers per kana this session
//! - Missed character list
//! - Status bar and game over screen
//!
//! Layout is computed by pure functions; `Display` only paints it.

use crate::session::{GameState, TerminalReason, MISS_LIMIT};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use rustc_hash::FxHashSet;
use std::io::{stdout, Write};

/// Columns taken by one kana on the field
const KANA_CELL_WIDTH: u16 = 4;

/// Hiragana by consonant row and vowel column (a, i, u, e, o)
const KANA_TABLE: &[(&str, [&str; 5])] = &[
    ("", ["あ", "い", "う", "え", "お"]),
    ("k", ["か", "き", "く", "け", "こ"]),
    ("s", ["さ", "し", "す", "せ", "そ"]),
    ("t", ["た", "ち", "つ", "て", "と"]),
    ("n", ["な", "に", "ぬ", "ね", "の"]),
    ("h", ["は", "ひ", "ふ", "へ", "ほ"]),
    ("m", ["ま", "み", "む", "め", "も"]),
    ("y", ["や", "", "ゆ", "", "よ"]),
    ("r", ["ら", "り", "る", "れ", "ろ"]),
    ("w", ["わ", "", "", "", "を"]),
    ("", ["ん", "", "", "", ""]),
];

/// A kana cell placed on the playing field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell<'a> {
    pub row: u16,
    pub col: u16,
    pub character: &'a str,
}

/// Place falling kana on the field, top to bottom then left to right.
/// Cells in the same row never overlap; cells that would spill past the
/// field edge are dropped.
pub fn field_cells(state: &GameState) -> Vec<Cell<'_>> {
    let field = state.field();
    if field.height == 0 || field.game_width < KANA_CELL_WIDTH {
        return Vec::new();
    }

    let mut kanas: Vec<_> = state
        .kanas()
        .iter()
        .filter(|k| k.row() < u32::from(field.height) && k.x < field.game_width)
        .collect();
    kanas.sort_by(|a, b| a.row().cmp(&b.row()).then(a.x.cmp(&b.x)));

    let max_col = field.game_width - KANA_CELL_WIDTH;
    let mut cells = Vec::with_capacity(kanas.len());
    let mut current_row = u32::MAX;
    let mut next_free = 0u16;

    for kana in kanas {
        if kana.row() != current_row {
            current_row = kana.row();
            next_free = 0;
        }
        let col = kana.x.min(max_col).max(next_free);
        if col > max_col {
            continue;
        }
        next_free = col + KANA_CELL_WIDTH;
        cells.push(Cell {
            row: current_row as u16,
            col,
            character: &kana.character,
        });
    }
    cells
}

/// Right-hand panel: progress table and missed characters
pub fn info_lines(state: &GameState) -> Vec<String> {
    let mut lines = vec![
        "HIRAGANA PROGRESS".to_string(),
        String::new(),
        "   | a | i | u | e | o |".to_string(),
        "---+---+---+---+---+---|".to_string(),
    ];

    for (consonant, vowels) in KANA_TABLE {
        let label = if consonant.is_empty() { " " } else { *consonant };
        let mut line = format!(" {} |", label);
        for ch in vowels {
            if ch.is_empty() {
                line.push_str("   |");
                continue;
            }
            match state.session_correct_count(ch) {
                0 => line.push_str("  -|"),
                n => line.push_str(&format!(" {:>2}|", n)),
            }
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push("MISSED CHARACTERS".to_string());
    lines.push(String::new());

    let mut seen = FxHashSet::default();
    let missed: Vec<&str> = state
        .missed_history()
        .iter()
        .map(|k| k.character.as_str())
        .filter(|c| seen.insert(*c))
        .collect();
    if missed.is_empty() {
        lines.push("None yet!".to_string());
    } else {
        lines.extend(missed.into_iter().map(str::to_string));
    }
    lines
}

fn score_text(state: &GameState) -> String {
    if state.score_limit() > 0 {
        format!("{}/{}", state.score(), state.score_limit())
    } else {
        state.score().to_string()
    }
}

/// Status bar text (input excluded, it is painted separately)
pub fn status_line(state: &GameState) -> String {
    format!(
        "Score: {} | Missed: {}/{} | Type: ",
        score_text(state),
        state.missed_count(),
        MISS_LIMIT
    )
}

pub fn help_line(state: &GameState) -> String {
    let help = "Type the romaji and press ENTER | ESC to quit";
    if state.score_limit() > 0 {
        format!("Goal: {} points | {}", state.score_limit(), help)
    } else {
        help.to_string()
    }
}

/// Contents of the game over box
pub fn game_over_lines(state: &GameState) -> Vec<String> {
    let reason = state.terminal_reason();
    let title = if reason == Some(TerminalReason::Score) {
        "SESSION COMPLETE!"
    } else {
        "GAME OVER!"
    };

    let mut lines = vec![
        title.to_string(),
        format!("Final Score: {}", score_text(state)),
        format!("Missed: {}/{}", state.missed_count(), MISS_LIMIT),
        String::new(),
    ];

    lines.push(match reason {
        Some(TerminalReason::Score) => "You reached your target score. Nice work!".to_string(),
        Some(TerminalReason::Misses) => {
            format!("{} kana slipped through. Review them and try again.", MISS_LIMIT)
        }
        Some(TerminalReason::Quit) => {
            "You ended the session early. Review your progress below.".to_string()
        }
        None => "Session ended.".to_string(),
    });
    lines.push(String::new());

    let missed = state.missed_characters();
    if missed.is_empty() {
        lines.push("No missed characters this round!".to_string());
    } else {
        lines.push("Characters you missed:".to_string());
        for kana in missed {
            lines.push(format!("  {} -> {}", kana.character, kana.romaji));
        }
    }

    lines.push(String::new());
    lines.push("Press ESC to exit".to_string());
    lines
}

/// Terminal columns taken by `text` (kana and other CJK are double width)
pub fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

/// Terminal display manager
pub struct Display {
    /// Whether we're using alternate screen
    use_alternate_screen: bool,
}

impl Display {
    /// Take over the terminal (alternate screen, hidden cursor)
    pub fn alternate() -> Result<Self, Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        Ok(Display {
            use_alternate_screen: true,
        })
    }

    /// Paint one frame
    pub fn render(&self, state: &GameState) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();
        queue!(stdout, terminal::Clear(ClearType::All))?;

        if state.is_terminal() {
            self.paint_game_over(&mut stdout, state)?;
        } else {
            self.paint_game(&mut stdout, state)?;
        }

        stdout.flush()?;
        Ok(())
    }

    fn paint_game<W: Write>(&self, out: &mut W, state: &GameState) -> Result<(), Box<dyn std::error::Error>> {
        let field = state.field();

        for cell in field_cells(state) {
            queue!(
                out,
                cursor::MoveTo(cell.col, cell.row),
                SetAttribute(Attribute::Bold),
                SetForegroundColor(Color::Black),
                SetBackgroundColor(Color::Cyan),
                Print(format!(" {} ", cell.character)),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
        }

        // Border
        queue!(out, SetForegroundColor(Color::DarkGrey))?;
        for row in 0..field.height {
            queue!(out, cursor::MoveTo(field.game_width, row), Print("│"))?;
        }
        queue!(out, ResetColor)?;

        // Progress panel
        let info_col = field.game_width.saturating_add(2);
        for (row, line) in info_lines(state).iter().enumerate().take(field.height as usize) {
            let header = line.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
                && !line.trim().is_empty();
            queue!(
                out,
                cursor::MoveTo(info_col, row as u16),
                SetForegroundColor(if header { Color::Yellow } else { Color::White }),
                Print(line),
                ResetColor
            )?;
        }

        // Status bar + help
        queue!(
            out,
            cursor::MoveTo(0, field.height),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White),
            Print(status_line(state)),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Green),
            Print(state.input()),
            SetAttribute(Attribute::Reset),
            ResetColor,
            cursor::MoveTo(0, field.height.saturating_add(1)),
            SetForegroundColor(Color::DarkGrey),
            Print(help_line(state)),
            ResetColor
        )?;
        Ok(())
    }

    fn paint_game_over<W: Write>(&self, out: &mut W, state: &GameState) -> Result<(), Box<dyn std::error::Error>> {
        let lines = game_over_lines(state);
        let inner = lines.iter().map(|l| display_width(l)).max().unwrap_or(0) + 6;
        let height = lines.len() + 4;

        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let left = (cols as usize).saturating_sub(inner + 2) / 2;
        let top = (rows as usize).saturating_sub(height) / 2;

        let mut boxed = Vec::with_capacity(height);
        boxed.push(format!("╔{}╗", "═".repeat(inner)));
        boxed.push(format!("║{}║", " ".repeat(inner)));
        for line in &lines {
            let pad = inner - 3 - display_width(line);
            boxed.push(format!("║   {}{}║", line, " ".repeat(pad)));
        }
        boxed.push(format!("║{}║", " ".repeat(inner)));
        boxed.push(format!("╚{}╝", "═".repeat(inner)));

        for (i, line) in boxed.iter().enumerate() {
            queue!(
                out,
                cursor::MoveTo(left as u16, (top + i) as u16),
                SetForegroundColor(Color::Yellow),
                Print(line),
                ResetColor
            )?;
        }
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut stdout = stdout();

        if self.use_alternate_screen {
            execute!(stdout, LeaveAlternateScreen, cursor::Show)?;
        }

        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}
