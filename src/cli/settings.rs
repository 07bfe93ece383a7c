//! Startup settings form
//!
//! Plain line prompts shown before the game takes over the terminal:
//! - practice rows (comma separated ids)
//! - automatic progression (y/n)
//! - score limit (0 = endless)
//!
//! A blank answer keeps the current value. End of input cancels setup.

use crate::kana::RowTable;
use std::error::Error;
use std::io::{BufRead, Write};

/// Values collected by the form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub rows: Vec<String>,
    pub auto_progress: bool,
    pub score_limit: u32,
}

/// Run the form. Returns `None` if the player cancelled (end of input).
pub fn run_settings_form<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    table: &RowTable,
    current: &Settings,
) -> Result<Option<Settings>, Box<dyn Error>> {
    writeln!(out, "Kana Practice Setup")?;
    writeln!(
        out,
        "Select the rows you want to study. You can change these later.\n"
    )?;

    for row in table.rows() {
        let mark = if current.rows.contains(&row.id) { 'x' } else { ' ' };
        writeln!(out, "  [{}] {:<8} {}", mark, row.id, row.label)?;
    }
    writeln!(out)?;

    // Rows
    write!(out, "Rows to practice (comma separated, blank keeps current): ")?;
    out.flush()?;
    let Some(line) = read_line(input)? else {
        return Ok(None);
    };
    let rows = if line.trim().is_empty() {
        table.normalize_selection(current.rows.as_slice())
    } else {
        let requested: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect();
        let unknown: Vec<&str> = requested
            .iter()
            .copied()
            .filter(|id| !table.contains_row(id))
            .collect();
        if !unknown.is_empty() {
            writeln!(out, "Ignoring unknown rows: {}", unknown.join(", "))?;
        }
        table.normalize_selection(requested.as_slice())
    };

    // Auto progress
    let auto_progress = loop {
        let hint = if current.auto_progress { "Y/n" } else { "y/N" };
        write!(out, "Enable automatic progression? [{}]: ", hint)?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse_yes_no(&line, current.auto_progress) {
            Some(answer) => break answer,
            None => writeln!(out, "Please answer y or n.")?,
        }
    };

    // Score limit
    let score_limit = loop {
        write!(
            out,
            "Score limit before the session ends, 0 for endless practice [{}]: ",
            current.score_limit
        )?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            break current.score_limit;
        }
        match parse_score_limit(&line) {
            Ok(limit) => break limit,
            Err(msg) => writeln!(out, "{}", msg)?,
        }
    };

    Ok(Some(Settings {
        rows,
        auto_progress,
        score_limit,
    }))
}

/// One line without its terminator, `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, Box<dyn Error>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// y/yes/n/no (any case); blank gives `default`; anything else is `None`
pub fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Validate a score limit entered by the player
pub fn parse_score_limit(value: &str) -> Result<u32, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("enter a number");
    }
    let n: i64 = value.parse().map_err(|_| "enter a valid whole number")?;
    if n < 0 {
        return Err("score limit must be zero or greater");
    }
    u32::try_from(n).map_err(|_| "score limit is too large")
}
