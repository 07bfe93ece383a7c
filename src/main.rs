//! Kana Drop - terminal arcade trainer for hiragana
//!
//! Kana fall down the playing field; type their romaji and press ENTER
//! before they reach the bottom. Settings and lifetime per-character stats
//! are kept in a local SQLite file.

mod cli;
mod kana;
mod session;
mod store;

use clap::Parser;
use cli::clock::TickClock;
use cli::display::Display;
use cli::input::InputHandler;
use cli::settings::{run_settings_form, Settings};
use session::{Command, Event, GameState, TerminalReason};
use std::error::Error;
use std::fs::File;
use std::io;
use std::time::{Duration, Instant};
use store::{SqliteStore, Store};

/// Longest wait for input before the screen is redrawn
const MAX_FRAME_WAIT: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "kana-drop")]
#[command(about = "Type the romaji before the falling kana hit the floor")]
struct Args {
    /// Path to the settings / stats database
    #[arg(long, env = "KANA_DROP_DB", default_value = "kana.db")]
    db: String,

    /// Start right away with the stored settings
    #[arg(long)]
    skip_setup: bool,

    /// Write log records to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Route logs to a file; the terminal belongs to the game.
/// Without a file, logging stays off unless RUST_LOG is set.
fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let default_level = match (&args.log_file, args.debug) {
        (_, true) => "debug",
        (Some(_), false) => "info",
        (None, false) => "off",
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_store(path: &str) -> Option<Box<dyn Store>> {
    match SqliteStore::open(path) {
        Ok(store) => Some(Box::new(store)),
        Err(e) => {
            log::warn!("running without persistence, could not open {}: {}", path, e);
            eprintln!("⚠ Could not open {} ({}); progress will not be saved.", path, e);
            None
        }
    }
}

/// Ask for settings and apply them. Returns false if the player cancelled.
fn setup(state: &mut GameState) -> Result<bool, Box<dyn Error>> {
    let mut rows = state.selected_row_ids();
    if rows.is_empty() {
        rows = state.rows().default_row_ids();
    }
    let current = Settings {
        rows,
        auto_progress: state.auto_progress(),
        score_limit: state.score_limit(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let Some(settings) = run_settings_form(&mut input, &mut out, state.rows(), &current)? else {
        return Ok(false);
    };

    state.set_selected_rows(&settings.rows);
    state.set_auto_progress(settings.auto_progress);
    state.set_score_limit(settings.score_limit);
    Ok(true)
}

/// Event loop: one event at a time, ticks re-armed only on request
fn run(state: &mut GameState) -> Result<(), Box<dyn Error>> {
    let display = Display::alternate()?;
    let input = InputHandler::new();

    let (cols, rows) = crossterm::terminal::size()?;
    state.handle(Event::Resize {
        width: cols,
        height: rows,
    });

    let mut clock = TickClock::start(Instant::now());

    'session: loop {
        display.render(state)?;

        let wait = clock.time_until_next(Instant::now(), MAX_FRAME_WAIT);
        if let Some(event) = input.read_event(wait)? {
            let command = state.handle(event);
            if command == Command::Exit {
                break 'session;
            }
            clock.apply(command, Instant::now());
        }

        for tick in clock.take_due(Instant::now()) {
            let command = state.handle(tick);
            clock.apply(command, Instant::now());
        }
    }

    display.shutdown()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut state = GameState::new(open_store(&args.db));

    if !args.skip_setup && !setup(&mut state)? {
        println!("Setup cancelled. Goodbye!");
        return Ok(());
    }

    InputHandler::enable_raw_mode()?;
    let result = run(&mut state);
    // Restore the terminal even if the loop failed
    let _ = InputHandler::disable_raw_mode();

    state.flush();
    result?;

    // Summary
    let reason = match state.terminal_reason() {
        Some(TerminalReason::Score) => "target score reached",
        Some(TerminalReason::Misses) => "too many misses",
        Some(TerminalReason::Quit) => "ended early",
        None => "interrupted",
    };
    println!(
        "Session over ({}): score {} | missed {}",
        reason,
        state.score(),
        state.missed_count()
    );

    Ok(())
}
