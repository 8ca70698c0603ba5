//! First-run interactive setup

use crate::config::EngineConfig;
use colored::*;
use console::Term;
use std::io;

/// Parse a strictly positive integer answer
pub fn parse_positive(input: &str) -> Option<u64> {
    input.trim().parse::<u64>().ok().filter(|value| *value > 0)
}

/// Ask for the freeze thresholds, keeping current values on empty or invalid input
pub fn run_interactive(engine: &mut EngineConfig, forced: bool) -> io::Result<()> {
    let term = Term::stdout();
    if !console::user_attended() {
        return Ok(());
    }

    let mode = if forced {
        "   > Mode: FORCED SETUP"
    } else {
        "   > Mode: FIRST RUN SETUP"
    };
    term.write_line(mode)?;
    term.write_line("----------------------------------------")?;

    engine.idle_timeout_secs = prompt(
        &term,
        "[1] Enter Freeze Timeout (Seconds)",
        engine.idle_timeout_secs,
    )?;
    engine.min_memory_mb = prompt(
        &term,
        "[2] Enter Minimum RAM to Freeze (MB)",
        engine.min_memory_mb,
    )?;

    Ok(())
}

fn prompt(term: &Term, label: &str, current: u64) -> io::Result<u64> {
    term.write_str(&format!("{} [Default: {}]: ", label, current))?;
    let answer = term.read_line()?;

    match parse_positive(&answer) {
        Some(value) => Ok(value),
        None => {
            if !answer.trim().is_empty() {
                term.write_line(&format!("{}", "Invalid value, keeping default".yellow()))?;
            }
            Ok(current)
        }
    }
}
