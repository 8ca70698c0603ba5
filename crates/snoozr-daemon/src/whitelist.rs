//! VIP whitelist file
//!
//! One protected name per line, taken verbatim apart from the line ending.
//! Lines starting with `#` and lines shorter than two characters are ignored.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Written when no whitelist exists yet
pub const DEFAULT_WHITELIST: &str = "Spotify\nDiscord\nActivity Monitor\n";

/// Entries beyond this are ignored
pub const MAX_ENTRIES: usize = 20;

/// Parse whitelist file content
pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end_matches(['\r', '\n']))
        .filter(|line| line.chars().count() >= 2 && !line.starts_with('#'))
        .take(MAX_ENTRIES)
        .map(str::to_string)
        .collect()
}

/// Load the whitelist, creating the default file if it is missing
///
/// Never fails: an unreadable file is treated as empty.
pub fn load_or_create(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let entries = parse(&content);
            info!("Loaded {} VIP apps from {:?}", entries.len(), path);
            entries
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            match fs::write(path, DEFAULT_WHITELIST) {
                Ok(()) => info!("Created default whitelist {:?}", path),
                Err(e) => warn!("Could not create whitelist {:?}: {}", path, e),
            }
            parse(DEFAULT_WHITELIST)
        }
        Err(e) => {
            warn!("Could not read whitelist {:?}: {}, continuing without VIP apps", path, e);
            Vec::new()
        }
    }
}
