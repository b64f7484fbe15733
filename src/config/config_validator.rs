use std::fmt::Write as _;

use crate::config::{Config, PrimaryModifier, Shortcut};

/// Reports every pair of actions bound to the same effective chord.
pub fn find_duplicate_shortcuts(config: &Config) -> Option<String> {
    describe_duplicates(&config.named_shortcuts(), config.primary_modifier)
}

/// A zero undo window would silently disable undo; a zero timeout fails every request.
pub(super) fn check_durations(undo_window_ms: u64, request_timeout_ms: u64) -> Result<(), String> {
    if undo_window_ms == 0 {
        return Err("undo_window_ms must be greater than zero".to_string());
    }
    if request_timeout_ms == 0 {
        return Err("request_timeout_ms must be greater than zero".to_string());
    }
    Ok(())
}

pub(super) fn describe_duplicates(
    shortcuts: &[(&str, Option<Shortcut>)],
    primary: PrimaryModifier,
) -> Option<String> {
    // Compare resolved chords: Primary+Shift+Z and Ctrl+Shift+Z collide off macOS.
    let resolved: Vec<(&str, Shortcut)> = shortcuts
        .iter()
        .filter_map(|(name, sc)| sc.map(|sc| (*name, sc.resolve(primary))))
        .collect();

    let duplicates: Vec<_> = resolved
        .iter()
        .enumerate()
        .flat_map(|(i, (name1, sc1))| {
            resolved
                .iter()
                .skip(i + 1)
                .filter(move |(_, sc2)| sc1 == sc2)
                .map(move |(name2, _)| (*name1, *name2))
        })
        .collect();

    if duplicates.is_empty() {
        return None;
    }

    let mut error = String::from("Duplicate shortcuts found:\n\n");
    for (name1, name2) in &duplicates {
        let _ = writeln!(error, "- '{name1}' and '{name2}'");
    }
    error.push_str("\nEach action must have a unique shortcut.");
    Some(error)
}

impl Config {
    pub fn validate_shortcuts(&self) -> Result<(), String> {
        match find_duplicate_shortcuts(self) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
