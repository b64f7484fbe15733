use serde::Deserialize;

use super::{PrimaryModifier, Shortcut, constants};

fn default_undo_window_ms() -> u64 {
    constants::DEFAULT_UNDO_WINDOW_MS
}

fn default_request_timeout_ms() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_MS
}

/// Unvalidated on-disk shape of [`super::Config`].
///
/// A shortcut key missing from the file disables that binding.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub primary_modifier: PrimaryModifier,
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub shortcut_convert: Option<Shortcut>,
    #[serde(default)]
    pub shortcut_translate: Option<Shortcut>,
    #[serde(default)]
    pub shortcut_rephrase: Option<Shortcut>,
    #[serde(default)]
    pub shortcut_undo: Option<Shortcut>,
}

impl RawConfig {
    pub fn validate(&self) -> Result<(), String> {
        super::config_validator::check_durations(self.undo_window_ms, self.request_timeout_ms)?;

        let shortcuts = [
            (constants::CONVERT, self.shortcut_convert),
            (constants::TRANSLATE, self.shortcut_translate),
            (constants::REPHRASE, self.shortcut_rephrase),
            (constants::UNDO, self.shortcut_undo),
        ];

        match super::config_validator::describe_duplicates(&shortcuts, self.primary_modifier) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
