mod config_validator;
pub mod constants;
pub mod raw_config;

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

pub use config_validator::find_duplicate_shortcuts;
pub use constants::{MOD_ALT, MOD_CTRL, MOD_META, MOD_PRIMARY, MOD_SHIFT};
pub use raw_config::RawConfig;
use serde::{Deserialize, Deserializer, Serialize};

const APP_NAME: &str = "layout-fixer";
const CONFIG_NAME: &str = "config";

/// Which physical modifier stands in for [`MOD_PRIMARY`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryModifier {
    /// Cmd on macOS, Ctrl everywhere else.
    #[default]
    Auto,
    Ctrl,
    Meta,
}

impl PrimaryModifier {
    pub const fn modifier_bit(self) -> u32 {
        match self {
            PrimaryModifier::Auto => {
                if cfg!(target_os = "macos") {
                    MOD_META
                } else {
                    MOD_CTRL
                }
            }
            PrimaryModifier::Ctrl => MOD_CTRL,
            PrimaryModifier::Meta => MOD_META,
        }
    }
}

/// A key plus an exact modifier set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shortcut {
    pub key: char,
    pub mods: u32,
}

impl Shortcut {
    pub const fn new(key: char, mods: u32) -> Self {
        Self { key, mods }
    }

    /// Lowercases the key and replaces `MOD_PRIMARY` with the concrete modifier.
    pub fn resolve(self, primary: PrimaryModifier) -> Self {
        let mut mods = self.mods;
        if mods & MOD_PRIMARY != 0 {
            mods = (mods & !MOD_PRIMARY) | primary.modifier_bit();
        }
        Self {
            key: self.key.to_lowercase().next().unwrap_or(self.key),
            mods,
        }
    }
}

pub(crate) mod default_shortcuts {
    use super::{MOD_CTRL, MOD_PRIMARY, MOD_SHIFT, Shortcut};

    pub const CONVERT: Option<Shortcut> = Some(Shortcut::new('z', MOD_PRIMARY | MOD_SHIFT));
    pub const TRANSLATE: Option<Shortcut> = Some(Shortcut::new('x', MOD_CTRL | MOD_SHIFT));
    pub const REPHRASE: Option<Shortcut> = Some(Shortcut::new('h', MOD_CTRL | MOD_SHIFT));
    pub const UNDO: Option<Shortcut> = Some(Shortcut::new('z', MOD_CTRL));
}

/// Action a shortcut is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutSlot {
    Convert,
    Translate,
    Rephrase,
    Undo,
}

impl ShortcutSlot {
    /// Convert is checked before undo so Ctrl+Shift+Z never reaches undo.
    pub const MATCH_PRIORITY: [ShortcutSlot; 4] = [
        ShortcutSlot::Convert,
        ShortcutSlot::Translate,
        ShortcutSlot::Rephrase,
        ShortcutSlot::Undo,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ShortcutSlot::Convert => constants::CONVERT,
            ShortcutSlot::Translate => constants::TRANSLATE,
            ShortcutSlot::Rephrase => constants::REPHRASE,
            ShortcutSlot::Undo => constants::UNDO,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub primary_modifier: PrimaryModifier,
    pub undo_window_ms: u64,
    pub request_timeout_ms: u64,

    pub shortcut_convert: Option<Shortcut>,
    pub shortcut_translate: Option<Shortcut>,
    pub shortcut_rephrase: Option<Shortcut>,
    pub shortcut_undo: Option<Shortcut>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary_modifier: PrimaryModifier::Auto,
            undo_window_ms: constants::DEFAULT_UNDO_WINDOW_MS,
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,

            shortcut_convert: default_shortcuts::CONVERT,
            shortcut_translate: default_shortcuts::TRANSLATE,
            shortcut_rephrase: default_shortcuts::REPHRASE,
            shortcut_undo: default_shortcuts::UNDO,
        }
    }
}

/// Default location: `<platform config dir>/layout-fixer/config.toml`.
pub fn config_path() -> io::Result<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(confy_err)
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    std::fs::create_dir_all(dir)
}

fn confy_err(e: confy::ConfyError) -> io::Error {
    io::Error::other(e)
}

pub fn load() -> io::Result<Config> {
    load_from(&config_path()?)
}

/// Loads `path`, writing the defaults there first if it does not exist.
pub fn load_from(path: &Path) -> io::Result<Config> {
    ensure_parent_dir(path)?;
    confy::load_path(path).map_err(confy_err)
}

pub fn save(cfg: &Config) -> io::Result<()> {
    save_to(&config_path()?, cfg)
}

/// Validates and stores `cfg`; an invalid config fails with `InvalidInput`.
pub fn save_to(path: &Path, cfg: &Config) -> io::Result<()> {
    cfg.validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    ensure_parent_dir(path)?;
    confy::store_path(path, cfg).map_err(confy_err)
}

impl TryFrom<RawConfig> for Config {
    type Error = String;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        raw.validate()?;

        Ok(Self {
            primary_modifier: raw.primary_modifier,
            undo_window_ms: raw.undo_window_ms,
            request_timeout_ms: raw.request_timeout_ms,
            shortcut_convert: raw.shortcut_convert,
            shortcut_translate: raw.shortcut_translate,
            shortcut_rephrase: raw.shortcut_rephrase,
            shortcut_undo: raw.shortcut_undo,
        })
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawConfig::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        config_validator::check_durations(self.undo_window_ms, self.request_timeout_ms)?;
        self.validate_shortcuts()
    }

    pub fn shortcut(&self, slot: ShortcutSlot) -> Option<Shortcut> {
        match slot {
            ShortcutSlot::Convert => self.shortcut_convert,
            ShortcutSlot::Translate => self.shortcut_translate,
            ShortcutSlot::Rephrase => self.shortcut_rephrase,
            ShortcutSlot::Undo => self.shortcut_undo,
        }
    }

    /// `None` disables the binding.
    pub fn set_shortcut(&mut self, slot: ShortcutSlot, shortcut: Option<Shortcut>) {
        let field = match slot {
            ShortcutSlot::Convert => &mut self.shortcut_convert,
            ShortcutSlot::Translate => &mut self.shortcut_translate,
            ShortcutSlot::Rephrase => &mut self.shortcut_rephrase,
            ShortcutSlot::Undo => &mut self.shortcut_undo,
        };
        *field = shortcut;
    }

    pub(crate) fn named_shortcuts(&self) -> [(&'static str, Option<Shortcut>); 4] {
        ShortcutSlot::MATCH_PRIORITY.map(|slot| (slot.name(), self.shortcut(slot)))
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
