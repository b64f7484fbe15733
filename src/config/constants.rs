//! Modifier bits and action names shared by configuration and key matching.

pub const MOD_CTRL: u32 = 0x0001;
pub const MOD_SHIFT: u32 = 0x0002;
pub const MOD_ALT: u32 = 0x0004;
pub const MOD_META: u32 = 0x0008;
/// Placeholder resolved to `MOD_META` on macOS hosts and `MOD_CTRL` elsewhere.
pub const MOD_PRIMARY: u32 = 0x0010;

pub const CONVERT: &str = "Convert layout";
pub const TRANSLATE: &str = "Translate";
pub const REPHRASE: &str = "Rephrase";
pub const UNDO: &str = "Undo";

pub const DEFAULT_UNDO_WINDOW_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
