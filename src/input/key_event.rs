use std::cell::Cell;

use crate::{
    config::{MOD_ALT, MOD_CTRL, MOD_META, MOD_SHIFT, Shortcut},
    surface::Node,
};

/// Raw key-combination event delivered by the host page.
#[derive(Debug, Default)]
pub struct KeyEvent {
    /// Key identity as reported by the host (`"z"`, `"Z"`, `"ArrowLeft"`, ...).
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub target: Option<Node>,

    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[must_use]
    pub fn on(mut self, target: &Node) -> Self {
        self.target = Some(target.clone());
        self
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Keeps the host page from also acting on this event.
    pub fn suppress(&self) {
        self.prevent_default();
        self.stop_propagation();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    /// The event as a resolved chord; `None` for multi-character key names.
    pub fn chord(&self) -> Option<Shortcut> {
        let mut chars = self.key.chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        let mods = [
            (self.ctrl, MOD_CTRL),
            (self.shift, MOD_SHIFT),
            (self.alt, MOD_ALT),
            (self.meta, MOD_META),
        ]
        .into_iter()
        .filter(|(down, _)| *down)
        .fold(0, |acc, (_, bit)| acc | bit);

        Some(Shortcut {
            key: key.to_lowercase().next().unwrap_or(key),
            mods,
        })
    }
}
