use crate::{
    config::{Config, PrimaryModifier, Shortcut, ShortcutSlot},
    input::KeyEvent,
    service::TransformKind,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShortcutAction {
    Transform(TransformKind),
    Undo,
}

impl From<ShortcutSlot> for ShortcutAction {
    fn from(slot: ShortcutSlot) -> Self {
        match slot {
            ShortcutSlot::Convert => ShortcutAction::Transform(TransformKind::Convert),
            ShortcutSlot::Translate => ShortcutAction::Transform(TransformKind::Translate),
            ShortcutSlot::Rephrase => ShortcutAction::Transform(TransformKind::Rephrase),
            ShortcutSlot::Undo => ShortcutAction::Undo,
        }
    }
}

/// Resolved chords for every bound action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutBindings {
    slots: Vec<(ShortcutSlot, Shortcut)>,
}

impl Default for ShortcutBindings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ShortcutBindings {
    pub fn from_config(config: &Config) -> Self {
        Self::resolve(config, config.primary_modifier)
    }

    fn resolve(config: &Config, primary: PrimaryModifier) -> Self {
        let slots = ShortcutSlot::MATCH_PRIORITY
            .into_iter()
            .filter_map(|slot| config.shortcut(slot).map(|sc| (slot, sc.resolve(primary))))
            .collect();
        Self { slots }
    }

    pub fn chord_for(&self, slot: ShortcutSlot) -> Option<Shortcut> {
        self.slots
            .iter()
            .find_map(|(s, sc)| (*s == slot).then_some(*sc))
    }

    /// First action whose chord equals the event's, in [`ShortcutSlot::MATCH_PRIORITY`] order.
    pub fn match_event(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        let chord = event.chord()?;
        self.slots
            .iter()
            .find(|(_, sc)| *sc == chord)
            .map(|(slot, _)| ShortcutAction::from(*slot))
    }
}
