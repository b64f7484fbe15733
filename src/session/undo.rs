use std::time::{Duration, Instant};

use crate::surface::{Node, WeakNode};

/// Pre-transformation snapshot of the last transformed surface.
///
/// Capacity is one: every successful transformation replaces the slot.
#[derive(Clone, Debug)]
pub struct UndoSlot {
    surface: WeakNode,
    original_text: String,
    captured_at: Instant,
}

impl UndoSlot {
    pub fn capture(surface: WeakNode, original_text: String, captured_at: Instant) -> Self {
        Self {
            surface,
            original_text,
            captured_at,
        }
    }

    /// Expired strictly after `window` has elapsed since capture.
    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.captured_at) > window
    }

    pub fn belongs_to(&self, node: &Node) -> bool {
        self.surface.points_to(node)
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}
