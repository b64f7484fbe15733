use std::time::Instant;

use layout_fixer_core::text::{TextRange, slice_utf16, utf16_len};

use crate::{
    service::TransformKind,
    surface::{EditableSurface, TextSurface, WeakNode},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpanOrigin {
    /// The surface had a non-collapsed selection.
    Selection,
    /// No selection: the whole text.
    WholeField,
}

/// Text range that is the subject of one transformation.
///
/// The text itself is never stored; it is read from the surface when needed.
#[derive(Clone, Debug)]
pub struct ConversionSpan {
    surface: WeakNode,
    range: TextRange,
    origin: SpanOrigin,
}

impl ConversionSpan {
    /// Selection bounds if the selection is non-collapsed, otherwise the full text.
    ///
    /// Returns `None` when there is nothing to transform.
    pub fn capture(surface: &EditableSurface) -> Option<Self> {
        let text = surface.text();
        if text.is_empty() {
            return None;
        }

        let len = utf16_len(&text);
        let selection = surface.selection();

        let (range, origin) = if !selection.is_collapsed() && selection.fits(len) {
            (selection, SpanOrigin::Selection)
        } else {
            (TextRange { start: 0, end: len }, SpanOrigin::WholeField)
        };

        Some(Self {
            surface: surface.downgrade(),
            range,
            origin,
        })
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn origin(&self) -> SpanOrigin {
        self.origin
    }

    pub fn surface(&self) -> &WeakNode {
        &self.surface
    }

    /// Current text under the span, or `None` if it no longer fits the surface.
    pub fn text(&self) -> Option<String> {
        let (_, current) = self.revalidate()?;
        slice_utf16(&current, self.range).map(str::to_string)
    }

    /// Checks the span against the surface as it is now.
    ///
    /// The surface must still be attached and editable. A selection span must
    /// still fit the text; a whole-field span requires the text to have kept
    /// its length. On success returns the surface and its current text.
    pub fn revalidate(&self) -> Option<(EditableSurface, String)> {
        let node = self.surface.attached()?;
        let surface = EditableSurface::resolve(&node)?;
        let current = surface.text();
        let len = utf16_len(&current);

        let fits = match self.origin {
            SpanOrigin::Selection => self.range.fits(len),
            SpanOrigin::WholeField => self.range.start == 0 && self.range.end == len,
        };

        (fits && slice_utf16(&current, self.range).is_some()).then_some((surface, current))
    }
}

/// One in-flight converter call.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    pub kind: TransformKind,
    pub span: ConversionSpan,
    pub dispatched_at: Instant,
}
