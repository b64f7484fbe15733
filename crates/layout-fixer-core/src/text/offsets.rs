// File: crates/layout-fixer-core/src/text/offsets.rs

/// Half-open range `[start, end)` in UTF-16 code units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Builds a range from two offsets in any order.
    pub const fn ordered(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub const fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub const fn is_collapsed(self) -> bool {
        self.start == self.end
    }

    pub const fn len(self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(self) -> bool {
        self.is_collapsed()
    }

    /// `true` when the range lies inside a text of `len` code units.
    pub const fn fits(self, len: usize) -> bool {
        self.start <= self.end && self.end <= len
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Maps a UTF-16 offset to a byte index into `s`.
///
/// Returns `None` when `units` is past the end of `s` or points between the
/// two halves of a surrogate pair.
pub fn byte_index(s: &str, units: usize) -> Option<usize> {
    let mut seen = 0usize;
    for (idx, ch) in s.char_indices() {
        if seen == units {
            return Some(idx);
        }
        seen += ch.len_utf16();
        if seen > units {
            return None;
        }
    }
    (seen == units).then_some(s.len())
}

/// Largest code point boundary at or below `units`, never past the end of `s`.
pub fn floor_boundary(s: &str, units: usize) -> usize {
    let mut seen = 0usize;
    for ch in s.chars() {
        let next = seen + ch.len_utf16();
        if next > units {
            return seen;
        }
        seen = next;
    }
    seen
}

/// Returns the slice of `s` covered by `range`, if the range is valid for `s`.
pub fn slice_utf16(s: &str, range: TextRange) -> Option<&str> {
    if range.start > range.end {
        return None;
    }
    let a = byte_index(s, range.start)?;
    let b = byte_index(s, range.end)?;
    Some(&s[a..b])
}

/// Replaces exactly `range` of `s` with `replacement`, keeping prefix and suffix.
///
/// Returns the new text and the caret offset right after the inserted text
/// (`range.start + utf16_len(replacement)`), or `None` if `range` does not fit `s`.
pub fn replace_utf16_range(
    s: &str,
    replacement: &str,
    range: TextRange,
) -> Option<(String, usize)> {
    if range.start > range.end {
        return None;
    }
    let a = byte_index(s, range.start)?;
    let b = byte_index(s, range.end)?;

    let mut out = String::with_capacity(s.len() - (b - a) + replacement.len());
    out.push_str(&s[..a]);
    out.push_str(replacement);
    out.push_str(&s[b..]);

    Some((out, range.start + utf16_len(replacement)))
}
