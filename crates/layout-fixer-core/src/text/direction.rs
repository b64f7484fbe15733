// File: crates/layout-fixer-core/src/text/direction.rs

/// Number of leading characters examined when deciding whether a result is RTL-led.
pub const RTL_PREFIX_LEN: usize = 5;

/// Visual text direction of an editable surface.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }

    /// Text alignment that goes with this direction on plain fields.
    pub const fn text_align(self) -> &'static str {
        match self {
            Direction::Ltr => "left",
            Direction::Rtl => "right",
        }
    }
}

/// Where the caret lands after a whole-field replacement.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaretPlacement {
    Start,
    End,
}

const fn is_hebrew(ch: char) -> bool {
    matches!(ch, '\u{0590}'..='\u{05FF}')
}

const fn is_arabic(ch: char) -> bool {
    matches!(ch, '\u{0600}'..='\u{06FF}')
}

/// Hebrew or Arabic block code point.
pub const fn is_rtl_char(ch: char) -> bool {
    is_hebrew(ch) || is_arabic(ch)
}

/// `true` when a strict majority of the first [`RTL_PREFIX_LEN`] characters are Hebrew.
///
/// Only the Hebrew block counts here; Arabic is considered by the trailing check alone.
pub fn is_rtl_led(text: &str) -> bool {
    let (total, hebrew) = text
        .chars()
        .take(RTL_PREFIX_LEN)
        .fold((0usize, 0usize), |(total, hebrew), ch| {
            (total + 1, hebrew + usize::from(is_hebrew(ch)))
        });

    hebrew * 2 > total
}

/// `true` when the last non-whitespace character is Hebrew or Arabic.
pub fn trailing_char_is_rtl(text: &str) -> bool {
    text.chars()
        .rev()
        .find(|ch| !ch.is_whitespace())
        .is_some_and(is_rtl_char)
}

/// The two independent RTL signals of a transformation result.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DirectionVerdict {
    pub rtl_led: bool,
    pub trailing_rtl: bool,
}

impl DirectionVerdict {
    pub fn analyze(text: &str) -> Self {
        Self {
            rtl_led: is_rtl_led(text),
            trailing_rtl: trailing_char_is_rtl(text),
        }
    }

    /// RTL if either signal is RTL.
    pub const fn direction(self) -> Direction {
        if self.rtl_led || self.trailing_rtl {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    /// End if the prefix is RTL-led or the trailing character is not RTL, otherwise start.
    ///
    /// Start is therefore reachable only for a non RTL-led result whose last
    /// non-whitespace character is RTL; such a result is still labelled RTL.
    pub const fn caret(self) -> CaretPlacement {
        if self.rtl_led || !self.trailing_rtl {
            CaretPlacement::End
        } else {
            CaretPlacement::Start
        }
    }
}
