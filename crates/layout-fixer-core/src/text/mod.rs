pub mod direction;
pub mod offsets;

pub use direction::{CaretPlacement, Direction, DirectionVerdict};
pub use offsets::{
    TextRange, byte_index, floor_boundary, replace_utf16_range, slice_utf16, utf16_len,
};
