//! Editable-surface adapter.
//!
//! `dom` models the slice of a document the adapter needs (elements, focus,
//! mutation records); `editable` classifies elements and reads/writes their
//! text, selection and direction.

pub mod dom;
pub mod editable;

pub use dom::{Document, DomEvent, MutationRecord, Node, WeakNode};
pub use editable::{
    ContentEditable, EditableSurface, PlainField, SurfaceKind, TextSurface, is_editable,
};
