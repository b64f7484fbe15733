//! Retroactive keyboard-layout fixing for editable text surfaces.
//!
//! A [`session::Session`] watches a [`surface::Document`], binds its editable
//! surfaces and turns configured shortcuts into requests to a
//! [`service::ConverterService`]. Results are written back in place, with a
//! single-level undo.

pub mod config;
pub mod domain;
pub mod input;
pub mod notifier;
pub mod service;
pub mod session;
pub mod surface;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::{Config, PrimaryModifier, Shortcut, ShortcutSlot};
pub use domain::outcome::{ActionOutcome, RequestId, SkipReason};
pub use input::KeyEvent;
pub use service::{ConverterService, ServiceError, TransformKind};
pub use session::Session;
