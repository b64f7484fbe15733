//! Conversion session: the state machine that ties key events, the
//! editable-surface adapter and the converter service together.
//!
//! `controller` is synchronous and owns all state; `driver` runs it on a
//! single-threaded executor and feeds service completions back in.

pub mod controller;
pub mod driver;
pub mod span;
pub mod undo;

pub use controller::{ControllerSettings, ConversionController, Dispatch, KeyResponse, SessionState};
pub use driver::{KeyHandling, Session};
pub use span::{ConversionSpan, PendingRequest, SpanOrigin};
pub use undo::UndoSlot;
