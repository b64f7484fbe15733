pub mod key_event;
pub mod shortcuts;

pub use key_event::KeyEvent;
pub use shortcuts::{ShortcutAction, ShortcutBindings};
