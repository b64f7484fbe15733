//! Pure text algorithms shared by the layout-fixer session controller.
//!
//! Nothing in this crate touches an element tree or a service: offsets are
//! UTF-16 code units over plain `&str` values and every function is total.

pub mod text;
