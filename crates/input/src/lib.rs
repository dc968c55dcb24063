//! Terminal input module.
//!
//! Independent of any UI framework. Maps `crossterm` key events into
//! [`UiAction`]s and tracks the highlighted tile with a [`GridCursor`].

pub mod cursor;
pub mod map;

pub use tile_memory_types as types;

pub use cursor::{Direction, GridCursor};
pub use map::{handle_key_event, should_quit, UiAction};
