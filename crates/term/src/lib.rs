//! Terminal front-end rendering.
//!
//! A small game-oriented rendering layer: [`GameView`] paints a session
//! snapshot into a [`FrameBuffer`], and [`TerminalRenderer`] flushes the
//! framebuffer to the terminal, rewriting only cells that changed.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tile_memory_core as core;
pub use tile_memory_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
