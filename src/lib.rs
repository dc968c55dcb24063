//! Tile memory (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so the binary, tests and
//! benches can write `tile_memory::{core, adapter, term, input, types}`.

pub use tile_memory_adapter as adapter;
pub use tile_memory_core as core;
pub use tile_memory_input as input;
pub use tile_memory_term as term;
pub use tile_memory_types as types;
