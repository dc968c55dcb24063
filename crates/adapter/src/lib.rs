//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! This module lets an external client (a bot, a test harness, a web bridge)
//! drive a tile memory session through a TCP socket connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Streaming**: Events and observations are broadcast as the game changes
//! 5. **Commanding**: Controller sends `select`, `loadLevel` or `restart`;
//!    anyone may ask for a `snapshot`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info
//! - **command**: One game action
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the assigned role
//! - **ack**: Command applied (`ok`) or valid but without effect (`ignored`)
//! - **error**: Error response with code and message
//! - **event**: One game event (`pair_matched`, `timer_tick`, `game_won`, ...)
//! - **observation**: Full session snapshot; hidden tiles carry no key
//! - **result**: Score record after a win, when result reporting is enabled
//!
//! # Environment Variables
//!
//! - `TILE_MEMORY_HOST`: Bind address (default: "127.0.0.1")
//! - `TILE_MEMORY_PORT`: Port number (default: 7878)
//! - `TILE_MEMORY_MAX_PENDING`: Command queue bound (default: 10)
//! - `TILE_MEMORY_LOG_PATH`: Append every wire line to this file
//! - `TILE_MEMORY_ADAPTER_DISABLED`: Set to "1" or "true" to disable the adapter
//! - `TILE_MEMORY_SCORE_PATH`: Best-score file (default: tile-memory-score.json)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","stream_observations":true}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller","game_id":"memory"}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"phase":"playing",...}
//! Client -> Server: {"type":"command","seq":2,"action":"select","index":4}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! Server -> Client: {"type":"event","seq":2,"ts":1234567892,"event":"timer_started","initial_seconds":60}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking on its own runtime
//! - The game loop stays synchronous; [`Adapter`] moves commands in and lines out
//! - [`SessionBridge`] applies commands to the session on the game-loop side
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0","stream_observations":true}
//! ```

pub mod bridge;
pub mod protocol;
pub mod runtime;
pub mod server;
pub mod store;

pub use tile_memory_core as core;
pub use tile_memory_types as types;

// Re-export protocol types for convenience
pub use bridge::SessionBridge;
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
pub use store::JsonScoreStore;
