//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::server::{run_server, ServerConfig, ServerState};
use crate::types::{Difficulty, Level};

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub command: ClientCommand,
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Select(usize),
    LoadLevel { level: Level, difficulty: Difficulty },
    Restart,
    Snapshot,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    Broadcast { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `TILE_MEMORY_ADAPTER_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            println!("[Adapter] Remote control disabled via TILE_MEMORY_ADAPTER_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                eprintln!("[Adapter] Server stopped: {:#}", e);
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
