//! TCP server for the remote control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from `TILE_MEMORY_*` environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("TILE_MEMORY_HOST").unwrap_or(defaults.host);
        let port = env::var("TILE_MEMORY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("TILE_MEMORY_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let log_path = env::var("TILE_MEMORY_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("TILE_MEMORY_ADAPTER_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the last one seen.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };

        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<String>,
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(line);
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                            let _ = c.tx.send(line.clone());
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, state, command_tx, wire_log_tx).await
            {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Append every wire line (both directions) to `path`.
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<String> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Adapter] Cannot open wire log {}: {}", path, e);
                return;
            }
        };

        while let Some(line) = rx.recv().await {
            if file.write_all(line.as_bytes()).await.is_err()
                || file.write_all(b"\n").await.is_err()
            {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

fn to_line<T: serde::Serialize>(msg: &T) -> Option<String> {
    serde_json::to_string(msg).ok()
}

fn send_error(tx: &mpsc::UnboundedSender<String>, seq: u64, code: ErrorCode, message: &str) {
    if let Some(line) = to_line(&create_error(seq, code, message)) {
        let _ = tx.send(line);
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<String>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_tx_out = wire_log_tx.clone();

    // Writer task: one JSON object per line.
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(log) = wire_log_tx_out.as_ref() {
                let _ = log.send(line);
            }
        }
    });

    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("[Adapter] Client {} read error: {}", client_id, e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(trimmed.to_string());
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::OutOfOrder,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                let major = state
                    .config
                    .protocol_version
                    .split('.')
                    .next()
                    .unwrap_or_default();
                if hello.protocol_version.split('.').next() != Some(major) {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                // First client to hello becomes controller.
                let role = {
                    let mut controller = state.controller.write().await;
                    match *controller {
                        None => {
                            *controller = Some(client_id);
                            println!("[Adapter] Client {} is now controller", client_id);
                            AssignedRole::Controller
                        }
                        Some(id) if id == client_id => AssignedRole::Controller,
                        Some(_) => AssignedRole::Observer,
                    }
                };

                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.stream_observations;
                    }
                }

                if let Some(line) = to_line(&create_welcome(hello.seq, client_id, role)) {
                    let _ = tx.send(line);
                }

                // Initial snapshot for the new client.
                let _ = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: hello.seq,
                    command: ClientCommand::Snapshot,
                });
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "Send hello before command",
                    );
                    continue;
                }

                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::OutOfOrder,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                if cmd.action.mutates() && !state.is_controller(client_id).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may change the game",
                    );
                    continue;
                }

                let command = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        send_error(&tx, cmd.seq, code, &message);
                        continue;
                    }
                };

                // Backpressure: bounded queue. The game loop acks once applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        command,
                    })
                    .is_err()
                {
                    send_error(&tx, cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown { msg_type, seq }) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, seq).await
                {
                    send_error(&tx, seq, ErrorCode::OutOfOrder, "seq must be strictly increasing");
                    continue;
                }
                send_error(
                    &tx,
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("Unknown message type: {}", msg_type),
                );
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(
                    &tx,
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
            }
        }
    }

    // Clean up: remove client and promote the next one if it held control.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
            *controller = next_id;
            match next_id {
                Some(new_id) => println!("[Adapter] Client {} promoted to controller", new_id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.action {
        CommandAction::Select => cmd.index.map(ClientCommand::Select).ok_or_else(|| {
            (
                ErrorCode::InvalidCommand,
                "select requires index".to_string(),
            )
        }),
        CommandAction::LoadLevel => parse_level_args(cmd)
            .map(|(level, difficulty)| ClientCommand::LoadLevel { level, difficulty })
            .map_err(|msg| (ErrorCode::InvalidLevel, msg)),
        CommandAction::Restart => Ok(ClientCommand::Restart),
        CommandAction::Snapshot => Ok(ClientCommand::Snapshot),
    }
}
