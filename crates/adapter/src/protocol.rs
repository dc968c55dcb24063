//! Protocol module - JSON message types for the remote control adapter
//!
//! Line-delimited JSON. Every message has: type, seq (sequence number),
//! ts (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{GameSnapshot, TileSnapshot};
use crate::types::{Difficulty, GameEvent, Level, ScoreReport, TileState};

pub const PROTOCOL_VERSION: &str = "1.0.0";

pub const GAME_ID: &str = "memory";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    Command,
}

impl Default for CommandType {
    fn default() -> Self {
        Self::Command
    }
}

/// Only the fields needed to route a line.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub seq: u64,
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    Select,
    LoadLevel,
    Restart,
    Snapshot,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::Select => "select",
            CommandAction::LoadLevel => "loadLevel",
            CommandAction::Restart => "restart",
            CommandAction::Snapshot => "snapshot",
        }
    }

    /// Whether the action changes session state (controller only).
    pub fn mutates(&self) -> bool {
        !matches!(self, CommandAction::Snapshot)
    }
}

impl<'de> Deserialize<'de> for CommandAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("select") {
            Ok(Self::Select)
        } else if s.eq_ignore_ascii_case("loadLevel") || s.eq_ignore_ascii_case("load_level") {
            Ok(Self::LoadLevel)
        } else if s.eq_ignore_ascii_case("restart") {
            Ok(Self::Restart)
        } else if s.eq_ignore_ascii_case("snapshot") {
            Ok(Self::Snapshot)
        } else {
            Err(serde::de::Error::custom("unknown action"))
        }
    }
}

impl Serialize for CommandAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Command message
///
/// `index` is required for `select`; `level` and `difficulty` for `loadLevel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: CommandAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
    /// Command was valid but had no effect (e.g. selecting a matched tile).
    #[serde(rename = "ignored")]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_level")]
    InvalidLevel,
    #[serde(rename = "out_of_order")]
    OutOfOrder,
    #[serde(rename = "load_failed")]
    LoadFailed,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: usize,
    pub role: AssignedRole,
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Tile as seen by a client. The key is withheld while the tile is hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileObservation {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: String,
    pub state: String,
}

/// Full session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub phase: String,
    pub level: u8,
    pub difficulty: String,
    pub epoch: u32,
    pub moves_made: u32,
    pub matches_found: usize,
    pub matches_to_win: usize,
    pub time_remaining: u32,
    pub timer_running: bool,
    pub continue_to_play: bool,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<u32>,
    pub tiles: Vec<TileObservation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

/// Game event payload, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    LevelLoaded {
        level: u8,
        difficulty: String,
        epoch: u32,
    },
    TimerStarted {
        initial_seconds: u32,
    },
    TileSelected {
        index: usize,
    },
    PairMatched {
        first: usize,
        second: usize,
    },
    PairMismatched {
        first: usize,
        second: usize,
    },
    TilesHidden {
        indices: Vec<usize>,
    },
    TimerTick {
        remaining: u32,
    },
    GameWon {
        score: u32,
        best_score: u32,
    },
    GameLost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    #[serde(flatten)]
    pub event: WireEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultType {
    #[serde(rename = "result")]
    Result,
}

/// Score record for an external submission service.
///
/// Field layout matches the scoring backend: 1-based level as a string,
/// difficulty by name, elapsed time in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMessage {
    #[serde(rename = "type")]
    pub msg_type: ResultType,
    pub seq: u64,
    pub ts: u64,
    pub score: u32,
    pub level: String,
    pub difficulty: String,
    pub time: f64,
}

// ============== Parsing ==============

/// A routed client line.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    /// Well-formed JSON with an unrecognised `type`.
    Unknown { msg_type: String, seq: u64 },
}

/// Parse one line: read the envelope first, then the typed body.
pub fn parse_message(line: &str) -> Result<ParsedMessage, serde_json::Error> {
    let envelope: Envelope = serde_json::from_str(line)?;
    match envelope.msg_type.as_str() {
        "hello" => Ok(ParsedMessage::Hello(serde_json::from_str(line)?)),
        "command" => Ok(ParsedMessage::Command(serde_json::from_str(line)?)),
        _ => Ok(ParsedMessage::Unknown {
            msg_type: envelope.msg_type,
            seq: envelope.seq,
        }),
    }
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Builders ==============

/// Create a hello message (used by clients and tests)
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        stream_observations: true,
    }
}

pub fn create_welcome(seq: u64, client_id: usize, role: AssignedRole) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        game_id: GAME_ID.to_string(),
    }
}

/// Create an acknowledgment message
pub fn create_ack(seq: u64, status: AckStatus, detail: Option<&str>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status,
        detail: detail.map(str::to_string),
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a session snapshot.
///
/// `name_of` resolves a pair key to its display name for revealed tiles.
pub fn build_observation<'a>(
    snapshot: &GameSnapshot,
    seq: u64,
    name_of: impl Fn(u32) -> Option<&'a str>,
) -> ObservationMessage {
    let s = &snapshot.status;
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        phase: s.phase.as_str().to_string(),
        level: s.level.index(),
        difficulty: s.difficulty.as_str().to_string(),
        epoch: s.epoch,
        moves_made: s.moves_made,
        matches_found: s.matches_found,
        matches_to_win: s.matches_to_win,
        time_remaining: s.time_remaining,
        timer_running: s.timer_running,
        continue_to_play: s.continue_to_play,
        score: s.score,
        best_score: s.best_score,
        tiles: snapshot
            .tiles
            .iter()
            .map(|t| tile_observation(t, &name_of))
            .collect(),
    }
}

fn tile_observation<'a>(
    tile: &TileSnapshot,
    name_of: &impl Fn(u32) -> Option<&'a str>,
) -> TileObservation {
    let revealed = tile.state != TileState::Hidden;
    TileObservation {
        index: tile.index,
        key: revealed.then_some(tile.key.0),
        name: if revealed {
            name_of(tile.key.0).map(str::to_string)
        } else {
            None
        },
        role: tile.role.as_str().to_string(),
        state: tile.state.as_str().to_string(),
    }
}

/// Map a core event to its wire form. Score reports travel as [`ResultMessage`]
/// instead and return `None` here.
pub fn wire_event(event: &GameEvent) -> Option<WireEvent> {
    let ev = match event {
        GameEvent::LevelLoaded {
            level,
            difficulty,
            epoch,
        } => WireEvent::LevelLoaded {
            level: level.index(),
            difficulty: difficulty.as_str().to_string(),
            epoch: *epoch,
        },
        GameEvent::TimerStarted { initial_seconds } => WireEvent::TimerStarted {
            initial_seconds: *initial_seconds,
        },
        GameEvent::TileSelected { index } => WireEvent::TileSelected { index: *index },
        GameEvent::PairMatched { first, second } => WireEvent::PairMatched {
            first: *first,
            second: *second,
        },
        GameEvent::PairMismatched { first, second } => WireEvent::PairMismatched {
            first: *first,
            second: *second,
        },
        GameEvent::TilesHidden { indices } => WireEvent::TilesHidden {
            indices: indices.clone(),
        },
        GameEvent::TimerTick { remaining } => WireEvent::TimerTick {
            remaining: *remaining,
        },
        GameEvent::GameWon { score, best_score } => WireEvent::GameWon {
            score: *score,
            best_score: *best_score,
        },
        GameEvent::GameLost => WireEvent::GameLost,
        GameEvent::ResultRecorded(_) => return None,
    };
    Some(ev)
}

pub fn create_event(seq: u64, event: WireEvent) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event,
    }
}

pub fn create_result(seq: u64, report: &ScoreReport) -> ResultMessage {
    ResultMessage {
        msg_type: ResultType::Result,
        seq,
        ts: current_timestamp_ms(),
        score: report.score,
        level: report.level.display_number().to_string(),
        difficulty: report.difficulty.as_str().to_string(),
        time: report.elapsed_seconds,
    }
}

/// Resolve the level/difficulty pair of a `loadLevel` command.
pub fn parse_level_args(cmd: &CommandMessage) -> Result<(Level, Difficulty), String> {
    let level = cmd
        .level
        .ok_or_else(|| "loadLevel requires level".to_string())?;
    let level = Level::from_index(level).ok_or_else(|| format!("invalid level: {}", level))?;
    let difficulty = match cmd.difficulty.as_deref() {
        Some(d) => Difficulty::parse(d).map_err(|e| e.to_string())?,
        None => Difficulty::default(),
    };
    Ok((level, difficulty))
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameSession, MemoryScoreStore, SessionConfig};
    use crate::types::PairKey;

    #[test]
    fn command_message_parses_select() {
        let line = r#"{"type":"command","seq":3,"ts":1,"action":"select","index":5}"#;
        let cmd: CommandMessage = serde_json::from_str(line).unwrap();
        assert_eq!(cmd.seq, 3);
        assert_eq!(cmd.action, CommandAction::Select);
        assert_eq!(cmd.index, Some(5));
    }

    #[test]
    fn command_action_is_case_insensitive() {
        let line = r#"{"type":"command","seq":1,"action":"LOAD_LEVEL","level":2,"difficulty":"advanced"}"#;
        let cmd: CommandMessage = serde_json::from_str(line).unwrap();
        assert_eq!(cmd.action, CommandAction::LoadLevel);
        assert_eq!(
            parse_level_args(&cmd),
            Ok((Level::Three, Difficulty::Advanced))
        );
    }

    #[test]
    fn parse_message_routes_by_type() {
        let hello = r#"{"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}"#;
        assert!(matches!(parse_message(hello), Ok(ParsedMessage::Hello(h)) if h.seq == 1));

        let other = r#"{"type":"control","seq":9,"action":"claim"}"#;
        match parse_message(other) {
            Ok(ParsedMessage::Unknown { msg_type, seq }) => {
                assert_eq!(msg_type, "control");
                assert_eq!(seq, 9);
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert!(parse_message("not json").is_err());
        // Known type, bad body.
        assert!(parse_message(r#"{"type":"command","seq":2}"#).is_err());
    }

    #[test]
    fn seq_is_recovered_from_broken_lines() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type": oops"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"type":"x"}"#), None);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let line = r#"{"type":"command","seq":1,"action":"flipAll"}"#;
        assert!(serde_json::from_str::<CommandMessage>(line).is_err());
    }

    #[test]
    fn level_args_are_validated() {
        let mut cmd: CommandMessage =
            serde_json::from_str(r#"{"type":"command","seq":1,"action":"loadLevel","level":4}"#)
                .unwrap();
        assert!(parse_level_args(&cmd).is_err());
        cmd.level = Some(1);
        cmd.difficulty = Some("expert".to_string());
        assert!(parse_level_args(&cmd).is_err());
        cmd.difficulty = None;
        assert_eq!(
            parse_level_args(&cmd),
            Ok((Level::Two, Difficulty::Beginner))
        );
    }

    #[test]
    fn observation_hides_keys_of_hidden_tiles() {
        let mut session =
            GameSession::new(SessionConfig::default(), Box::new(MemoryScoreStore::new()));
        session
            .load_level(Level::One, Difficulty::Beginner)
            .unwrap();
        session.select(0);

        let snapshot = session.snapshot();
        let pool = session.pool();
        let obs = build_observation(&snapshot, 7, |k| pool.name_of(PairKey(k)));
        assert_eq!(obs.tiles.len(), 12);
        assert_eq!(obs.tiles[0].state, "selected");
        assert!(obs.tiles[0].key.is_some());
        assert!(obs.tiles[0].name.is_some());
        assert!(obs.tiles[1..].iter().all(|t| t.key.is_none() && t.name.is_none()));

        let v: serde_json::Value = serde_json::to_value(&obs).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["phase"], "playing");
        assert_eq!(v["time_remaining"], 60);
        assert!(v["tiles"][1].get("key").is_none());
    }

    #[test]
    fn event_message_is_flat() {
        let msg = create_event(4, WireEvent::PairMatched { first: 1, second: 8 });
        let v: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "event");
        assert_eq!(v["event"], "pair_matched");
        assert_eq!(v["first"], 1);
        assert_eq!(v["second"], 8);

        let lost = serde_json::to_value(create_event(5, WireEvent::GameLost)).unwrap();
        assert_eq!(lost["event"], "game_lost");
    }

    #[test]
    fn result_message_uses_backend_layout() {
        let report = ScoreReport {
            score: 2898,
            level: Level::One,
            difficulty: Difficulty::Intermediate,
            elapsed_seconds: 18.0,
        };
        let v = serde_json::to_value(create_result(9, &report)).unwrap();
        assert_eq!(v["type"], "result");
        assert_eq!(v["score"], 2898);
        assert_eq!(v["level"], "1");
        assert_eq!(v["difficulty"], "intermediate");
        assert_eq!(v["time"], 18.0);
    }

    #[test]
    fn score_reports_are_not_wire_events() {
        let report = ScoreReport {
            score: 1,
            level: Level::Two,
            difficulty: Difficulty::Beginner,
            elapsed_seconds: 1.5,
        };
        assert!(wire_event(&GameEvent::ResultRecorded(report)).is_none());
        assert_eq!(
            wire_event(&GameEvent::TimerTick { remaining: 3 }),
            Some(WireEvent::TimerTick { remaining: 3 })
        );
    }
}
