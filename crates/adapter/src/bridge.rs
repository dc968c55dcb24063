//! Applies adapter commands to a [`GameSession`] and turns the resulting
//! session events into outbound wire lines.
//!
//! Runs on the game-loop thread; the server never touches the session.

use serde::Serialize;

use crate::core::GameSession;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, OutboundMessage};
use crate::types::{GameEvent, PairKey, SelectResult};

/// Outbound sequence counter plus the command/event translation.
#[derive(Debug, Default)]
pub struct SessionBridge {
    seq: u64,
}

impl SessionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Apply one inbound command and return the direct replies.
    ///
    /// Events raised by the command are not included; collect them with
    /// [`drain`](Self::drain) afterwards.
    pub fn handle(
        &mut self,
        session: &mut GameSession,
        inbound: &InboundCommand,
    ) -> Vec<OutboundMessage> {
        let client_id = inbound.client_id;
        let reply = |line: Option<String>| {
            line.map(|line| OutboundMessage::ToClient { client_id, line })
        };

        let out = match inbound.command {
            ClientCommand::Select(index) => match session.select(index) {
                SelectResult::Rejected(reason) => reply(to_line(&create_ack(
                    inbound.seq,
                    AckStatus::Ignored,
                    Some(reason.as_str()),
                ))),
                _ => reply(to_line(&create_ack(inbound.seq, AckStatus::Ok, None))),
            },
            ClientCommand::LoadLevel { level, difficulty } => {
                match session.load_level(level, difficulty) {
                    Ok(()) => reply(to_line(&create_ack(inbound.seq, AckStatus::Ok, None))),
                    Err(e) => reply(to_line(&create_error(
                        inbound.seq,
                        ErrorCode::LoadFailed,
                        &e.to_string(),
                    ))),
                }
            }
            ClientCommand::Restart => match session.restart() {
                Ok(()) => reply(to_line(&create_ack(inbound.seq, AckStatus::Ok, None))),
                Err(e) => reply(to_line(&create_error(
                    inbound.seq,
                    ErrorCode::LoadFailed,
                    &e.to_string(),
                ))),
            },
            ClientCommand::Snapshot => {
                let seq = self.next_seq();
                reply(to_line(&observe(session, seq)))
            }
        };

        out.into_iter().collect()
    }

    /// Take pending session events and render them as broadcasts.
    ///
    /// A fresh observation follows any batch of events so streaming clients
    /// never have to replay state themselves.
    pub fn drain(&mut self, session: &mut GameSession) -> Vec<OutboundMessage> {
        let events = session.take_events();
        if events.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(events.len() + 1);
        for event in &events {
            let seq = self.next_seq();
            let line = match event {
                GameEvent::ResultRecorded(report) => to_line(&create_result(seq, report)),
                other => wire_event(other).and_then(|ev| to_line(&create_event(seq, ev))),
            };
            if let Some(line) = line {
                out.push(OutboundMessage::Broadcast { line });
            }
        }

        let seq = self.next_seq();
        if let Some(line) = to_line(&observe(session, seq)) {
            out.push(OutboundMessage::Broadcast { line });
        }
        out
    }
}

fn observe(session: &GameSession, seq: u64) -> ObservationMessage {
    let pool = session.pool();
    build_observation(&session.snapshot(), seq, |k| pool.name_of(PairKey(k)))
}

fn to_line<T: Serialize>(msg: &T) -> Option<String> {
    serde_json::to_string(msg).ok()
}
