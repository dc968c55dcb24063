//! Scheduled events - deferred work tied to a session epoch
//!
//! Delays in the game (mismatch settle, countdown expiry) are not callbacks.
//! They are values a host can inspect and fire later, from a frame loop, a
//! real timer or a test. Every event carries the epoch it was issued under;
//! once the session loads a new level the old epoch is dead and its events are
//! discarded on arrival.

/// What a scheduled event does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduledKind {
    /// Flip a mismatched pair back to hidden.
    MismatchSettle { first: usize, second: usize },
    /// The countdown for this attempt has run out.
    TimerExpire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledEvent {
    pub epoch: u32,
    /// Unique per scheduler; distinguishes two events of the same kind.
    pub id: u32,
    /// Session clock time (ms) at which the event is due.
    pub due_at_ms: u64,
    pub kind: ScheduledKind,
}

/// Outcome of delivering a scheduled event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Applied,
    /// Issued under an older epoch, already fired, or cancelled.
    Stale,
}

/// Pending events for the current epoch.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<ScheduledEvent>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, epoch: u32, due_at_ms: u64, kind: ScheduledKind) -> ScheduledEvent {
        self.next_id = self.next_id.wrapping_add(1);
        let event = ScheduledEvent {
            epoch,
            id: self.next_id,
            due_at_ms,
            kind,
        };
        self.pending.push(event);
        event
    }

    pub fn pending(&self) -> &[ScheduledEvent] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove `event` if it is still pending. Returns false for anything stale.
    pub fn take(&mut self, event: &ScheduledEvent) -> bool {
        match self.pending.iter().position(|e| e == event) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove and return every event due at or before `now_ms`, earliest first.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<ScheduledEvent> {
        let mut due: Vec<ScheduledEvent> = Vec::new();
        self.pending.retain(|e| {
            if e.due_at_ms <= now_ms {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.due_at_ms, e.id));
        due
    }

    pub fn cancel_where(&mut self, mut f: impl FnMut(&ScheduledKind) -> bool) {
        self.pending.retain(|e| !f(&e.kind));
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
