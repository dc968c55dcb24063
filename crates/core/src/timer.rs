//! Countdown timer for one level attempt
//!
//! The timer never reads a clock. Hosts feed it elapsed time, either as a delta
//! per frame ([`CountdownTimer::advance`]) or as the absolute time since start
//! ([`CountdownTimer::tick`]). Remaining time is whole seconds, rounded up.

/// Result of feeding time into the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerReading {
    pub remaining: u32,
    /// True exactly once per run: on the reading that first hit zero.
    pub expired: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountdownTimer {
    initial_ms: u64,
    elapsed_ms: u64,
    running: bool,
    expired: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh run, discarding any previous one.
    pub fn start(&mut self, initial_seconds: u32) {
        self.initial_ms = u64::from(initial_seconds) * 1000;
        self.elapsed_ms = 0;
        self.running = true;
        self.expired = false;
    }

    /// Freeze the timer. Elapsed time stays readable until the next `start`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn initial_seconds(&self) -> u32 {
        (self.initial_ms / 1000) as u32
    }

    /// `ceil(initial - elapsed)` in seconds, clamped at 0.
    pub fn remaining(&self) -> u32 {
        let left = self.initial_ms.saturating_sub(self.elapsed_ms);
        left.div_ceil(1000) as u32
    }

    /// Set the absolute time since start. Time never runs backwards: an older
    /// reading leaves the elapsed time unchanged.
    pub fn tick(&mut self, elapsed_since_start_ms: u64) -> TimerReading {
        if self.running && elapsed_since_start_ms > self.elapsed_ms {
            self.elapsed_ms = elapsed_since_start_ms;
        }
        self.reading()
    }

    /// Add `delta_ms` of elapsed time.
    pub fn advance(&mut self, delta_ms: u64) -> TimerReading {
        let target = self.elapsed_ms.saturating_add(delta_ms);
        self.tick(target)
    }

    fn reading(&mut self) -> TimerReading {
        let remaining = self.remaining();
        let expired = self.running && !self.expired && remaining == 0;
        if expired {
            self.expired = true;
            self.running = false;
        }
        TimerReading { remaining, expired }
    }
}
