// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Stall detection for the tachometer input.
//!
//! Edges feed the watchdog; a periodic context polls it. If `timeout_polls` polls pass without a
//! single edge, the sensor is considered stalled (fan stopped, blocked or unplugged).

/// Counts polls since the last tachometer edge.
#[derive(Copy, Clone, Debug)]
pub struct StallWatchdog {
    timeout_polls: u32,
    polls_since_edge: u32,
    tripped: bool,
}

impl StallWatchdog {
    /// `timeout_polls == 0` disables the watchdog.
    pub const fn new(timeout_polls: u32) -> Self {
        Self {
            timeout_polls,
            polls_since_edge: 0,
            tripped: false,
        }
    }

    /// Record an edge. Clears a trip.
    ///
    /// Returns `true` if the watchdog was tripped before this edge.
    pub fn feed(&mut self) -> bool {
        let was_tripped = self.tripped;
        self.polls_since_edge = 0;
        self.tripped = false;
        was_tripped
    }

    /// Advance by one poll period.
    ///
    /// Returns `true` only on the poll that trips the watchdog; later polls return `false` until
    /// an edge re-arms it.
    pub fn poll(&mut self) -> bool {
        if self.timeout_polls == 0 || self.tripped {
            return false;
        }

        self.polls_since_edge = self.polls_since_edge.saturating_add(1);
        if self.polls_since_edge >= self.timeout_polls {
            self.tripped = true;
            return true;
        }
        false
    }

    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.timeout_polls != 0
    }
}
