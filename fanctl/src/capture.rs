// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Edge-interval capture.
//!
//! The fan's tachometer line produces two rising edges per revolution. Edges are taken in pairs:
//! the first starts a free-running counter, the second stops it and yields the elapsed ticks, i.e.
//! the length of one half-revolution.
//!
//! ```text
//! edge:      1        2        3        4
//! state:  Idle ─▶ Measuring ─▶ Idle ─▶ Measuring ─▶ Idle
//! output:          none    interval    none    interval
//! ```

/// Timer that counts at a fixed, known rate while running.
///
/// On the board this is TIM2 clocked at 10 kHz.
pub trait FreeRunningCounter {
    /// Start counting from the current value.
    fn start(&mut self);
    /// Freeze the counter.
    fn stop(&mut self);
    /// Current count in ticks.
    fn read(&self) -> u32;
    /// Set the count back to zero.
    fn reset(&mut self);
}

/// Capture state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureState {
    /// No window open. The next edge starts the counter.
    Idle,
    /// Counter running. The next edge closes the window.
    Measuring,
}

/// Turns a stream of edges into half-period intervals.
pub struct EdgeCapture<C> {
    counter: C,
    state: CaptureState,
}

impl<C: FreeRunningCounter> EdgeCapture<C> {
    /// Wrap a counter. The counter is stopped and zeroed so the first window starts clean.
    pub fn new(mut counter: C) -> Self {
        counter.stop();
        counter.reset();
        Self {
            counter,
            state: CaptureState::Idle,
        }
    }

    /// Handle one rising edge.
    ///
    /// Returns `Some(ticks)` on every second edge, `None` otherwise.
    pub fn on_edge(&mut self) -> Option<u32> {
        match self.state {
            CaptureState::Idle => {
                self.counter.start();
                self.state = CaptureState::Measuring;
                None
            }

            CaptureState::Measuring => {
                self.counter.stop();
                let interval = self.counter.read();
                self.counter.reset();
                self.state = CaptureState::Idle;
                Some(interval)
            }
        }
    }

    /// Throw away an open window and go back to `Idle`.
    pub fn abort(&mut self) {
        self.counter.stop();
        self.counter.reset();
        self.state = CaptureState::Idle;
    }

    #[inline]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    #[inline]
    pub fn counter(&self) -> &C {
        &self.counter
    }

    #[inline]
    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }

    pub fn free(self) -> C {
        self.counter
    }
}
