// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Best-effort status snapshot for display and telemetry.
//!
//! The controller publishes its latest values here at the end of every tick. A lower-priority
//! reader (display loop, logger) calls [`StatusCell::snapshot`] whenever it likes, without locking.
//!
//! Every field is its own atomic word, so a field is never half-written. Fields are not updated
//! together, though: a snapshot may mix values from two consecutive ticks.

use core::sync::atomic::{AtomicU32, Ordering};

const FAULT_STALLED: u32 = 1 << 0;

/// Values published by the controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Target speed sampled in the last tick (RPM).
    pub target_speed: u32,
    /// Measured speed from the last tick (RPM).
    pub measured_speed: u32,
    /// Last captured half-period (counter ticks).
    pub interval: u32,
    /// Last duty written to the PWM channel.
    pub duty: u32,
    /// Fault bit field.
    pub faults: u32,
}

impl Status {
    /// The tachometer went quiet for longer than the stall timeout.
    #[inline]
    pub fn stalled(&self) -> bool {
        self.faults & FAULT_STALLED != 0
    }
}

/// Shared, lock-free home for [`Status`]. Usually a `static`.
pub struct StatusCell {
    target_speed: AtomicU32,
    measured_speed: AtomicU32,
    interval: AtomicU32,
    duty: AtomicU32,
    faults: AtomicU32,
}

impl StatusCell {
    pub const fn new() -> Self {
        Self {
            target_speed: AtomicU32::new(0),
            measured_speed: AtomicU32::new(0),
            interval: AtomicU32::new(0),
            duty: AtomicU32::new(0),
            faults: AtomicU32::new(0),
        }
    }

    /// Read every field independently.
    pub fn snapshot(&self) -> Status {
        Status {
            target_speed: self.target_speed.load(Ordering::Relaxed),
            measured_speed: self.measured_speed.load(Ordering::Relaxed),
            interval: self.interval.load(Ordering::Relaxed),
            duty: self.duty.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn target_speed(&self) -> u32 {
        self.target_speed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn measured_speed(&self) -> u32 {
        self.measured_speed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        self.interval.load(Ordering::Relaxed)
    }

    pub(crate) fn publish_tick(&self, target: u32, measured: u32, interval: u32, duty: u16) {
        self.target_speed.store(target, Ordering::Relaxed);
        self.measured_speed.store(measured, Ordering::Relaxed);
        self.interval.store(interval, Ordering::Relaxed);
        self.duty.store(duty as u32, Ordering::Relaxed);
    }

    pub(crate) fn publish_measured(&self, measured: u32) {
        self.measured_speed.store(measured, Ordering::Relaxed);
    }

    pub(crate) fn publish_duty(&self, duty: u16) {
        self.duty.store(duty as u32, Ordering::Relaxed);
    }

    pub(crate) fn set_stalled(&self, stalled: bool) {
        // Only the controller writes faults, so load + store is enough. No RMW atomics on
        // thumbv6m.
        let faults = self.faults.load(Ordering::Relaxed);
        let faults = if stalled {
            faults | FAULT_STALLED
        } else {
            faults & !FAULT_STALLED
        };
        self.faults.store(faults, Ordering::Relaxed);
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}
