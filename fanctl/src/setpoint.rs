// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Target speed sources.
//!
//! The controller samples its setpoint exactly once per regulation tick and does no smoothing of
//! its own. Filtering a noisy potentiometer is the source's job.

use core::sync::atomic::{AtomicU32, Ordering};

/// Anything that can report a target speed (RPM).
pub trait SetpointSource {
    fn target(&mut self) -> u32;
}

impl<F> SetpointSource for F
where
    F: FnMut() -> u32,
{
    #[inline]
    fn target(&mut self) -> u32 {
        (self)()
    }
}

/// Target speed shared between a foreground writer and the interrupt-context tick.
///
/// A single word, so readers never see a half-written value.
pub struct AtomicSetpoint {
    rpm: AtomicU32,
}

impl AtomicSetpoint {
    pub const fn new(rpm: u32) -> Self {
        Self {
            rpm: AtomicU32::new(rpm),
        }
    }

    #[inline]
    pub fn set(&self, rpm: u32) {
        self.rpm.store(rpm, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.rpm.load(Ordering::Relaxed)
    }
}

impl SetpointSource for &AtomicSetpoint {
    #[inline]
    fn target(&mut self) -> u32 {
        self.get()
    }
}
