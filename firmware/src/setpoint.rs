// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Potentiometer setpoint.
//!
//! The knob on PA6 is averaged over a burst of conversions and mapped linearly onto
//! `0..=MAX_TARGET_RPM`. The result goes into an [`AtomicSetpoint`] that the tachometer interrupt
//! reads at every tick.

use fanctl::AtomicSetpoint;

use crate::hw::Adc;

/// Target speed at full-scale knob.
pub const MAX_TARGET_RPM: u32 = 4500;
/// Full-scale 12-bit conversion.
pub const ADC_FULL_SCALE: u32 = 4095;
/// Conversions averaged per refresh.
pub const SAMPLES: u32 = 100;
/// ADC1 input wired to the potentiometer.
pub const POT_CHANNEL: u8 = 6;

pub struct PotSetpoint {
    adc: Adc,
    channel: u8,
    target: &'static AtomicSetpoint,
}

impl PotSetpoint {
    pub fn new(adc: Adc, channel: u8, target: &'static AtomicSetpoint) -> Self {
        Self {
            adc,
            channel,
            target,
        }
    }

    /// Sample the knob and publish the new target. Returns the target in RPM.
    pub fn refresh(&mut self) -> u32 {
        let sum: u32 = (0..SAMPLES)
            .map(|_| self.adc.read(self.channel) as u32)
            .sum();
        let rpm = scale(sum / SAMPLES);
        self.target.set(rpm);
        rpm
    }
}

/// Averaged ADC reading to RPM.
#[inline]
pub fn scale(raw: u32) -> u32 {
    raw.min(ADC_FULL_SCALE) * MAX_TARGET_RPM / ADC_FULL_SCALE
}
