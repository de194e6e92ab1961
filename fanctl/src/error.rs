// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types for the fan controller.
//!
//! None of these are fatal. A skipped tick or a stall is reported to the caller, which is expected
//! to log it and carry on.

/// Runtime errors returned by [`FanController`](crate::FanController).
///
/// `E` is the error type of the PWM channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A zero-tick interval was captured. No speed can be computed from it, so the tick was
    /// skipped and no state changed.
    DegenerateInterval,

    /// No tachometer edge arrived within the watchdog timeout.
    StalledSensor,

    /// The PWM channel rejected the duty write.
    Pwm(E),
}

/// Rejected [`ControllerConfig`](crate::ControllerConfig) values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Counter clock of 0 Hz.
    ZeroTickFrequency,

    /// A gain is negative, NaN or infinite.
    InvalidGain,

    /// `min_duty > max_duty`, or `max_duty` does not fit in the PWM period.
    InvalidDutyLimits,

    /// The fail-safe duty lies outside `[min_duty, max_duty]`.
    FailSafeOutOfRange,
}
