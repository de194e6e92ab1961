// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Controller configuration.
//!
//! A [`ControllerConfig`] is built once, validated, and handed to
//! [`FanController::new`](crate::FanController::new). The controller never changes it afterwards.
//!
//! ```
//! use fanctl::{ControllerConfig, StallPolicy};
//!
//! let cfg = ControllerConfig::default()
//!     .with_gains(0.5, 1.0)
//!     .with_stall_timeout(50)
//!     .with_stall_policy(StallPolicy::FailSafe)
//!     .validate()
//!     .unwrap();
//! assert_eq!(cfg.max_duty, 199);
//! ```

use crate::actuator::DUTY_STEPS;
use crate::error::ConfigError;

/// Counter clock used for interval capture (Hz).
pub const DEFAULT_TICK_FREQUENCY: u32 = 10_000;

/// Proportional gain tuned for the lab fan.
pub const DEFAULT_KP: f32 = 0.98;

/// Integral gain tuned for the lab fan.
pub const DEFAULT_KI: f32 = 2.1;

/// Lowest duty the regulator will command. Below this the fan does not spin up reliably.
pub const DEFAULT_MIN_DUTY: u16 = 15;

/// Highest duty the regulator will command (one step short of the 200-step period).
pub const DEFAULT_MAX_DUTY: u16 = 199;

/// What to do when the tachometer stops producing edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StallPolicy {
    /// Raise the stall flag but leave the last duty and speed in place.
    HoldLast,

    /// Raise the stall flag, drive `fail_safe_duty`, drop the open capture window and clear the
    /// integral.
    FailSafe,
}

/// Gains, limits and stall handling for one fan.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Free-running counter clock (Hz).
    pub tick_frequency: u32,

    /// Proportional gain (duty steps per RPM of error).
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,

    /// Output saturation limits (PWM compare steps).
    pub min_duty: u16,
    pub max_duty: u16,

    /// Watchdog polls without an edge before the sensor counts as stalled. `0` disables it.
    pub stall_timeout_polls: u32,
    pub stall_policy: StallPolicy,
    /// Duty written by [`StallPolicy::FailSafe`].
    pub fail_safe_duty: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_frequency: DEFAULT_TICK_FREQUENCY,
            kp: DEFAULT_KP,
            ki: DEFAULT_KI,
            min_duty: DEFAULT_MIN_DUTY,
            max_duty: DEFAULT_MAX_DUTY,
            stall_timeout_polls: 0,
            stall_policy: StallPolicy::HoldLast,
            fail_safe_duty: DEFAULT_MIN_DUTY,
        }
    }
}

impl ControllerConfig {
    /// Set proportional and integral gains.
    pub fn with_gains(mut self, kp: f32, ki: f32) -> Self {
        self.kp = kp;
        self.ki = ki;
        self
    }

    /// Set output saturation limits.
    pub fn with_duty_limits(mut self, min: u16, max: u16) -> Self {
        self.min_duty = min;
        self.max_duty = max;
        self
    }

    /// Set the capture counter clock (Hz).
    pub fn with_tick_frequency(mut self, hz: u32) -> Self {
        self.tick_frequency = hz;
        self
    }

    /// Set the stall timeout in watchdog polls. `0` disables stall detection.
    pub fn with_stall_timeout(mut self, polls: u32) -> Self {
        self.stall_timeout_polls = polls;
        self
    }

    pub fn with_stall_policy(mut self, policy: StallPolicy) -> Self {
        self.stall_policy = policy;
        self
    }

    pub fn with_fail_safe_duty(mut self, duty: u16) -> Self {
        self.fail_safe_duty = duty;
        self
    }

    /// Check the configuration for values the controller cannot work with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.tick_frequency == 0 {
            return Err(ConfigError::ZeroTickFrequency);
        }

        let gain_ok = |g: f32| g.is_finite() && g >= 0.0;
        if !gain_ok(self.kp) || !gain_ok(self.ki) {
            return Err(ConfigError::InvalidGain);
        }

        if self.min_duty > self.max_duty || self.max_duty > DUTY_STEPS {
            return Err(ConfigError::InvalidDutyLimits);
        }

        if !(self.min_duty..=self.max_duty).contains(&self.fail_safe_duty) {
            return Err(ConfigError::FailSafeOutOfRange);
        }

        Ok(self)
    }
}
