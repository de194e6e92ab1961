// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PWM actuator.
//!
//! Writes the regulator's output straight into the compare register of a fixed-frequency PWM
//! channel. Bounds are enforced by the regulator, so values are passed through untouched here.

use embedded_hal::pwm::SetDutyCycle;

/// PWM carrier frequency driving the fan (Hz).
pub const PWM_FREQUENCY_HZ: u32 = 200;

/// Compare steps per PWM period.
pub const DUTY_STEPS: u16 = 200;

/// Fan drive stage on a single PWM channel.
pub struct PwmActuator<P> {
    pwm: P,
    last_duty: Option<u16>,
}

impl<P: SetDutyCycle> PwmActuator<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            last_duty: None,
        }
    }

    /// Write a raw compare value.
    ///
    /// `value` must already lie within the configured duty limits.
    pub fn set_duty(&mut self, value: u16) -> Result<(), P::Error> {
        self.pwm.set_duty_cycle(value)?;
        self.last_duty = Some(value);
        Ok(())
    }

    /// Last value successfully written, if any.
    #[inline]
    pub fn last_duty(&self) -> Option<u16> {
        self.last_duty
    }

    #[inline]
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn free(self) -> P {
        self.pwm
    }
}
