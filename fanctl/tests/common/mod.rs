// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hardware doubles and a toy fan model shared by the integration tests.

#![allow(dead_code)]

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use fanctl::FreeRunningCounter;

/// Counter whose reading is set by the test before the closing edge.
#[derive(Default)]
pub struct FakeCounter {
    pub running: bool,
    pub value: u32,
}

impl FreeRunningCounter for FakeCounter {
    fn start(&mut self) {
        self.running = true;
    }
    fn stop(&mut self) {
        self.running = false;
    }
    fn read(&self) -> u32 {
        self.value
    }
    fn reset(&mut self) {
        self.value = 0;
    }
}

/// PWM channel that records every compare value written.
#[derive(Default)]
pub struct RecordingPwm {
    pub writes: Vec<u16>,
}

impl ErrorType for RecordingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        fanctl::actuator::DUTY_STEPS
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.writes.push(duty);
        Ok(())
    }
}

/// First-order fan: speed relaxes toward `rpm_per_duty * duty` by `alpha` of the gap per tick.
pub struct FanModel {
    pub speed: f32,
    pub alpha: f32,
    pub rpm_per_duty: f32,
}

impl FanModel {
    /// Counter ticks between two tachometer edges at the current speed.
    pub fn half_period_ticks(&self, tick_frequency: u32) -> u32 {
        let ticks = (tick_frequency as f32 * 60.0 / (2.0 * self.speed)).round();
        (ticks as u32).max(1)
    }

    pub fn step(&mut self, duty: u16) {
        self.speed += self.alpha * (self.rpm_per_duty * duty as f32 - self.speed);
    }
}

/// Small deterministic LCG so property tests need no extra crates.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}
