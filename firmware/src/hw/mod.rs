// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level wrappers: timers, EXTI, ADC, GPIO.

pub mod adc;
pub mod counter;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod tacho;

pub use adc::Adc;
pub use counter::TachoCounter;
pub use led::Led;
pub use pins::BoardPins;
pub use pwm::FanPwm;
