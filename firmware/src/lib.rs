// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Fan Controller Firmware
//!
//! Board support for the closed-loop fan speed controller, targeting an STM32F777 MCU. The control
//! logic itself lives in the host-testable `fanctl` crate; this crate wires it to the timers, the
//! tachometer interrupt and the speed potentiometer.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | TIM2 interval counter, TIM3 PWM, EXTI, ADC, LEDs, pin map |
//! | [`setpoint`] | Potentiometer to target speed |
//!
//! ## Getting Started
//!
//! Flash the board and stream logs over RTT:
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod hw;
pub mod setpoint;
