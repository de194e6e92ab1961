// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! ## Modules
//!
//! - [`pi`] - PI regulator with saturation and anti-windup, plus the interval-to-RPM conversion.
//! - [`fan_controller`] - Closed-loop fan speed controller driven by tachometer edges.

pub mod fan_controller;
pub mod pi;

pub use fan_controller::{ControllerState, FanController, TickReport};
pub use pi::{PiOutput, PiRegulator, Saturation};
