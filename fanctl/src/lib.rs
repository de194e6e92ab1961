// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # fanctl
//!
//! Closed-loop speed control for a single 4-wire PWM fan, written in Rust and free of any
//! particular MCU. Board bring-up lives in the `firmware` crate next to this one.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`capture`] | Tachometer edge pairs to half-period intervals on a free-running counter |
//! | [`control`] | PI regulator and the fan controller that ties everything together |
//! | [`actuator`] | Duty-cycle writes to a fixed-frequency PWM channel |
//! | [`setpoint`] | Where the target speed comes from |
//! | [`watchdog`] | Stall detection when the tachometer goes quiet |
//! | [`status`] | Lock-free status snapshot for display/telemetry readers |
//! | [`config`] | Gains, limits and stall policy |
//! | [`error`] | Error types |
//!
//! ## Data Flow
//!
//! ```text
//! edge ─▶ EdgeCapture ─interval─▶ FanController::tick ─duty─▶ PwmActuator
//!                                        ▲     │
//!                        SetpointSource ─┘     └─▶ StatusCell ─▶ snapshot()
//! ```
//!
//! Everything from the edge to the PWM write runs synchronously in one call, normally from the
//! tachometer interrupt.
//!
//! ## Logging
//!
//! Enable the `defmt` feature to get log output through `defmt`.
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

// Must come first so the macros are visible in the modules below.
mod fmt;

pub mod actuator;
pub mod capture;
pub mod config;
pub mod control;
pub mod error;
pub mod setpoint;
pub mod status;
pub mod watchdog;

pub use actuator::PwmActuator;
pub use capture::{CaptureState, EdgeCapture, FreeRunningCounter};
pub use config::{ControllerConfig, StallPolicy};
pub use control::{ControllerState, FanController, PiRegulator, TickReport};
pub use error::{ConfigError, Error};
pub use setpoint::{AtomicSetpoint, SetpointSource};
pub use status::{Status, StatusCell};
pub use watchdog::StallWatchdog;
