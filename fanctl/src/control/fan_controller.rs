// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop speed controller for one fan.
//!
//! The controller owns the capture state machine, the PI regulator and the PWM actuator. Each
//! tachometer edge goes through [`FanController::on_edge`]; every second edge completes an
//! interval, which runs one regulation tick on the spot and writes the new duty before returning.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! // tachometer interrupt
//! let _ = controller.on_edge();
//!
//! // foreground loop, every 10 ms
//! let _ = controller.poll_watchdog();
//! let status = STATUS.snapshot();
//! ```

use crate::actuator::PwmActuator;
use crate::capture::{CaptureState, EdgeCapture, FreeRunningCounter};
use crate::config::{ControllerConfig, StallPolicy};
use crate::control::pi::{self, PiRegulator, Saturation};
use crate::error::{ConfigError, Error};
use crate::setpoint::SetpointSource;
use crate::status::StatusCell;
use crate::watchdog::StallWatchdog;

use embedded_hal::pwm::SetDutyCycle;

/// Regulator values from the most recent tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ControllerState {
    /// RPM
    pub target_speed: u32,
    /// RPM
    pub measured_speed: u32,
    /// `target_speed - measured_speed`
    pub error: i32,
    /// Running error sum carried between ticks.
    pub integral_sum: i64,
    /// Clamped regulator output (duty steps).
    pub output: f32,
}

/// What one completed tick did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Captured half-period (counter ticks).
    pub interval: u32,
    /// Duty written to the PWM channel.
    pub duty: u16,
    pub saturation: Option<Saturation>,
    pub state: ControllerState,
}

/// Fan speed controller.
///
/// - `C`: free-running capture counter
/// - `P`: PWM channel
/// - `S`: setpoint source
pub struct FanController<'s, C, P, S> {
    config: ControllerConfig,
    capture: EdgeCapture<C>,
    regulator: PiRegulator,
    actuator: PwmActuator<P>,
    setpoint: S,
    watchdog: StallWatchdog,
    state: ControllerState,
    status: &'s StatusCell,
}

impl<'s, C, P, S> FanController<'s, C, P, S>
where
    C: FreeRunningCounter,
    P: SetDutyCycle,
    S: SetpointSource,
{
    /// Build a controller. Fails if `config` does not validate.
    pub fn new(
        config: ControllerConfig,
        counter: C,
        pwm: P,
        setpoint: S,
        status: &'s StatusCell,
    ) -> Result<Self, ConfigError> {
        let config = config.validate()?;

        let regulator =
            PiRegulator::new(config.kp, config.ki).with_output_limits(config.min_duty, config.max_duty);

        info!(
            "fan controller: f_tick={}Hz kp={} ki={} duty=[{}, {}]",
            config.tick_frequency,
            config.kp,
            config.ki,
            config.min_duty,
            config.max_duty
        );

        Ok(Self {
            config,
            capture: EdgeCapture::new(counter),
            regulator,
            actuator: PwmActuator::new(pwm),
            setpoint,
            watchdog: StallWatchdog::new(config.stall_timeout_polls),
            state: ControllerState::default(),
            status,
        })
    }

    /// Handle one rising tachometer edge.
    ///
    /// Returns `Ok(Some(report))` when the edge completed an interval and a tick ran.
    pub fn on_edge(&mut self) -> Result<Option<TickReport>, Error<P::Error>> {
        if self.watchdog.feed() {
            info!("tachometer edges back, clearing stall");
            self.status.set_stalled(false);
        }

        match self.capture.on_edge() {
            Some(interval) => self.tick(interval).map(Some),
            None => Ok(None),
        }
    }

    /// Run one regulation tick on a captured half-period.
    ///
    /// A zero interval is rejected before anything is computed or written.
    pub fn tick(&mut self, interval: u32) -> Result<TickReport, Error<P::Error>> {
        if interval == 0 {
            warn!("zero-tick interval, skipping");
            return Err(Error::DegenerateInterval);
        }

        let target = self.setpoint.target();
        let measured = pi::measured_speed(interval, self.config.tick_frequency);
        let sampling_period = interval as f32 / self.config.tick_frequency as f32;

        let out = self.regulator.update(target, measured, sampling_period);

        // Nothing is committed unless the duty actually reached the channel.
        if let Err(e) = self.actuator.set_duty(out.duty) {
            self.regulator.rollback(&out);
            warn!("PWM write failed, tick dropped");
            return Err(Error::Pwm(e));
        }

        self.state = ControllerState {
            target_speed: target,
            measured_speed: measured,
            error: out.error,
            integral_sum: self.regulator.integral_sum(),
            output: out.output,
        };
        self.status.publish_tick(target, measured, interval, out.duty);

        if let Some(sat) = out.saturation {
            debug!("output saturated ({}), integral held", sat);
        }

        Ok(TickReport {
            interval,
            duty: out.duty,
            saturation: out.saturation,
            state: self.state,
        })
    }

    /// Advance the stall watchdog by one poll period and apply the stall policy if it trips.
    ///
    /// Returns `Err(Error::StalledSensor)` on the poll that detects the stall.
    pub fn poll_watchdog(&mut self) -> Result<(), Error<P::Error>> {
        if !self.watchdog.poll() {
            return Ok(());
        }

        self.status.set_stalled(true);

        match self.config.stall_policy {
            StallPolicy::HoldLast => {
                warn!("tachometer stalled, holding last duty");
            }

            StallPolicy::FailSafe => {
                warn!(
                    "tachometer stalled, fail-safe duty {}",
                    self.config.fail_safe_duty
                );
                self.capture.abort();
                self.regulator.reset();
                self.state.measured_speed = 0;
                self.state.integral_sum = 0;
                self.state.output = self.config.fail_safe_duty as f32;

                self.actuator
                    .set_duty(self.config.fail_safe_duty)
                    .map_err(Error::Pwm)?;
                self.status.publish_measured(0);
                self.status.publish_duty(self.config.fail_safe_duty);
            }
        }

        Err(Error::StalledSensor)
    }

    /// Drop any open capture window and clear the integrator. The PWM output is left alone.
    pub fn reset(&mut self) {
        self.capture.abort();
        self.regulator.reset();
        self.state.integral_sum = 0;
    }

    /// Regulator values from the most recent tick.
    #[inline]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    #[inline]
    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.watchdog.is_tripped()
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[inline]
    pub fn actuator(&self) -> &PwmActuator<P> {
        &self.actuator
    }

    /// Mutable access to the capture counter.
    #[inline]
    pub fn counter_mut(&mut self) -> &mut C {
        self.capture.counter_mut()
    }

    /// Tear down the controller and return the counter, PWM channel and setpoint source.
    pub fn free(self) -> (C, P, S) {
        (self.capture.free(), self.actuator.free(), self.setpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::tests::RecordingPwm;
    use crate::capture::tests::FakeCounter;

    type TestController<'s> = FanController<'s, FakeCounter, RecordingPwm, fn() -> u32>;

    fn target_3000() -> u32 {
        3000
    }

    fn controller(status: &StatusCell, config: ControllerConfig) -> TestController<'_> {
        FanController::new(
            config,
            FakeCounter::default(),
            RecordingPwm::default(),
            target_3000 as fn() -> u32,
            status,
        )
        .unwrap()
    }

    /// Push one full edge pair with the counter reading `interval` at the second edge.
    fn edge_pair(c: &mut TestController<'_>, interval: u32) -> Option<TickReport> {
        assert_eq!(c.on_edge().unwrap(), None);
        c.counter_mut().value = interval;
        c.on_edge().unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let status = StatusCell::new();
        let res = FanController::new(
            ControllerConfig::default().with_tick_frequency(0),
            FakeCounter::default(),
            RecordingPwm::default(),
            target_3000 as fn() -> u32,
            &status,
        );
        assert!(matches!(res, Err(ConfigError::ZeroTickFrequency)));
    }

    #[test]
    fn edge_pair_runs_one_tick() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());

        let report = edge_pair(&mut c, 100).unwrap();

        assert_eq!(report.interval, 100);
        assert_eq!(report.state.measured_speed, 3000);
        assert_eq!(report.state.target_speed, 3000);
        assert_eq!(report.state.error, 0);
        // Zero error, zero integral: output falls to the lower limit.
        assert_eq!(report.duty, 15);
        assert_eq!(report.saturation, Some(Saturation::Low));
        assert_eq!(c.actuator().pwm().writes, [15]);
        assert_eq!(c.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn zero_interval_leaves_everything_untouched() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());

        // Establish some state first: 2880 RPM against 3000.
        edge_pair(&mut c, 104).unwrap();
        let before = c.state();
        let snapshot_before = status.snapshot();
        let writes_before = c.actuator().pwm().writes.len();

        assert_eq!(c.on_edge().unwrap(), None);
        c.counter_mut().value = 0;
        assert_eq!(c.on_edge(), Err(Error::DegenerateInterval));

        assert_eq!(c.state(), before);
        assert_eq!(status.snapshot(), snapshot_before);
        assert_eq!(c.actuator().pwm().writes.len(), writes_before);
        // The capture still closed its window.
        assert_eq!(c.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn tick_publishes_status() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());

        let report = edge_pair(&mut c, 104).unwrap();
        let s = status.snapshot();

        assert_eq!(s.target_speed, 3000);
        // 10000 / 208 = 48 -> 2880
        assert_eq!(s.measured_speed, 2880);
        assert_eq!(s.interval, 104);
        assert_eq!(s.duty, report.duty as u32);
    }

    #[test]
    fn integral_carries_between_ticks() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());

        // 120 RPM short: 0.98 * 120 + 2.1 * 120 * 0.0104 = 120.2, inside the limits.
        let first = edge_pair(&mut c, 104).unwrap();
        assert_eq!(first.saturation, None);
        assert_eq!(first.state.integral_sum, 120);

        let second = edge_pair(&mut c, 104).unwrap();
        assert_eq!(second.state.integral_sum, 240);
        assert!(second.duty >= first.duty);
    }

    #[test]
    fn hold_last_policy_only_flags_stall() {
        let status = StatusCell::new();
        let cfg = ControllerConfig::default().with_stall_timeout(3);
        let mut c = controller(&status, cfg);

        let report = edge_pair(&mut c, 104).unwrap();

        assert_eq!(c.poll_watchdog(), Ok(()));
        assert_eq!(c.poll_watchdog(), Ok(()));
        assert_eq!(c.poll_watchdog(), Err(Error::StalledSensor));
        assert!(c.is_stalled());
        assert!(status.snapshot().stalled());

        // Nothing else moved.
        assert_eq!(c.actuator().last_duty(), Some(report.duty));
        assert_eq!(status.measured_speed(), 2880);
        assert_eq!(c.state(), report.state);

        // Reported once.
        assert_eq!(c.poll_watchdog(), Ok(()));
    }

    #[test]
    fn fail_safe_policy_drives_safe_duty() {
        let status = StatusCell::new();
        let cfg = ControllerConfig::default()
            .with_stall_timeout(2)
            .with_stall_policy(StallPolicy::FailSafe)
            .with_fail_safe_duty(40);
        let mut c = controller(&status, cfg);

        edge_pair(&mut c, 104).unwrap();
        // Leave a window open when the fan stops.
        c.on_edge().unwrap();
        assert_eq!(c.capture_state(), CaptureState::Measuring);

        assert_eq!(c.poll_watchdog(), Ok(()));
        assert_eq!(c.poll_watchdog(), Err(Error::StalledSensor));

        assert_eq!(c.actuator().last_duty(), Some(40));
        assert_eq!(c.capture_state(), CaptureState::Idle);
        assert_eq!(c.state().integral_sum, 0);
        assert_eq!(c.state().measured_speed, 0);

        let s = status.snapshot();
        assert!(s.stalled());
        assert_eq!(s.measured_speed, 0);
        assert_eq!(s.duty, 40);
    }

    #[test]
    fn edge_after_stall_clears_flag() {
        let status = StatusCell::new();
        let cfg = ControllerConfig::default().with_stall_timeout(1);
        let mut c = controller(&status, cfg);

        assert_eq!(c.poll_watchdog(), Err(Error::StalledSensor));
        assert!(status.snapshot().stalled());

        c.on_edge().unwrap();
        assert!(!c.is_stalled());
        assert!(!status.snapshot().stalled());
    }

    #[test]
    fn disabled_watchdog_never_trips() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());
        for _ in 0..10_000 {
            assert_eq!(c.poll_watchdog(), Ok(()));
        }
    }

    /// PWM channel that refuses every write.
    struct FailingPwm;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct ChannelFault;

    impl embedded_hal::pwm::Error for ChannelFault {
        fn kind(&self) -> embedded_hal::pwm::ErrorKind {
            embedded_hal::pwm::ErrorKind::Other
        }
    }

    impl embedded_hal::pwm::ErrorType for FailingPwm {
        type Error = ChannelFault;
    }

    impl SetDutyCycle for FailingPwm {
        fn max_duty_cycle(&self) -> u16 {
            crate::actuator::DUTY_STEPS
        }

        fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
            Err(ChannelFault)
        }
    }

    #[test]
    fn failed_pwm_write_commits_nothing() {
        let status = StatusCell::new();
        let mut c = FanController::new(
            ControllerConfig::default(),
            FakeCounter::default(),
            FailingPwm,
            target_3000 as fn() -> u32,
            &status,
        )
        .unwrap();

        assert_eq!(c.on_edge(), Ok(None));
        c.counter_mut().value = 104;
        assert_eq!(c.on_edge(), Err(Error::Pwm(ChannelFault)));

        assert_eq!(c.state(), ControllerState::default());
        assert_eq!(c.regulator.integral_sum(), 0);
        assert_eq!(status.snapshot(), crate::status::Status::default());
        assert_eq!(c.actuator().last_duty(), None);
        // The window still closed.
        assert_eq!(c.capture_state(), CaptureState::Idle);
    }

    #[test]
    fn reset_drops_window_and_integral() {
        let status = StatusCell::new();
        let mut c = controller(&status, ControllerConfig::default());

        edge_pair(&mut c, 104).unwrap();
        c.on_edge().unwrap();
        c.reset();

        assert_eq!(c.capture_state(), CaptureState::Idle);
        assert_eq!(c.state().integral_sum, 0);
        assert_eq!(c.actuator().pwm().writes.len(), 1);
    }
}
