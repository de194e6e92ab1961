// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Discrete PI regulator with output saturation and integral anti-windup.
//!
//! Works in `no_std` and does not allocate memory.
//!
//! The integral is a plain running sum of errors. It is scaled by the sampling period of the
//! current tick rather than a fixed rate, because ticks happen once per measured half-revolution
//! and their spacing follows the fan speed.

/// Convert a half-period interval into revolutions per minute.
///
/// `(tick_frequency / (interval * 2)) * 60`, in integer arithmetic: the division truncates to
/// whole revolutions per second before scaling, so results are multiples of 60.
///
/// `interval` must be non-zero.
#[inline]
pub fn measured_speed(interval: u32, tick_frequency: u32) -> u32 {
    (tick_frequency / interval.saturating_mul(2)).saturating_mul(60)
}

/// Which limit clamped the output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Saturation {
    High,
    Low,
}

/// Result of one regulator update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PiOutput {
    /// `target - measured`.
    pub error: i32,
    /// Clamped output.
    pub output: f32,
    /// `output` as a PWM compare value (truncated).
    pub duty: u16,
    /// Set when the output hit a limit this update.
    pub saturation: Option<Saturation>,
}

/// PI regulator.
pub struct PiRegulator {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,

    /// Output clamp
    min_duty: u16,
    max_duty: u16,

    /// Sum of errors over all non-saturated updates
    integral_sum: i64,
}

impl PiRegulator {
    pub fn new(kp: f32, ki: f32) -> Self {
        Self {
            kp,
            ki,
            min_duty: 0,
            max_duty: u16::MAX,
            integral_sum: 0,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: u16, max: u16) -> Self {
        self.min_duty = min;
        self.max_duty = max;
        self
    }

    /// Clear the integrator.
    pub fn reset(&mut self) {
        self.integral_sum = 0;
    }

    #[inline]
    pub fn integral_sum(&self) -> i64 {
        self.integral_sum
    }

    /// Undo the integral contribution of `out`, the result of the latest [`update`](Self::update).
    ///
    /// For when the output could not be applied. Saturated updates already left the sum alone.
    pub fn rollback(&mut self, out: &PiOutput) {
        if out.saturation.is_none() {
            self.integral_sum -= out.error as i64;
        }
    }

    /// Run one update.
    ///
    /// `target`, `measured`: speeds in RPM
    /// `sampling_period`: seconds covered by this update
    pub fn update(&mut self, target: u32, measured: u32, sampling_period: f32) -> PiOutput {
        let error = (target as i64 - measured as i64).clamp(i32::MIN as i64, i32::MAX as i64);

        self.integral_sum += error;

        let mut output =
            self.kp * error as f32 + self.ki * self.integral_sum as f32 * sampling_period;

        // Anti-windup: a saturated update does not get to keep its contribution to the sum.
        let max = self.max_duty as f32;
        let min = self.min_duty as f32;
        // NaN compares false both ways, so it is caught on the high side.
        let saturation = if output > max || output.is_nan() {
            output = max;
            self.integral_sum -= error;
            Some(Saturation::High)
        } else if output < min {
            output = min;
            self.integral_sum -= error;
            Some(Saturation::Low)
        } else {
            None
        };

        PiOutput {
            error: error as i32,
            output,
            duty: output as u16,
            saturation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab_regulator() -> PiRegulator {
        PiRegulator::new(0.98, 2.1).with_output_limits(15, 199)
    }

    #[test]
    fn speed_formula_truncates_before_scaling() {
        assert_eq!(measured_speed(100, 10_000), 3000);
        // 10000 / 202 = 49.5 -> 49
        assert_eq!(measured_speed(101, 10_000), 2940);
        // 10000 / 6 = 1666.6 -> 1666
        assert_eq!(measured_speed(3, 10_000), 99_960);
        assert_eq!(measured_speed(10_000, 10_000), 0);
    }

    #[test]
    fn speed_formula_matches_reference_for_many_intervals() {
        for interval in 1..5_000u32 {
            let expected = (10_000 / (interval * 2)) * 60;
            assert_eq!(measured_speed(interval, 10_000), expected);
        }
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        assert_eq!(measured_speed(u32::MAX, 10_000), 0);
    }

    #[test]
    fn clamp_high_restores_integral() {
        // target 3000, measured 2800, Ta = 0.01:
        // 0.98 * 200 + 2.1 * 200 * 0.01 = 200.2 -> 199
        let mut pi = lab_regulator();
        let out = pi.update(3000, 2800, 0.01);

        assert_eq!(out.error, 200);
        assert_eq!(out.output, 199.0);
        assert_eq!(out.duty, 199);
        assert_eq!(out.saturation, Some(Saturation::High));
        assert_eq!(pi.integral_sum(), 0);
    }

    #[test]
    fn clamp_low_restores_integral() {
        let mut pi = lab_regulator();
        let out = pi.update(1000, 3000, 0.01);

        assert_eq!(out.duty, 15);
        assert_eq!(out.saturation, Some(Saturation::Low));
        assert_eq!(pi.integral_sum(), 0);
    }

    #[test]
    fn unsaturated_update_keeps_error_in_sum() {
        let mut pi = lab_regulator();
        // 0.98 * 120 + 2.1 * 120 * 0.01 = 120.12
        let out = pi.update(3000, 2880, 0.01);

        assert_eq!(out.saturation, None);
        assert_eq!(out.duty, 120);
        assert_eq!(pi.integral_sum(), 120);

        // Second update adds on top.
        pi.update(3000, 2880, 0.01);
        assert_eq!(pi.integral_sum(), 240);
    }

    #[test]
    fn integral_term_scales_with_sampling_period() {
        let mut fast = PiRegulator::new(0.0, 2.0).with_output_limits(0, 1000);
        let mut slow = PiRegulator::new(0.0, 2.0).with_output_limits(0, 1000);

        let a = fast.update(200, 100, 0.25);
        let b = slow.update(200, 100, 0.5);

        assert_eq!(a.duty, 50);
        assert_eq!(b.duty, 100);
    }

    #[test]
    fn output_stays_bounded_under_extreme_gains() {
        let mut pi = PiRegulator::new(1.0e6, 1.0e6).with_output_limits(15, 199);
        let sequence = [(0, 5000), (5000, 0), (3000, 3000), (u32::MAX, 0), (0, u32::MAX)];

        for _ in 0..50 {
            for &(target, measured) in &sequence {
                let out = pi.update(target, measured, 0.02);
                assert!((15..=199).contains(&out.duty));
                assert!(out.output >= 15.0 && out.output <= 199.0);
            }
        }
    }

    #[test]
    fn non_finite_output_is_clamped_high() {
        // inf * error + NaN from inf * 0.0
        let mut pi = PiRegulator::new(f32::MAX, f32::MAX).with_output_limits(0, 199);
        let out = pi.update(u32::MAX, 0, 0.0);

        assert_eq!(out.saturation, Some(Saturation::High));
        assert_eq!(out.output, 199.0);
        assert_eq!(out.duty, 199);
        assert_eq!(pi.integral_sum(), 0);
    }

    #[test]
    fn rollback_undoes_only_unsaturated_updates() {
        let mut pi = lab_regulator();
        let out = pi.update(3000, 2880, 0.01);
        assert_eq!(pi.integral_sum(), 120);
        pi.rollback(&out);
        assert_eq!(pi.integral_sum(), 0);

        pi.update(3000, 2880, 0.01);
        let clamped = pi.update(3000, 2800, 0.01);
        assert!(clamped.saturation.is_some());
        pi.rollback(&clamped);
        assert_eq!(pi.integral_sum(), 120);
    }

    #[test]
    fn reset_clears_integral() {
        let mut pi = lab_regulator();
        pi.update(3000, 2880, 0.01);
        assert_ne!(pi.integral_sum(), 0);
        pi.reset();
        assert_eq!(pi.integral_sum(), 0);
    }
}
