// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fan PWM output on TIM3 channel 2 (PB5).
//!
//! The timer runs at `PWM_FREQUENCY_HZ * DUTY_STEPS` so one period is exactly `DUTY_STEPS` counts
//! and the compare register takes duty steps directly.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use fanctl::actuator::{DUTY_STEPS, PWM_FREQUENCY_HZ};
use stm32f7xx_hal::{pac, rcc::Clocks};

/// CCMR1 OC2M field and output compare 2 preload enable.
const OC2M_MASK: u32 = (0b111 << 12) | (1 << 24);
const OC2M_PWM1: u32 = 0b110 << 12;
const OC2PE: u32 = 1 << 11;

pub struct FanPwm {
    tim: pac::TIM3,
}

impl FanPwm {
    /// Configure TIM3 CH2 for edge-aligned PWM mode 1 and start it with zero duty.
    pub fn tim3(tim3: pac::TIM3, clocks: &Clocks) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;

        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let count_hz = PWM_FREQUENCY_HZ * DUTY_STEPS as u32;
        let psc = (clocks.timclk1().raw() / count_hz).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(DUTY_STEPS as u32 - 1) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // CH2 as output, PWM mode 1, preloaded compare
        tim.ccmr1_output().modify(|r, w| unsafe {
            w.bits((r.bits() & !OC2M_MASK & !0b11_0000_0000) | OC2M_PWM1 | OC2PE)
        });
        tim.ccer.modify(|_, w| w.cc2p().clear_bit().cc2e().set_bit());

        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Current compare value.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.tim.ccr2.read().bits() as u16
    }

    pub fn free(self) -> pac::TIM3 {
        self.tim
    }
}

impl ErrorType for FanPwm {
    type Error = Infallible;
}

impl SetDutyCycle for FanPwm {
    #[inline]
    fn max_duty_cycle(&self) -> u16 {
        DUTY_STEPS
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(DUTY_STEPS);
        self.tim.ccr2.write(|w| unsafe { w.bits(duty as u32) });
        Ok(())
    }
}
