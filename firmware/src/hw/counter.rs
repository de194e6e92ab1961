// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tachometer interval counter on TIM2.
//!
//! TIM2 is a 32-bit timer. It is prescaled to the controller's tick frequency and left with the
//! full 32-bit auto-reload, so a window would need days to wrap. Long gaps are the stall
//! watchdog's problem, not the counter's.

use fanctl::FreeRunningCounter;
use stm32f7xx_hal::{pac, rcc::Clocks};

pub struct TachoCounter {
    tim: pac::TIM2,
}

impl TachoCounter {
    /// Configure TIM2 as a stopped up-counter ticking at `tick_hz`.
    pub fn tim2(tim2: pac::TIM2, clocks: &Clocks, tick_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Prescaler: timer clock / tick_hz
        let psc = (clocks.timclk1().raw() / tick_hz).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.bits(psc) });

        // Auto-reload: max 32-bit
        tim.arr.write(|w| unsafe { w.bits(0xFFFF_FFFF) });

        // Latch the prescaler now instead of at the first overflow
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());

        tim.cnt.write(|w| unsafe { w.bits(0) });

        Self { tim }
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM2 {
        self.tim
    }
}

impl FreeRunningCounter for TachoCounter {
    #[inline]
    fn start(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    #[inline]
    fn stop(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
    }

    #[inline]
    fn read(&self) -> u32 {
        self.tim.cnt.read().cnt().bits()
    }

    #[inline]
    fn reset(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
    }
}
