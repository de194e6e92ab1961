// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking single-channel reads on ADC1 using direct PAC register access.
//!
//! Example:
//! ```ignore
//! let adc1 = Adc::adc1(dp.ADC1);
//! let value = adc1.read(6);
//! ```

use stm32f7xx_hal::pac;

/// Wrapper over the PAC ADC1 peripheral.
pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Create and initialize ADC1: 12-bit, right-aligned, software trigger.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // ADC prescaler: PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        let adc = adc1;

        // Power off to configure
        adc.cr2.modify(|_, w| w.adon().clear_bit());

        adc.cr1.modify(|_, w| w.res().bits(0b00));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        // Sequence length = 1 conversion
        adc.sqr1.modify(|_, w| w.l().bits(0));

        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Blocking conversion of one channel (0..=15), longest sample time.
    pub fn read(&self, channel: u8) -> u16 {
        let adc = &self.adc;
        let channel = channel & 0x0F;

        if channel <= 9 {
            let shift = 3 * channel as u32;
            adc.smpr2
                .modify(|r, w| unsafe { w.bits((r.bits() & !(0b111 << shift)) | (0b111 << shift)) });
        } else {
            let shift = 3 * (channel as u32 - 10);
            adc.smpr1
                .modify(|r, w| unsafe { w.bits((r.bits() & !(0b111 << shift)) | (0b111 << shift)) });
        }

        adc.sqr3.modify(|_, w| unsafe { w.sq1().bits(channel) });

        adc.cr2.modify(|_, w| w.swstart().set_bit());
        while adc.sr.read().eoc().bit_is_clear() {}

        adc.dr.read().data().bits() as u16
    }

    #[inline]
    pub fn free(self) -> pac::ADC1 {
        self.adc
    }
}
