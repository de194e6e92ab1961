// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tachometer edge interrupt: PB1 on EXTI line 1, rising edge.

use stm32f7xx_hal::{
    gpio::{gpiob, Input, PullUp},
    pac,
};

const LINE: u32 = 1;
/// SYSCFG_EXTICR port code for GPIOB.
const PORT_B: u32 = 0b0001;

/// Route PB1 to EXTI1 and enable the rising-edge interrupt request.
///
/// The pin must already be an input with its pull-up on.
pub fn listen(_pin: &gpiob::PB1<Input<PullUp>>, syscfg: &pac::SYSCFG, exti: &pac::EXTI) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb2enr.modify(|_, w| w.syscfgen().set_bit());

    // EXTICR1 holds lines 0..=3, four bits each
    syscfg.exticr1.modify(|r, w| unsafe {
        w.bits((r.bits() & !(0xF << (4 * LINE))) | (PORT_B << (4 * LINE)))
    });

    exti.rtsr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });
    exti.ftsr.modify(|r, w| unsafe { w.bits(r.bits() & !(1 << LINE)) });

    clear_pending();
    exti.imr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });
}

/// Acknowledge the EXTI1 request. Call first thing in the handler.
#[inline]
pub fn clear_pending() {
    let exti = unsafe { &*pac::EXTI::ptr() };
    // Write-one-to-clear
    exti.pr.write(|w| unsafe { w.bits(1 << LINE) });
}
