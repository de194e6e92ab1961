// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the fan controller board (STM32F777).

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, Analog, Input, OpenDrain, Output, PullUp, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub fan: FanPins,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Fan connector and speed potentiometer
pub struct FanPins {
    pub tacho: gpiob::PB1<Input<PullUp>>, // EXTI1, open-collector tach output
    pub pwm: gpiob::PB5<Alternate<2, OpenDrain>>, // TIM3_CH2
    pub pot: gpioa::PA6<Analog>, // ADC1_IN6
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            fan: FanPins {
                tacho: gpiob.pb1.into_pull_up_input(),
                pwm: gpiob.pb5.into_alternate_open_drain::<2>(),
                pot: gpioa.pa6.into_analog(),
            },
        }
    }
}
