// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m::{delay::Delay, interrupt::Mutex, peripheral::NVIC};
use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    pac::{self, interrupt},
    prelude::*,
};
use stm32f7xx_hal as hal;

use fan_firmware::hw::{tacho, Adc, BoardPins, FanPwm, Led, TachoCounter};
use fan_firmware::setpoint::{PotSetpoint, POT_CHANNEL};
use fanctl::config::DEFAULT_TICK_FREQUENCY;
use fanctl::{AtomicSetpoint, ControllerConfig, Error, FanController, StallPolicy, StatusCell};

type Fan = FanController<'static, TachoCounter, FanPwm, &'static AtomicSetpoint>;

/// Foreground loop period.
const POLL_MS: u32 = 10;
/// 500 ms without a tachometer edge is a stall.
const STALL_TIMEOUT_POLLS: u32 = 50;
/// Re-read the potentiometer every 100 ms.
const SETPOINT_EVERY: u32 = 10;
/// Log the status snapshot every second.
const REPORT_EVERY: u32 = 100;

static TARGET: AtomicSetpoint = AtomicSetpoint::new(0);
static STATUS: StatusCell = StatusCell::new();
static FAN: Mutex<RefCell<Option<Fan>>> = Mutex::new(RefCell::new(None));

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
    let mut led_fault = Led::active_low(pins.leds.red);
    let mut led_alive = Led::active_low(pins.leds.green);

    // Setpoint from the knob, sampled once before the fan starts
    let mut pot = PotSetpoint::new(Adc::adc1(dp.ADC1), POT_CHANNEL, &TARGET);
    pot.refresh();

    // TIM2 interval counter, TIM3 PWM
    let counter = TachoCounter::tim2(dp.TIM2, &clocks, DEFAULT_TICK_FREQUENCY);
    let pwm = FanPwm::tim3(dp.TIM3, &clocks);

    let config = ControllerConfig::default()
        .with_stall_timeout(STALL_TIMEOUT_POLLS)
        .with_stall_policy(StallPolicy::FailSafe);

    let fan = match FanController::new(config, counter, pwm, &TARGET, &STATUS) {
        Ok(fan) => fan,
        Err(e) => defmt::panic!("invalid controller config: {}", e),
    };

    cortex_m::interrupt::free(|cs| FAN.borrow(cs).replace(Some(fan)));

    // Tachometer on EXTI1, enabled last so the first edge finds the controller in place
    tacho::listen(&pins.fan.tacho, &dp.SYSCFG, &dp.EXTI);
    unsafe { NVIC::unmask(pac::Interrupt::EXTI1) };

    defmt::info!("fan controller running, target {} rpm", TARGET.get());

    let mut delay = Delay::new(cp.SYST, clocks.sysclk().raw());
    let mut cycle: u32 = 0;

    loop {
        delay.delay_ms(POLL_MS);
        cycle = cycle.wrapping_add(1);

        if cycle % SETPOINT_EVERY == 0 {
            pot.refresh();
        }

        let stalled = cortex_m::interrupt::free(|cs| {
            let mut fan = FAN.borrow(cs).borrow_mut();
            match fan.as_mut() {
                Some(fan) => {
                    if let Err(e) = fan.poll_watchdog() {
                        defmt::warn!("watchdog: {}", e);
                    }
                    fan.is_stalled()
                }
                None => false,
            }
        });
        led_fault.set(stalled);

        if cycle % REPORT_EVERY == 0 {
            led_alive.toggle();
            defmt::info!("{}", STATUS.snapshot());
        }
    }
}

#[interrupt]
fn EXTI1() {
    tacho::clear_pending();

    cortex_m::interrupt::free(|cs| {
        if let Some(fan) = FAN.borrow(cs).borrow_mut().as_mut() {
            match fan.on_edge() {
                Ok(_) => {}
                Err(Error::DegenerateInterval) => defmt::debug!("edge pair with no ticks between"),
                Err(e) => defmt::warn!("tick failed: {}", e),
            }
        }
    });
}
