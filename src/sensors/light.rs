//! LDR ambient-light sensor.
//!
//! Photocell in a resistive divider read through a 12-bit ADC channel.
//! The raw count is smoothed over a 10-sample window before the lamp tier
//! lookup; the lux figure shown on the panel is a fixed linear scaling of
//! the smoothed count.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the LDR ADC channel via the oneshot API.
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

use crate::control::smoothing::MovingAverage;

static SIM_LIGHT_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_adc(raw: u16) {
    SIM_LIGHT_ADC.store(raw, Ordering::Relaxed);
}

const LIGHT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct LightReading {
    pub raw: u16,
    /// Smoothed illuminance level (ADC counts).
    pub level: f32,
    /// Smoothed level scaled to lux.
    pub lux: f32,
}

pub struct LightSensor {
    window: MovingAverage<LIGHT_WINDOW>,
    lux_per_count: f32,
    _adc_gpio: i32,
}

impl LightSensor {
    pub fn new(adc_gpio: i32, lux_per_count: f32) -> Self {
        Self {
            window: MovingAverage::new(),
            lux_per_count,
            _adc_gpio: adc_gpio,
        }
    }

    pub fn read(&mut self) -> LightReading {
        let raw = self.read_adc();
        let level = self.window.push(raw as f32);
        LightReading {
            raw,
            level,
            lux: level * self.lux_per_count,
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_LIGHT)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LIGHT_ADC.load(Ordering::Relaxed)
    }
}
