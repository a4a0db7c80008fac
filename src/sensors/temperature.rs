//! LM35 analog temperature sensor.
//!
//! The LM35 outputs 10 mV/°C; read through a 12-bit ADC against a 3.3 V
//! reference, so `celsius = raw * 3.3 / 4095 * 100`.  Each reading is
//! folded into a 10-sample moving average owned by this driver — the
//! heater decision and the display both see the smoothed value.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the LM35 ADC channel via the oneshot API
//! (initialised by hw_init).  On host/test: reads from a static
//! `AtomicU16` for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

use crate::control::smoothing::MovingAverage;

static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const TEMP_WINDOW: usize = 10;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
/// LM35: 10 mV/°C → volts-to-degrees scale.
const DEG_PER_VOLT: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct TemperatureReading {
    pub raw: u16,
    /// Instantaneous conversion of this sample.
    pub celsius: f32,
    /// Smoothed over the moving window.
    pub avg_c: f32,
}

pub struct TemperatureSensor {
    window: MovingAverage<TEMP_WINDOW>,
    _adc_gpio: i32,
}

impl TemperatureSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            window: MovingAverage::new(),
            _adc_gpio: adc_gpio,
        }
    }

    pub fn read(&mut self) -> TemperatureReading {
        let raw = self.read_adc();
        let celsius = Self::adc_to_celsius(raw);
        let avg_c = self.window.push(celsius);
        TemperatureReading { raw, celsius, avg_c }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_TEMP)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_TEMP_ADC.load(Ordering::Relaxed)
    }

    fn adc_to_celsius(raw: u16) -> f32 {
        (raw as f32 / ADC_MAX) * V_REF * DEG_PER_VOLT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_midpoint_converts_linearly() {
        // 1 V at the ADC ⇒ 100 °C scale: raw 1241 ≈ 1.0003 V ≈ 100.03 °C.
        let c = TemperatureSensor::adc_to_celsius(1241);
        assert!((c - 100.0).abs() < 0.2);
    }

    #[test]
    fn read_smooths_over_window() {
        let mut sensor = TemperatureSensor::new(5);

        sim_set_temp_adc(310); // ≈ 24.98 °C
        let first = sensor.read();
        assert!((first.avg_c - first.celsius).abs() < 1e-6);

        sim_set_temp_adc(350); // ≈ 28.21 °C
        let second = sensor.read();
        let expected = (first.celsius + second.celsius) / 2.0;
        assert!((second.avg_c - expected).abs() < 1e-4);
    }
}
