//! Tank lamp driver (MOSFET low-side, 10 kHz LEDC PWM).
//!
//! Dumb actuator — the tier decision lives in [`crate::control::dimmer`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the lamp LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct LampDimmer {
    duty: f32,
}

impl LampDimmer {
    pub fn new() -> Self {
        Self { duty: 0.0 }
    }

    pub fn set_duty(&mut self, fraction: f32) {
        let fraction = fraction.clamp(0.0, 1.0);
        hw_init::ledc_set_fraction(hw_init::LEDC_CH_LAMP, fraction);
        self.duty = fraction;
    }

    pub fn off(&mut self) {
        self.set_duty(0.0);
    }

    pub fn current_duty(&self) -> f32 {
        self.duty
    }
}
