//! Heater relay driver.
//!
//! Dumb on/off actuator — the hysteresis decision lives in
//! [`crate::control::hysteresis`].
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct HeaterRelay {
    on: bool,
}

impl HeaterRelay {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::HEATER_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
