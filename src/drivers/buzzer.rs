//! Piezo buzzer driver.
//!
//! The chirp duration is enforced by the buzzer-off one-shot alarm; this
//! driver only switches the pin.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the buzzer GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

pub struct Buzzer {
    on: bool,
}

impl Buzzer {
    pub fn new() -> Self {
        Self { on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(pins::BUZZER_GPIO, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
