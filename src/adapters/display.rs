//! Status panel adapters.
//!
//! [`Ssd1306Display`] drives a 128×64 SSD1306 in terminal text mode over
//! any [`embedded_hal::i2c::I2c`] bus — glyphs and layout belong to the
//! ssd1306 crate, this adapter only positions and writes the five status
//! lines.  If the panel does not acknowledge at boot, main swaps in
//! [`NullDisplay`] and every other subsystem keeps running.

use crate::app::ports::{DisplayPort, STATUS_LINES, StatusLine};

/// No-op collaborator used when the panel is absent or failed init.
pub struct NullDisplay;

impl DisplayPort for NullDisplay {
    fn render(&mut self, _lines: &[StatusLine; STATUS_LINES]) {}
}

#[cfg(target_os = "espidf")]
pub use oled::Ssd1306Display;

#[cfg(target_os = "espidf")]
mod oled {
    use core::fmt::Write as _;

    use embedded_hal::i2c::I2c;
    use log::warn;
    use ssd1306::mode::TerminalMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use crate::app::ports::{DisplayError, DisplayPort, STATUS_LINES, StatusLine};

    /// SSD1306 terminal-mode status panel over a generic I²C bus.
    pub struct Ssd1306Display<I2C> {
        panel: Ssd1306<I2CInterface<I2C>, DisplaySize128x64, TerminalMode>,
    }

    impl<I2C: I2c> Ssd1306Display<I2C> {
        /// Initialise the panel.  Fails with [`DisplayError::NotAcknowledged`]
        /// when nothing answers on the bus.
        pub fn new(i2c: I2C) -> Result<Self, DisplayError> {
            let interface = I2CDisplayInterface::new(i2c);
            let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_terminal_mode();
            panel.init().map_err(|_| DisplayError::NotAcknowledged)?;
            panel.clear().map_err(|_| DisplayError::NotAcknowledged)?;

            Ok(Self { panel })
        }
    }

    impl<I2C: I2c> DisplayPort for Ssd1306Display<I2C> {
        fn render(&mut self, lines: &[StatusLine; STATUS_LINES]) {
            // Terminal mode: 8 rows of 16 chars on a 128×64 panel; the
            // five lines land on consecutive rows.  Render errors are
            // logged and dropped — the panel is best-effort by contract.
            for (row, line) in lines.iter().enumerate() {
                if self.panel.set_position(0, row as u8).is_err() {
                    warn!("display: set_position failed, skipping refresh");
                    return;
                }
                // Pad to the full row so stale characters are overwritten.
                if write!(self.panel, "{:<16}", line.as_str()).is_err() {
                    warn!("display: write failed, skipping refresh");
                    return;
                }
            }
        }
    }
}
