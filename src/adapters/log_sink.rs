//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | T={:.2}\u{00b0}C | light={:.2}lx | dist={:.2}cm | \
                     food_low={} | vib={}",
                    s.temperature_c,
                    s.light_lux,
                    s.distance_cm,
                    u8::from(s.food_low),
                    u8::from(s.vibration),
                );
            }
            AppEvent::FeederChanged { from, to } => {
                info!("FEEDER | {:?} -> {:?}", from, to);
            }
            AppEvent::HeaterChanged { on, temperature_c } => {
                info!(
                    "HEATER | {} at {:.2}\u{00b0}C",
                    if *on { "ON" } else { "OFF" },
                    temperature_c
                );
            }
            AppEvent::RangeDiscarded { distance_cm } => {
                debug!("RANGE | {:.1}cm outside plausible window, dropped", distance_cm);
            }
            AppEvent::Started => {
                info!("START | control core up");
            }
        }
    }
}
