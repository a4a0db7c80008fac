//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AquariumService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, alarms, display, event sinks)
//! implement these traits.  The [`AquariumService`](super::service::AquariumService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use heapless::String;

use crate::drivers::feeder::FeederPosition;
use crate::events::FeederAlarm;
use crate::sensors::SensorSnapshot;

/// Number of lines on the status panel.
pub const STATUS_LINES: usize = 5;
/// Capacity of one panel line.
pub type StatusLine = String<32>;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the polled sensors.
pub trait SensorPort {
    /// Read the polled sensors and return a unified snapshot.
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Every call must return quickly — these run inside the single control
/// loop pass and nothing here may block.
pub trait ActuatorPort {
    /// Move the feeder hatch.
    fn set_feeder(&mut self, position: FeederPosition);

    /// Switch the heater relay.
    fn set_heater(&mut self, on: bool);

    /// Set the tank lamp duty fraction (0.0 – 1.0).
    fn set_lamp_duty(&mut self, fraction: f32);

    /// Switch the low-food indicator LED.
    fn set_low_food_led(&mut self, on: bool);

    /// Switch the buzzer.
    fn set_buzzer(&mut self, on: bool);

    /// Fire the ultrasonic trigger pulse (~10 µs, cycle-accurate wait).
    fn trigger_pulse(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Alarm port (driven adapter: domain → one-shot timers)
// ───────────────────────────────────────────────────────────────

/// One-shot timer arming.  Each timer's callback raises the matching
/// event cell; timers are never cancelled early, so a stale expiry must
/// be tolerated by the consumer.
pub trait AlarmPort {
    /// Arm the feeder alarm for the given cycle phase.
    fn arm_feeder_alarm(&mut self, phase: FeederAlarm, delay_ms: u32);

    /// Arm the buzzer auto-off.
    fn arm_buzzer_off(&mut self, delay_ms: u32);

    /// Arm the echo watchdog for the ranging cycle in flight.
    fn arm_echo_watchdog(&mut self, delay_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status panel)
// ───────────────────────────────────────────────────────────────

/// Five fixed-format lines, refreshed once per status tick.  Rendering
/// and layout are the collaborator's business; a failed panel is swapped
/// for a no-op implementation at boot.
pub trait DisplayPort {
    fn render(&mut self, lines: &[StatusLine; STATUS_LINES]);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from display adapter construction.
#[derive(Debug)]
pub enum DisplayError {
    /// I²C bus could not be initialised.
    BusInit(&'static str),
    /// The panel did not acknowledge during init.
    NotAcknowledged,
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusInit(msg) => write!(f, "display bus init failed: {}", msg),
            Self::NotAcknowledged => write!(f, "display did not acknowledge"),
        }
    }
}
