//! Outbound application events.
//!
//! The [`AquariumService`](super::service::AquariumService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — today they go to the
//! serial log.

use crate::drivers::feeder::FeederState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic five-field status snapshot (the system's only wire format).
    Status(StatusReport),

    /// The feeder hatch cycle moved between states.
    FeederChanged { from: FeederState, to: FeederState },

    /// The heater relay toggled on a hysteresis crossing.
    HeaterChanged { on: bool, temperature_c: f32 },

    /// A ranging result fell outside the plausible window and was dropped.
    RangeDiscarded { distance_cm: f32 },

    /// The application service has started.
    Started,
}

/// The fixed five-field status emitted once per status tick.
#[derive(Debug, Clone, Copy)]
pub struct StatusReport {
    /// Smoothed water temperature (°C).
    pub temperature_c: f32,
    /// Smoothed ambient light (lux).
    pub light_lux: f32,
    /// Smoothed distance to the water surface (cm).
    pub distance_cm: f32,
    /// IR food-level sensor: true while the hopper reads low.
    pub food_low: bool,
    /// Vibration seen since the previous tick.
    pub vibration: bool,
}
