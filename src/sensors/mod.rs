//! Sensor subsystem — the polled pipelines and the aggregating [`SensorHub`].
//!
//! The hub owns the temperature and light drivers (each with its own
//! smoothing window) and produces a [`SensorSnapshot`] on every status
//! tick.  The distance pipeline is event-driven, not polled, and lives in
//! [`distance`] — the ranging state machine is fed from echo-edge
//! timestamps by the control loop.

pub mod distance;
pub mod light;
pub mod temperature;

pub use light::LightSensor;
pub use temperature::TemperatureSensor;

/// A point-in-time snapshot of the polled sensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    /// Raw ADC value from the LM35 (0 – 4095).
    pub temp_raw: u16,
    /// Smoothed water temperature (°C), 10-sample window.
    pub temperature_c: f32,

    /// Raw ADC value from the LDR divider (0 – 4095).
    pub light_raw: u16,
    /// Smoothed illuminance level (ADC counts), 10-sample window.
    pub light_level: f32,
    /// Illuminance converted to lux via the fixed linear factor.
    pub light_lux: f32,
}

/// Aggregates the polled sensor drivers.
pub struct SensorHub {
    pub temperature: TemperatureSensor,
    pub light: LightSensor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(temperature: TemperatureSensor, light: LightSensor) -> Self {
        Self { temperature, light }
    }

    /// Read both polled sensors and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let temp = self.temperature.read();
        let light = self.light.read();

        SensorSnapshot {
            temp_raw: temp.raw,
            temperature_c: temp.avg_c,
            light_raw: light.raw,
            light_level: light.level,
            light_lux: light.lux,
        }
    }
}
