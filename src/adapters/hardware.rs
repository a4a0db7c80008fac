//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them through
//! [`SensorPort`], [`ActuatorPort`] and [`AlarmPort`].  This is the only
//! module in the system (besides the display collaborator) that touches
//! actual hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, AlarmPort, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::feeder::{FeederPosition, FeederServo};
use crate::drivers::heater::HeaterRelay;
use crate::drivers::hw_timer;
use crate::drivers::hw_init;
use crate::drivers::lamp::LampDimmer;
use crate::events::FeederAlarm;
use crate::pins;
use crate::sensors::{SensorHub, SensorSnapshot};

/// HC-SR04 trigger pulse width (µs).
const TRIGGER_PULSE_US: u32 = 10;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    servo: FeederServo,
    heater: HeaterRelay,
    lamp: LampDimmer,
    buzzer: Buzzer,
}

impl HardwareAdapter {
    pub fn new(
        sensor_hub: SensorHub,
        servo: FeederServo,
        heater: HeaterRelay,
        lamp: LampDimmer,
        buzzer: Buzzer,
    ) -> Self {
        Self {
            sensor_hub,
            servo,
            heater,
            lamp,
            buzzer,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorSnapshot {
        self.sensor_hub.read_all()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_feeder(&mut self, position: FeederPosition) {
        self.servo.set_position(position);
    }

    fn set_heater(&mut self, on: bool) {
        self.heater.set(on);
    }

    fn set_lamp_duty(&mut self, fraction: f32) {
        self.lamp.set_duty(fraction);
    }

    fn set_low_food_led(&mut self, on: bool) {
        hw_init::gpio_write(pins::LOW_FOOD_LED_GPIO, on);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn trigger_pulse(&mut self) {
        hw_init::trigger_pulse(TRIGGER_PULSE_US);
    }
}

// ── AlarmPort implementation ──────────────────────────────────

impl AlarmPort for HardwareAdapter {
    fn arm_feeder_alarm(&mut self, phase: FeederAlarm, delay_ms: u32) {
        hw_timer::arm_feeder_alarm(phase, delay_ms);
    }

    fn arm_buzzer_off(&mut self, delay_ms: u32) {
        hw_timer::arm_buzzer_off(delay_ms);
    }

    fn arm_echo_watchdog(&mut self, delay_ms: u32) {
        hw_timer::arm_echo_watchdog(delay_ms);
    }
}
