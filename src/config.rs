//! System configuration parameters
//!
//! All tunable parameters for the AquaMon system.  Defaults are compiled
//! in; there is no persistence layer on this board.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Heater hysteresis ---
    /// Temperature (Celsius) below which the heater switches on
    pub heater_on_below_c: f32,
    /// Temperature (Celsius) above which the heater switches off
    pub heater_off_above_c: f32,

    // --- Feeder servo ---
    /// Servo angle (degrees) for the closed hatch position
    pub servo_closed_angle_deg: f32,
    /// Margin (degrees) subtracted from the closed angle for the open position
    pub servo_open_margin_deg: f32,
    /// Mechanical offset (degrees) compensating the hatch linkage
    pub servo_mech_offset_deg: f32,
    /// Hatch dwell time: open→close delay, and the symmetric return delay (ms)
    pub feeder_dwell_ms: u32,

    // --- Light ---
    /// Linear ADC-count → lux conversion factor for the LDR divider
    pub lux_per_count: f32,

    // --- Timing ---
    /// Status tick period: sensor poll + display refresh (milliseconds)
    pub status_period_ms: u32,
    /// Ultrasonic trigger request period (milliseconds)
    pub ranging_period_ms: u32,
    /// Echo watchdog: forces a stuck ranging cycle back to idle (milliseconds)
    pub echo_watchdog_ms: u32,
    /// Buzzer chirp length on a vibration event (milliseconds)
    pub buzzer_chirp_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Heater band
            heater_on_below_c: 25.0,
            heater_off_above_c: 26.0,

            // Feeder
            servo_closed_angle_deg: 140.0,
            servo_open_margin_deg: 20.0,
            servo_mech_offset_deg: 35.0,
            feeder_dwell_ms: 3000,

            // Light
            lux_per_count: 0.122,

            // Timing
            status_period_ms: 500,
            ranging_period_ms: 200,
            echo_watchdog_ms: 100,
            buzzer_chirp_ms: 500,
        }
    }
}
