//! GPIO / peripheral pin assignments for the AquaMon main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Feeder servo (SG90 hobby servo, 50 Hz frame)
// ---------------------------------------------------------------------------

/// LEDC PWM output for the feeder hatch servo.
pub const SERVO_PWM_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Tank lamp (MOSFET low-side driver, dimmable)
// ---------------------------------------------------------------------------

/// LEDC PWM output for the tank lamp (10 kHz — no visible flicker).
pub const LAMP_PWM_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Heater relay and buzzer (plain digital outputs)
// ---------------------------------------------------------------------------

/// Digital output: HIGH energises the heater relay.
pub const HEATER_GPIO: i32 = 3;
/// Digital output: HIGH sounds the piezo buzzer.
pub const BUZZER_GPIO: i32 = 4;
/// Digital output: low-food indicator LED (HIGH = food low).
pub const LOW_FOOD_LED_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// LM35 water-temperature sensor — ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const TEMP_ADC_GPIO: i32 = 5;
/// LDR photocell divider — ADC1 channel 5 (GPIO 6 on ESP32-S3).
pub const LIGHT_ADC_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Sensors — Digital / Interrupt
// ---------------------------------------------------------------------------

/// IR food-level sensor — HIGH while the hopper reads low (any-edge IRQ).
pub const LOW_FOOD_GPIO: i32 = 7;
/// HC-SR04 trigger output.
pub const TRIG_GPIO: i32 = 15;
/// HC-SR04 echo input (any-edge IRQ, timestamped in the ISR).
pub const ECHO_GPIO: i32 = 16;
/// SW-420 vibration sensor — rising-edge IRQ, pull-down.
pub const VIBRATION_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 status panel)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Servo frame frequency — standard hobby-servo 20 ms period.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC resolution for the servo channel.  14-bit keeps the 1–2 ms pulse
/// window at ~820 duty steps.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Lamp PWM frequency (10 kHz).
pub const LAMP_PWM_FREQ_HZ: u32 = 10_000;
/// LEDC resolution for the lamp channel.
pub const LAMP_PWM_RESOLUTION_BITS: u32 = 12;
