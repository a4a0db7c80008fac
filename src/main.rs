//! AquaMon Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution: ISRs and timer
//! callbacks raise coalescing flag cells, and this loop drains them in
//! fixed priority order, one non-blocking pass per iteration.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            Ssd1306Display     LogEventSink    │
//! │  (Sensor+Actuator+Alarm)    (DisplayPort)      (EventSink)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            AquariumService (pure logic)                │    │
//! │  │  feeder cycle · heater band · ranging · lamp tiers     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Event Bus (coalescing flag cells, ISR → loop handoff)         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod events;
mod pins;

pub mod app;
mod adapters;
mod control;
mod drivers;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::display::NullDisplay;
use adapters::hardware::HardwareAdapter;
use adapters::log_sink::LogEventSink;
use app::ports::DisplayPort;
use app::service::AquariumService;
use config::SystemConfig;
use drivers::buzzer::Buzzer;
use drivers::feeder::{FeederPosition, FeederServo};
use drivers::heater::HeaterRelay;
use drivers::lamp::LampDimmer;
use sensors::{LightSensor, SensorHub, TemperatureSensor};

/// Loop pacing: bounds the latency between a cell being raised and the
/// loop consuming it.  Echo timestamps are recorded in the ISR, so this
/// pacing adds no measurement jitter.
const LOOP_PACE_MS: u64 = 10;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();
    #[cfg(target_os = "espidf")]
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AquaMon v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    drivers::hw_timer::start_timers(config.status_period_ms, config.ranging_period_ms);
    if let Err(e) = drivers::hw_init::init_isr_service() {
        log::error!("ISR service init failed: {} — continuing without ISRs", e);
    }

    // ── 3. Construct adapters ─────────────────────────────────
    let sensor_hub = SensorHub::new(
        TemperatureSensor::new(pins::TEMP_ADC_GPIO),
        LightSensor::new(pins::LIGHT_ADC_GPIO, config.lux_per_count),
    );

    let mut hw = HardwareAdapter::new(
        sensor_hub,
        FeederServo::new(
            config.servo_closed_angle_deg,
            config.servo_open_margin_deg,
            config.servo_mech_offset_deg,
        ),
        HeaterRelay::new(),
        LampDimmer::new(),
        Buzzer::new(),
    );

    // Park the hatch closed before anything can dispense.
    {
        use app::ports::ActuatorPort;
        hw.set_feeder(FeederPosition::Closed);
    }

    // ── 3b. Status panel (best-effort collaborator) ───────────
    // A panel that does not acknowledge is swapped for a no-op; every
    // other subsystem keeps running.
    #[cfg(target_os = "espidf")]
    let mut display: Box<dyn DisplayPort> = {
        use adapters::display::Ssd1306Display;
        use esp_idf_hal::gpio::IOPin;
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::peripherals::Peripherals;
        use esp_idf_hal::units::FromValueType;

        let peripherals = Peripherals::take()?;
        info!(
            "panel on I2C0 (SDA=GPIO{}, SCL=GPIO{})",
            pins::I2C_SDA_GPIO,
            pins::I2C_SCL_GPIO
        );
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        match I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8.downgrade(),
            peripherals.pins.gpio9.downgrade(),
            &i2c_config,
        ) {
            Ok(i2c) => match Ssd1306Display::new(i2c) {
                Ok(panel) => Box::new(panel),
                Err(e) => {
                    warn!("display init failed ({}), continuing without panel", e);
                    Box::new(NullDisplay)
                }
            },
            Err(e) => {
                warn!("display bus init failed ({}), continuing without panel", e);
                Box::new(NullDisplay)
            }
        }
    };
    #[cfg(not(target_os = "espidf"))]
    let mut display: Box<dyn DisplayPort> = Box::new(NullDisplay);

    let mut sink = LogEventSink::new();

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AquariumService::new(config.clone());
    app.start(&mut sink);

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    // Simulated tick accumulators for non-espidf targets, where no
    // hardware timers run.
    #[cfg(not(target_os = "espidf"))]
    let (mut sim_status_acc, mut sim_trigger_acc) = (0u64, 0u64);

    loop {
        // One short sleep per pass: yields to the RTOS idle task on
        // hardware, and paces the simulated clock on the host.
        std::thread::sleep(std::time::Duration::from_millis(LOOP_PACE_MS));

        #[cfg(not(target_os = "espidf"))]
        {
            sim_status_acc += LOOP_PACE_MS;
            sim_trigger_acc += LOOP_PACE_MS;
            if sim_trigger_acc >= u64::from(config.ranging_period_ms) {
                sim_trigger_acc = 0;
                events::raise_trigger_tick();
            }
            if sim_status_acc >= u64::from(config.status_period_ms) {
                sim_status_acc = 0;
                events::raise_status_tick();
            }
        }

        // Drain the event cells in fixed priority order.  Each check is
        // non-blocking; echo pairs are always consumed before the next
        // trigger request can start a new ranging cycle.
        if let Some(phase) = events::take_feeder_alarm() {
            app.on_feeder_alarm(phase, &mut hw, &mut sink);
        }

        if let Some(edge) = events::take_food_edge() {
            app.on_food_edge(edge, &mut hw, &mut sink);
        }

        if events::take_status_tick() {
            app.on_status_tick(&mut hw, display.as_mut(), &mut sink);
        }

        if events::take_trigger_tick() {
            app.on_trigger_tick(&mut hw);
        }

        while let Some((edge, timestamp_us)) = events::take_echo_edge() {
            app.on_echo_edge(edge, timestamp_us, &mut sink);
        }

        if events::take_echo_timeout() {
            app.on_echo_timeout();
        }

        if events::take_vibration() {
            app.on_vibration();
        }

        if events::take_buzzer_off() {
            app.on_buzzer_off(&mut hw);
        }
    }
}
