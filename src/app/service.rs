//! Application service — the hexagonal core.
//!
//! [`AquariumService`] owns the feeder cycle, heater band, ranging state
//! machine and vibration latch.  The control loop in `main` drains the
//! event cells and calls one handler per cell; each handler finishes in
//! bounded time and all I/O flows through port traits injected at the
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │      AquariumService       │ ──▶ DisplayPort
//! ActuatorPort ◀──│  feeder · heater · ranger  │
//!    AlarmPort ◀──│  dimmer · vibration latch  │
//!                 └────────────────────────────┘
//! ```

use core::fmt::Write as _;

use log::info;

use crate::config::SystemConfig;
use crate::control::dimmer::duty_for_level;
use crate::control::hysteresis::HysteresisSwitch;
use crate::drivers::feeder::{FeederAction, FeederCycle, FeederState};
use crate::events::{Edge, FeederAlarm};
use crate::sensors::SensorSnapshot;
use crate::sensors::distance::{EchoOutcome, UltrasonicRanger};

use super::events::{AppEvent, StatusReport};
use super::ports::{
    ActuatorPort, AlarmPort, DisplayPort, EventSink, SensorPort, STATUS_LINES, StatusLine,
};

// ───────────────────────────────────────────────────────────────
// AquariumService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AquariumService {
    config: SystemConfig,
    feeder: FeederCycle,
    heater: HysteresisSwitch,
    ranger: UltrasonicRanger,
    /// Latest polled-sensor snapshot (updated each status tick).
    snapshot: SensorSnapshot,
    /// Smoothed distance from the last accepted echo (0.0 until then).
    distance_cm: f32,
    /// IR food-level state, latched from the food edges.
    food_low: bool,
    /// A vibration pulse arrived since the last status tick.
    vibration_latched: bool,
    tick_count: u64,
}

impl AquariumService {
    pub fn new(config: SystemConfig) -> Self {
        let heater = HysteresisSwitch::new(config.heater_on_below_c, config.heater_off_above_c);
        Self {
            config,
            feeder: FeederCycle::new(),
            heater,
            ranger: UltrasonicRanger::new(),
            snapshot: SensorSnapshot::default(),
            distance_cm: 0.0,
            food_low: false,
            vibration_latched: false,
            tick_count: 0,
        }
    }

    /// Announce startup through the sink.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!("AquariumService started");
    }

    // ── Event-cell handlers (one per Event Bus cell) ──────────

    /// Feeder one-shot alarm fired (dwell elapsed or hatch settled).
    pub fn on_feeder_alarm(
        &mut self,
        phase: FeederAlarm,
        hw: &mut (impl ActuatorPort + AlarmPort),
        sink: &mut impl EventSink,
    ) {
        let from = self.feeder.state();
        let action = self.feeder.on_alarm(phase);
        if let Some(action) = action {
            self.apply_feeder_action(action, hw);
        }
        self.emit_feeder_change(from, sink);
    }

    /// Food-level sensor edge: rising = hopper low, falling = refilled.
    pub fn on_food_edge(
        &mut self,
        edge: Edge,
        hw: &mut (impl ActuatorPort + AlarmPort),
        sink: &mut impl EventSink,
    ) {
        match edge {
            Edge::Rising => {
                self.food_low = true;
                hw.set_low_food_led(true);
                let from = self.feeder.state();
                if let Some(action) = self.feeder.on_low_food() {
                    info!("feeder: hopper low, dispensing");
                    self.apply_feeder_action(action, hw);
                    self.emit_feeder_change(from, sink);
                }
            }
            Edge::Falling => {
                self.food_low = false;
                hw.set_low_food_led(false);
            }
        }
    }

    /// Periodic status tick: poll sensors, run the heater band and lamp
    /// tier, evaluate the vibration latch, emit status, refresh the panel.
    ///
    /// `D: ?Sized` so the main loop can pass its boxed `dyn DisplayPort`.
    pub fn on_status_tick<D: DisplayPort + ?Sized>(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + AlarmPort),
        display: &mut D,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        self.feeder.on_status_tick();

        self.snapshot = hw.read_all();

        if let Some(on) = self.heater.update(self.snapshot.temperature_c) {
            hw.set_heater(on);
            sink.emit(&AppEvent::HeaterChanged {
                on,
                temperature_c: self.snapshot.temperature_c,
            });
        }

        hw.set_lamp_duty(duty_for_level(self.snapshot.light_level));

        // Vibration is reported for exactly one tick per detected pulse,
        // with a buzzer chirp cut off by the one-shot alarm.
        let vibration = self.vibration_latched;
        self.vibration_latched = false;
        if vibration {
            hw.set_buzzer(true);
            hw.arm_buzzer_off(self.config.buzzer_chirp_ms);
        }

        let report = self.build_status(vibration);
        sink.emit(&AppEvent::Status(report));
        display.render(&self.status_lines(&report));
    }

    /// Periodic ranging trigger request.  Honoured only when the previous
    /// cycle has completed; the watchdog covers a lost fall edge.
    pub fn on_trigger_tick(&mut self, hw: &mut (impl ActuatorPort + AlarmPort)) {
        if self.ranger.start_cycle() {
            hw.trigger_pulse();
            self.ranger.pulse_sent();
            hw.arm_echo_watchdog(self.config.echo_watchdog_ms);
        }
    }

    /// Echo edge with its ISR-recorded timestamp.
    pub fn on_echo_edge(&mut self, edge: Edge, timestamp_us: u32, sink: &mut impl EventSink) {
        match edge {
            Edge::Rising => self.ranger.on_echo_rise(timestamp_us),
            Edge::Falling => match self.ranger.on_echo_fall(timestamp_us) {
                EchoOutcome::Accepted { average_cm, .. } => {
                    self.distance_cm = average_cm;
                }
                EchoOutcome::Discarded { distance_cm } => {
                    sink.emit(&AppEvent::RangeDiscarded { distance_cm });
                }
                EchoOutcome::Ignored => {}
            },
        }
    }

    /// Echo watchdog expiry — recover a cycle whose fall edge was lost.
    pub fn on_echo_timeout(&mut self) {
        self.ranger.on_timeout();
    }

    /// Vibration pulse from the ISR — latched until the next status tick.
    pub fn on_vibration(&mut self) {
        self.vibration_latched = true;
    }

    /// Buzzer chirp elapsed.
    pub fn on_buzzer_off(&mut self, hw: &mut impl ActuatorPort) {
        hw.set_buzzer(false);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn feeder_state(&self) -> FeederState {
        self.feeder.state()
    }

    pub fn heater_on(&self) -> bool {
        self.heater.is_on()
    }

    pub fn distance_cm(&self) -> f32 {
        self.distance_cm
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_feeder_action(
        &mut self,
        action: FeederAction,
        hw: &mut (impl ActuatorPort + AlarmPort),
    ) {
        hw.set_feeder(action.position);
        hw.arm_feeder_alarm(action.arm, self.config.feeder_dwell_ms);
    }

    fn emit_feeder_change(&self, from: FeederState, sink: &mut impl EventSink) {
        let to = self.feeder.state();
        if from != to {
            sink.emit(&AppEvent::FeederChanged { from, to });
        }
    }

    fn build_status(&self, vibration: bool) -> StatusReport {
        StatusReport {
            temperature_c: self.snapshot.temperature_c,
            light_lux: self.snapshot.light_lux,
            distance_cm: self.distance_cm,
            food_low: self.food_low,
            vibration,
        }
    }

    /// Format the five fixed panel lines from a status report.
    fn status_lines(&self, report: &StatusReport) -> [StatusLine; STATUS_LINES] {
        let mut lines: [StatusLine; STATUS_LINES] = Default::default();
        let _ = write!(lines[0], "Temp: {:.1} C", report.temperature_c);
        let _ = write!(lines[1], "Light: {:.1} lx", report.light_lux);
        let _ = write!(lines[2], "Dist: {:.1} cm", report.distance_cm);
        let _ = write!(lines[3], "IR: {}", i32::from(report.food_low));
        let _ = write!(lines[4], "Vib: {}", i32::from(report.vibration));
        lines
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
