//! Integration tests: event cells → AquariumService → actuator ports.

use aquamon::app::events::AppEvent;
use aquamon::app::ports::{
    ActuatorPort, AlarmPort, DisplayPort, EventSink, STATUS_LINES, SensorPort, StatusLine,
};
use aquamon::app::service::AquariumService;
use aquamon::config::SystemConfig;
use aquamon::drivers::feeder::{FeederPosition, FeederState};
use aquamon::events::{self, Edge, FeederAlarm};
use aquamon::sensors::SensorSnapshot;

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum ActCall {
    Feeder(FeederPosition),
    Heater(bool),
    Lamp(f32),
    Led(bool),
    Buzzer(bool),
    Trigger,
}

#[derive(Debug, Clone, PartialEq)]
enum ArmCall {
    Feeder(FeederAlarm, u32),
    BuzzerOff(u32),
    EchoWatchdog(u32),
}

struct MockHw {
    snapshot: SensorSnapshot,
    calls: Vec<ActCall>,
    armed: Vec<ArmCall>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            snapshot: SensorSnapshot {
                temp_raw: 0,
                temperature_c: 25.5,
                light_raw: 0,
                light_level: 2000.0,
                light_lux: 244.0,
            },
            calls: Vec::new(),
            armed: Vec::new(),
        }
    }

    fn count(&self, wanted: &ActCall) -> usize {
        self.calls.iter().filter(|c| *c == wanted).count()
    }
}

impl SensorPort for MockHw {
    fn read_all(&mut self) -> SensorSnapshot {
        self.snapshot
    }
}

impl ActuatorPort for MockHw {
    fn set_feeder(&mut self, position: FeederPosition) {
        self.calls.push(ActCall::Feeder(position));
    }
    fn set_heater(&mut self, on: bool) {
        self.calls.push(ActCall::Heater(on));
    }
    fn set_lamp_duty(&mut self, fraction: f32) {
        self.calls.push(ActCall::Lamp(fraction));
    }
    fn set_low_food_led(&mut self, on: bool) {
        self.calls.push(ActCall::Led(on));
    }
    fn set_buzzer(&mut self, on: bool) {
        self.calls.push(ActCall::Buzzer(on));
    }
    fn trigger_pulse(&mut self) {
        self.calls.push(ActCall::Trigger);
    }
}

impl AlarmPort for MockHw {
    fn arm_feeder_alarm(&mut self, phase: FeederAlarm, delay_ms: u32) {
        self.armed.push(ArmCall::Feeder(phase, delay_ms));
    }
    fn arm_buzzer_off(&mut self, delay_ms: u32) {
        self.armed.push(ArmCall::BuzzerOff(delay_ms));
    }
    fn arm_echo_watchdog(&mut self, delay_ms: u32) {
        self.armed.push(ArmCall::EchoWatchdog(delay_ms));
    }
}

struct PanelSpy {
    frames: Vec<[String; STATUS_LINES]>,
}

impl PanelSpy {
    fn new() -> Self {
        Self { frames: Vec::new() }
    }
}

impl DisplayPort for PanelSpy {
    fn render(&mut self, lines: &[StatusLine; STATUS_LINES]) {
        let mut frame: [String; STATUS_LINES] = Default::default();
        for (dst, src) in frame.iter_mut().zip(lines.iter()) {
            *dst = src.as_str().to_string();
        }
        self.frames.push(frame);
    }
}

struct RecordingSink {
    events: Vec<AppEvent>,
}

impl RecordingSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }

    fn statuses(&self) -> Vec<&aquamon::app::events::StatusReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

fn make_app() -> (AquariumService, MockHw, PanelSpy, RecordingSink) {
    let mut app = AquariumService::new(SystemConfig::default());
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, MockHw::new(), PanelSpy::new(), sink)
}

// ── Feeder cycle exactness ────────────────────────────────────

#[test]
fn low_food_edge_yields_exactly_one_open_then_one_close() {
    let (mut app, mut hw, _panel, mut sink) = make_app();

    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    // Noise: more rising edges while the cycle runs.
    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::CloseHatch, &mut hw, &mut sink);
    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::Settled, &mut hw, &mut sink);

    assert_eq!(hw.count(&ActCall::Feeder(FeederPosition::Open)), 1);
    assert_eq!(hw.count(&ActCall::Feeder(FeederPosition::Closed)), 1);
    assert_eq!(app.feeder_state(), FeederState::Closed);

    // Both alarms were armed with the dwell delay, one at a time.
    assert_eq!(
        hw.armed,
        vec![
            ArmCall::Feeder(FeederAlarm::CloseHatch, 3000),
            ArmCall::Feeder(FeederAlarm::Settled, 3000),
        ]
    );
}

#[test]
fn feeder_cycle_restarts_only_after_settling() {
    let (mut app, mut hw, _panel, mut sink) = make_app();

    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::CloseHatch, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::Settled, &mut hw, &mut sink);

    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    assert_eq!(
        hw.count(&ActCall::Feeder(FeederPosition::Open)),
        2,
        "a fresh edge after settling starts a second cycle"
    );
}

#[test]
fn feeder_transitions_are_reported() {
    let (mut app, mut hw, _panel, mut sink) = make_app();

    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::CloseHatch, &mut hw, &mut sink);
    app.on_feeder_alarm(FeederAlarm::Settled, &mut hw, &mut sink);

    let transitions: Vec<(FeederState, FeederState)> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::FeederChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (FeederState::Closed, FeederState::Opening),
            (FeederState::Opening, FeederState::Closing),
            (FeederState::Closing, FeederState::Closed),
        ]
    );
}

// ── Ranging end-to-end ────────────────────────────────────────

#[test]
fn echo_pair_end_to_end_folds_into_distance_window() {
    let (mut app, mut hw, mut panel, mut sink) = make_app();

    app.on_trigger_tick(&mut hw);
    assert_eq!(hw.count(&ActCall::Trigger), 1);
    assert!(hw.armed.contains(&ArmCall::EchoWatchdog(100)));

    app.on_echo_edge(Edge::Rising, 1000, &mut sink);
    app.on_echo_edge(Edge::Falling, 1350, &mut sink);

    // 350 µs / 58 ≈ 6.03 cm, first sample of the 5-wide window.
    assert!((app.distance_cm() - 6.03).abs() < 0.01);

    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    let statuses = sink.statuses();
    let last = statuses.last().unwrap();
    assert!((last.distance_cm - 6.03).abs() < 0.01);
}

#[test]
fn spurious_echo_does_not_perturb_running_average() {
    let (mut app, mut hw, _panel, mut sink) = make_app();

    // Two good samples: 10 cm and 20 cm.
    app.on_trigger_tick(&mut hw);
    app.on_echo_edge(Edge::Rising, 0, &mut sink);
    app.on_echo_edge(Edge::Falling, 580, &mut sink);
    app.on_trigger_tick(&mut hw);
    app.on_echo_edge(Edge::Rising, 10_000, &mut sink);
    app.on_echo_edge(Edge::Falling, 11_160, &mut sink);
    assert!((app.distance_cm() - 15.0).abs() < 0.01);

    // Spurious: ~517 cm, outside the (0, 400) window.
    app.on_trigger_tick(&mut hw);
    app.on_echo_edge(Edge::Rising, 100_000, &mut sink);
    app.on_echo_edge(Edge::Falling, 130_000, &mut sink);

    assert!((app.distance_cm() - 15.0).abs() < 0.01, "average unchanged");
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::RangeDiscarded { .. }))
    );

    // The cycle still completed: a new trigger must be honoured.
    hw.calls.clear();
    app.on_trigger_tick(&mut hw);
    assert_eq!(hw.count(&ActCall::Trigger), 1);
}

#[test]
fn lost_fall_edge_recovered_by_watchdog() {
    let (mut app, mut hw, _panel, mut sink) = make_app();

    app.on_trigger_tick(&mut hw);
    app.on_echo_edge(Edge::Rising, 5000, &mut sink);

    // No fall edge.  Without the watchdog the next triggers would all be
    // refused and ranging would wedge.
    hw.calls.clear();
    app.on_trigger_tick(&mut hw);
    assert_eq!(hw.count(&ActCall::Trigger), 0);

    app.on_echo_timeout();
    app.on_trigger_tick(&mut hw);
    assert_eq!(hw.count(&ActCall::Trigger), 1);
}

// ── Heater scenario ───────────────────────────────────────────

#[test]
fn heater_scenario_cold_then_dead_band_then_hot() {
    let (mut app, mut hw, mut panel, mut sink) = make_app();

    hw.snapshot.temperature_c = 24.0;
    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert_eq!(hw.count(&ActCall::Heater(true)), 1, "24.0 °C switches on");

    hw.snapshot.temperature_c = 25.5;
    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert_eq!(
        hw.calls.iter().filter(|c| matches!(c, ActCall::Heater(_))).count(),
        1,
        "25.5 °C is inside the dead band — no new relay command"
    );
    assert!(app.heater_on());

    hw.snapshot.temperature_c = 26.5;
    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert_eq!(hw.count(&ActCall::Heater(false)), 1, "26.5 °C switches off");
    assert!(!app.heater_on());
}

// ── Lamp tier boundary ────────────────────────────────────────

#[test]
fn lamp_tier_boundary_at_500_takes_lower_bucket() {
    let (mut app, mut hw, mut panel, mut sink) = make_app();

    hw.snapshot.light_level = 500.0;
    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert!(
        hw.calls
            .iter()
            .any(|c| matches!(c, ActCall::Lamp(f) if (*f - 0.8).abs() < 1e-6)),
        "exactly 500 belongs to the 80% tier"
    );
}

// ── Vibration + buzzer ────────────────────────────────────────

#[test]
fn vibration_chirps_buzzer_for_one_tick() {
    let (mut app, mut hw, mut panel, mut sink) = make_app();

    app.on_vibration();
    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert_eq!(hw.count(&ActCall::Buzzer(true)), 1);
    assert!(hw.armed.contains(&ArmCall::BuzzerOff(500)));
    assert!(sink.statuses().last().unwrap().vibration);

    app.on_buzzer_off(&mut hw);
    assert_eq!(hw.count(&ActCall::Buzzer(false)), 1);

    app.on_status_tick(&mut hw, &mut panel, &mut sink);
    assert!(!sink.statuses().last().unwrap().vibration);
    assert_eq!(hw.count(&ActCall::Buzzer(true)), 1, "no second chirp");
}

// ── Display contents ──────────────────────────────────────────

#[test]
fn panel_shows_five_fixed_format_lines() {
    let (mut app, mut hw, mut panel, mut sink) = make_app();

    hw.snapshot.temperature_c = 25.1;
    hw.snapshot.light_lux = 84.2;
    app.on_food_edge(Edge::Rising, &mut hw, &mut sink);
    app.on_status_tick(&mut hw, &mut panel, &mut sink);

    let frame = panel.frames.last().unwrap();
    assert_eq!(frame[0], "Temp: 25.1 C");
    assert_eq!(frame[1], "Light: 84.2 lx");
    assert_eq!(frame[2], "Dist: 0.0 cm");
    assert_eq!(frame[3], "IR: 1");
    assert_eq!(frame[4], "Vib: 0");
}

// ── Event cell wiring (bus → loop dispatch) ───────────────────

#[test]
fn event_cells_drive_the_dispatch_path() {
    // Exercises the same drain pattern main() uses, against the real
    // process-wide cells.  Runs in this test binary's process, where no
    // other test touches the cells.
    events::reset_for_test();
    let (mut app, mut hw, _panel, mut sink) = make_app();

    events::raise_trigger_tick();
    if events::take_trigger_tick() {
        app.on_trigger_tick(&mut hw);
    }

    events::record_echo_edge(Edge::Rising, 2000);
    events::record_echo_edge(Edge::Falling, 2580);
    while let Some((edge, t_us)) = events::take_echo_edge() {
        app.on_echo_edge(edge, t_us, &mut sink);
    }

    assert!((app.distance_cm() - 10.0).abs() < 0.01);
    assert_eq!(hw.count(&ActCall::Trigger), 1);
}
