//! Feeder hatch: servo positioning math and the dispense cycle.
//!
//! ## Servo map
//!
//! Standard hobby-servo convention: a 20 ms PWM frame with the position
//! encoded in a 1–2 ms pulse.  The hatch linkage adds a fixed mechanical
//! offset (`fix`), so
//!
//! ```text
//! pulse_width_us = 1000 + (angle − fix) · 1000/93
//! duty           = pulse_width_us / 20000
//! ```
//!
//! Closed is 140°, open is 140° minus a 20° margin.
//!
//! ## Dispense cycle
//!
//! ```text
//!  Closed ──low-food edge──▶ Opening ──(status tick)──▶ Open
//!     ▲                          │                        │
//!     │                          └───── dwell alarm ──────┤
//!  return alarm                                           ▼
//!     └─────────────────────── Closing ◀──────────────────┘
//! ```
//!
//! Transitions are driven by the two one-shot alarms; only one is ever
//! outstanding, and further low-food edges are ignored until the cycle is
//! back at Closed.  The Opening→Open promotion happens on the next status
//! tick — there is no position feedback and servo travel completes well
//! inside one tick.

use crate::drivers::hw_init;
use crate::events::FeederAlarm;

/// Commanded hatch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederPosition {
    Open,
    Closed,
}

/// Where the hatch cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederState {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Command the cycle wants executed, paired with the alarm to arm next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeederAction {
    pub position: FeederPosition,
    pub arm: FeederAlarm,
}

// ── Servo math ────────────────────────────────────────────────

/// Servo PWM frame length (µs) — 50 Hz.
const FRAME_US: f32 = 20_000.0;
/// Degrees spanned per extra millisecond of pulse (datasheet-calibrated).
const DEG_PER_MS: f32 = 93.0;

/// Map a hatch angle (degrees) to a PWM duty fraction.
pub fn angle_to_duty(angle_deg: f32, fix_deg: f32) -> f32 {
    let pulse_width_us = 1000.0 + (angle_deg - fix_deg) * 1000.0 / DEG_PER_MS;
    pulse_width_us / FRAME_US
}

// ── Cycle state machine ───────────────────────────────────────

/// The dispense cycle.  Pure logic — the caller applies the returned
/// [`FeederAction`]s to the servo and the alarm timer.
pub struct FeederCycle {
    state: FeederState,
    alarm_pending: bool,
}

impl FeederCycle {
    pub fn new() -> Self {
        Self {
            state: FeederState::Closed,
            alarm_pending: false,
        }
    }

    /// A low-food rising edge was observed.  Starts a cycle only from
    /// rest; re-entrant edges while any alarm pends are ignored.
    pub fn on_low_food(&mut self) -> Option<FeederAction> {
        if self.state == FeederState::Closed && !self.alarm_pending {
            self.state = FeederState::Opening;
            self.alarm_pending = true;
            Some(FeederAction {
                position: FeederPosition::Open,
                arm: FeederAlarm::CloseHatch,
            })
        } else {
            None
        }
    }

    /// An alarm fired.  Phases that do not match the current state are
    /// stale and ignored.
    pub fn on_alarm(&mut self, phase: FeederAlarm) -> Option<FeederAction> {
        match (phase, self.state) {
            (FeederAlarm::CloseHatch, FeederState::Opening | FeederState::Open) => {
                self.state = FeederState::Closing;
                Some(FeederAction {
                    position: FeederPosition::Closed,
                    arm: FeederAlarm::Settled,
                })
            }
            (FeederAlarm::Settled, FeederState::Closing) => {
                self.state = FeederState::Closed;
                self.alarm_pending = false;
                None
            }
            _ => None,
        }
    }

    /// Status tick: promote Opening→Open once servo travel has completed.
    pub fn on_status_tick(&mut self) {
        if self.state == FeederState::Opening {
            self.state = FeederState::Open;
        }
    }

    pub fn state(&self) -> FeederState {
        self.state
    }

    pub fn is_dispensing(&self) -> bool {
        matches!(
            self.state,
            FeederState::Opening | FeederState::Open | FeederState::Closing
        )
    }
}

impl Default for FeederCycle {
    fn default() -> Self {
        Self::new()
    }
}

// ── Servo driver ──────────────────────────────────────────────

/// Applies hatch positions to the servo LEDC channel.
pub struct FeederServo {
    closed_angle_deg: f32,
    open_margin_deg: f32,
    fix_deg: f32,
    position: FeederPosition,
}

impl FeederServo {
    pub fn new(closed_angle_deg: f32, open_margin_deg: f32, fix_deg: f32) -> Self {
        Self {
            closed_angle_deg,
            open_margin_deg,
            fix_deg,
            position: FeederPosition::Closed,
        }
    }

    pub fn set_position(&mut self, position: FeederPosition) {
        let angle = match position {
            FeederPosition::Closed => self.closed_angle_deg,
            FeederPosition::Open => self.closed_angle_deg - self.open_margin_deg,
        };
        let duty = angle_to_duty(angle, self.fix_deg);
        hw_init::ledc_set_fraction(hw_init::LEDC_CH_SERVO, duty);
        self.position = position;
    }

    pub fn position(&self) -> FeederPosition {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_angle_maps_into_servo_pulse_window() {
        // 140° with fix 35 → 1000 + 105·1000/93 ≈ 2129 µs → duty ≈ 0.1065.
        let duty = angle_to_duty(140.0, 35.0);
        assert!((duty - 0.10645).abs() < 1e-4);
    }

    #[test]
    fn open_angle_maps_into_servo_pulse_window() {
        // 120° with fix 35 → 1000 + 85·1000/93 ≈ 1914 µs → duty ≈ 0.0957.
        let duty = angle_to_duty(120.0, 35.0);
        assert!((duty - 0.09570).abs() < 1e-4);
    }

    #[test]
    fn open_duty_below_closed_duty() {
        assert!(angle_to_duty(120.0, 35.0) < angle_to_duty(140.0, 35.0));
    }

    #[test]
    fn edge_from_rest_opens_and_arms_dwell() {
        let mut cycle = FeederCycle::new();
        let action = cycle.on_low_food().expect("cycle must start from rest");
        assert_eq!(action.position, FeederPosition::Open);
        assert_eq!(action.arm, FeederAlarm::CloseHatch);
        assert_eq!(cycle.state(), FeederState::Opening);
    }

    #[test]
    fn reentrant_edges_ignored_while_pending() {
        let mut cycle = FeederCycle::new();
        cycle.on_low_food().unwrap();
        assert_eq!(cycle.on_low_food(), None, "open still pending");

        cycle.on_alarm(FeederAlarm::CloseHatch).unwrap();
        assert_eq!(cycle.on_low_food(), None, "closing still pending");
    }

    #[test]
    fn full_cycle_exactly_one_open_one_close() {
        let mut cycle = FeederCycle::new();
        let mut opens = 0;
        let mut closes = 0;

        if let Some(a) = cycle.on_low_food() {
            assert_eq!(a.position, FeederPosition::Open);
            opens += 1;
        }
        cycle.on_status_tick();
        assert_eq!(cycle.state(), FeederState::Open);

        if let Some(a) = cycle.on_alarm(FeederAlarm::CloseHatch) {
            assert_eq!(a.position, FeederPosition::Closed);
            assert_eq!(a.arm, FeederAlarm::Settled);
            closes += 1;
        }
        assert_eq!(cycle.on_alarm(FeederAlarm::Settled), None);
        assert_eq!(cycle.state(), FeederState::Closed);

        assert_eq!((opens, closes), (1, 1));
    }

    #[test]
    fn cycle_rearms_after_settling() {
        let mut cycle = FeederCycle::new();
        cycle.on_low_food().unwrap();
        cycle.on_alarm(FeederAlarm::CloseHatch).unwrap();
        cycle.on_alarm(FeederAlarm::Settled);
        assert!(cycle.on_low_food().is_some(), "a new edge must start a fresh cycle");
    }

    #[test]
    fn stale_alarm_phases_ignored() {
        let mut cycle = FeederCycle::new();
        assert_eq!(cycle.on_alarm(FeederAlarm::CloseHatch), None);
        assert_eq!(cycle.on_alarm(FeederAlarm::Settled), None);
        assert_eq!(cycle.state(), FeederState::Closed);
    }

    #[test]
    fn dwell_alarm_closes_even_before_tick_promotion() {
        let mut cycle = FeederCycle::new();
        cycle.on_low_food().unwrap();
        // No status tick in between — still Opening.
        let action = cycle.on_alarm(FeederAlarm::CloseHatch).unwrap();
        assert_eq!(action.position, FeederPosition::Closed);
        assert_eq!(cycle.state(), FeederState::Closing);
    }
}
