//! HC-SR04 ultrasonic ranging cycle.
//!
//! The sensor is kicked by a ~10 µs trigger pulse and answers with an echo
//! pulse whose width encodes the round-trip time of flight.  The GPIO ISR
//! timestamps both echo edges; this state machine, driven from the main
//! loop, turns the timestamp pair into centimetres.
//!
//! ```text
//!   Idle ──trigger tick──▶ Triggered ──pulse sent──▶ WaitingRise
//!     ▲                                                   │
//!     │                                             rise edge (t0)
//!     │                                                   ▼
//!     └──fall edge (t1): d = (t1−t0)/58 ────────────  WaitingFall
//!     └──watchdog timeout (fall edge lost) ──────────────┘
//! ```
//!
//! A new trigger is only issued from Idle, so a slow echo can never
//! overlap the next measurement and corrupt the timestamp pair.  Results
//! outside the sensor's plausible window are dropped without touching the
//! smoothing window, but the cycle still returns to Idle.

use log::debug;

use crate::control::smoothing::MovingAverage;

/// Echo pulse width → distance: 58 µs per cm round trip at ~20 °C.
const US_PER_CM: f32 = 58.0;
/// Plausibility gate (cm), exclusive on both ends.  The HC-SR04 is only
/// rated to 4 m; anything past that is a stray or a missed edge.
const MIN_DISTANCE_CM: f32 = 0.0;
const MAX_DISTANCE_CM: f32 = 400.0;
/// Samples in the distance smoothing window.
const DISTANCE_WINDOW: usize = 5;

/// Phase of the current ranging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCycle {
    /// No measurement in flight; a trigger may be issued.
    Idle,
    /// Trigger accepted, pulse not yet on the pin.
    Triggered,
    /// Pulse sent; waiting for the echo rising edge.
    WaitingRise,
    /// Rise seen; waiting for the falling edge.
    WaitingFall,
}

/// What a falling echo edge produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EchoOutcome {
    /// In-window measurement folded into the average (the new average).
    Accepted { distance_cm: f32, average_cm: f32 },
    /// Out-of-window measurement, dropped; average untouched.
    Discarded { distance_cm: f32 },
    /// Edge did not fit the current phase (stray / duplicate) — ignored.
    Ignored,
}

pub struct UltrasonicRanger {
    cycle: RangeCycle,
    echo_start_us: u32,
    window: MovingAverage<DISTANCE_WINDOW>,
}

impl UltrasonicRanger {
    pub fn new() -> Self {
        Self {
            cycle: RangeCycle::Idle,
            echo_start_us: 0,
            window: MovingAverage::new(),
        }
    }

    /// Accept a periodic trigger request.  Returns `true` when the caller
    /// should drive the trigger pulse; `false` while a cycle is in flight.
    pub fn start_cycle(&mut self) -> bool {
        if self.cycle == RangeCycle::Idle {
            self.cycle = RangeCycle::Triggered;
            true
        } else {
            false
        }
    }

    /// The trigger pulse is on its way — arm for the echo rise.
    pub fn pulse_sent(&mut self) {
        if self.cycle == RangeCycle::Triggered {
            self.cycle = RangeCycle::WaitingRise;
        }
    }

    /// Feed the ISR-recorded rising-edge timestamp.
    pub fn on_echo_rise(&mut self, timestamp_us: u32) {
        if self.cycle == RangeCycle::WaitingRise {
            self.echo_start_us = timestamp_us;
            self.cycle = RangeCycle::WaitingFall;
        }
    }

    /// Feed the ISR-recorded falling-edge timestamp and close the cycle.
    pub fn on_echo_fall(&mut self, timestamp_us: u32) -> EchoOutcome {
        if self.cycle != RangeCycle::WaitingFall {
            return EchoOutcome::Ignored;
        }
        self.cycle = RangeCycle::Idle;

        let duration_us = timestamp_us.wrapping_sub(self.echo_start_us);
        let distance_cm = duration_us as f32 / US_PER_CM;

        if distance_cm > MIN_DISTANCE_CM && distance_cm < MAX_DISTANCE_CM {
            let average_cm = self.window.push(distance_cm);
            EchoOutcome::Accepted {
                distance_cm,
                average_cm,
            }
        } else {
            debug!("ranging: {:.1} cm outside plausible window, dropped", distance_cm);
            EchoOutcome::Discarded { distance_cm }
        }
    }

    /// Watchdog expiry.  Returns `true` when it actually recovered a stuck
    /// cycle; a timeout observed in Idle is stale and ignored (armed
    /// timers are never cancelled).
    pub fn on_timeout(&mut self) -> bool {
        if self.cycle == RangeCycle::Idle {
            return false;
        }
        debug!("ranging: watchdog expired in {:?}, cycle reset", self.cycle);
        self.cycle = RangeCycle::Idle;
        true
    }

    pub fn cycle(&self) -> RangeCycle {
        self.cycle
    }

    /// Smoothed distance over the accepted samples (0.0 before the first).
    pub fn average_cm(&self) -> f32 {
        self.window.average()
    }
}

impl Default for UltrasonicRanger {
    fn default() -> Self {
        Self::new()
    }
}
