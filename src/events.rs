//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - GPIO ISRs (echo edges, food-level edges, vibration pulses)
//! - esp_timer callbacks (status tick, trigger tick, one-shot alarms)
//!
//! Events are consumed by the main control loop, which checks each cell
//! in fixed priority order once per iteration.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ GPIO ISR    │────▶│  Flag cells      │     │              │
//! │ Timer cb    │────▶│  (one atomic per │────▶│  Main Loop   │
//! │ Alarm cb    │────▶│   event type)    │     │  (consumer)  │
//! └─────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Unlike a queue, each cell is **coalescing**: a second write before the
//! loop consumes the first overwrites it, so only the latest state is ever
//! observed.  That is the correct semantic for level-type signals (food
//! edges, ticks) and is compensated on the echo path by the ranging
//! cycle's idle guard.  Every cell has exactly one writer (a single ISR or
//! timer context) and one reader (the loop), which clears it on consume —
//! no locks needed.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

// ── Shared edge type ──────────────────────────────────────────

/// Polarity of a GPIO edge as seen by an ISR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Which phase of the feeder hatch cycle an alarm announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeederAlarm {
    /// Dwell elapsed — close the hatch.
    CloseHatch,
    /// Return travel elapsed — the hatch is back at rest.
    Settled,
}

// ── Cells ─────────────────────────────────────────────────────
//
// Kept in statics so ISR callbacks (which cannot capture closures in
// ESP-IDF) can reach them.

const EDGE_NONE: u8 = 0;
const EDGE_RISING: u8 = 1;
const EDGE_FALLING: u8 = 2;

const ALARM_NONE: u8 = 0;
const ALARM_CLOSE: u8 = 1;
const ALARM_SETTLED: u8 = 2;

const ECHO_RISE_BIT: u8 = 0b01;
const ECHO_FALL_BIT: u8 = 0b10;

/// Feeder alarm phase (written by the feeder one-shot timer callback).
static FEEDER_ALARM: AtomicU8 = AtomicU8::new(ALARM_NONE);
/// Latest food-level sensor edge (written by the food GPIO ISR).
static FOOD_EDGE: AtomicU8 = AtomicU8::new(EDGE_NONE);
/// 500 ms status tick (written by the periodic status timer).
static STATUS_TICK: AtomicBool = AtomicBool::new(false);
/// 200 ms ranging trigger request (written by the periodic trigger timer).
static TRIGGER_TICK: AtomicBool = AtomicBool::new(false);
/// Pending echo edges (bitmask) and their ISR-recorded µs timestamps.
static ECHO_PENDING: AtomicU8 = AtomicU8::new(0);
static ECHO_RISE_US: AtomicU32 = AtomicU32::new(0);
static ECHO_FALL_US: AtomicU32 = AtomicU32::new(0);
/// Echo watchdog expiry (written by the watchdog one-shot timer).
static ECHO_TIMEOUT: AtomicBool = AtomicBool::new(false);
/// Vibration pulse seen (written by the vibration GPIO ISR).
static VIBRATION: AtomicBool = AtomicBool::new(false);
/// Buzzer chirp elapsed (written by the buzzer one-shot timer).
static BUZZER_OFF: AtomicBool = AtomicBool::new(false);

// ── Producer side (ISR / timer-callback safe) ─────────────────

/// Record a feeder alarm phase.  Coalesces: at most one phase is pending,
/// which the two-phase handoff already guarantees (one outstanding timer).
pub fn raise_feeder_alarm(phase: FeederAlarm) {
    let raw = match phase {
        FeederAlarm::CloseHatch => ALARM_CLOSE,
        FeederAlarm::Settled => ALARM_SETTLED,
    };
    FEEDER_ALARM.store(raw, Ordering::Release);
}

/// Record a food-level sensor edge.  Latest edge wins.
pub fn record_food_edge(edge: Edge) {
    let raw = match edge {
        Edge::Rising => EDGE_RISING,
        Edge::Falling => EDGE_FALLING,
    };
    FOOD_EDGE.store(raw, Ordering::Release);
}

/// Mark the periodic status tick.
pub fn raise_status_tick() {
    STATUS_TICK.store(true, Ordering::Release);
}

/// Mark the periodic ranging trigger request.
pub fn raise_trigger_tick() {
    TRIGGER_TICK.store(true, Ordering::Release);
}

/// Record an echo edge with its ISR-side timestamp (µs, wrapping u32).
///
/// Rise and fall pend independently so a short echo whose fall lands in
/// the same loop pass as its rise is not lost; a repeated edge of the same
/// polarity before consumption overwrites its timestamp (latest wins).
pub fn record_echo_edge(edge: Edge, timestamp_us: u32) {
    match edge {
        Edge::Rising => {
            ECHO_RISE_US.store(timestamp_us, Ordering::Relaxed);
            ECHO_PENDING.fetch_or(ECHO_RISE_BIT, Ordering::Release);
        }
        Edge::Falling => {
            ECHO_FALL_US.store(timestamp_us, Ordering::Relaxed);
            ECHO_PENDING.fetch_or(ECHO_FALL_BIT, Ordering::Release);
        }
    }
}

/// Mark the echo watchdog expiry.
pub fn raise_echo_timeout() {
    ECHO_TIMEOUT.store(true, Ordering::Release);
}

/// Mark a vibration pulse.
pub fn raise_vibration() {
    VIBRATION.store(true, Ordering::Release);
}

/// Mark the end of a buzzer chirp.
pub fn raise_buzzer_off() {
    BUZZER_OFF.store(true, Ordering::Release);
}

// ── Consumer side (main loop only) ────────────────────────────

/// Take the pending feeder alarm phase, clearing it.
pub fn take_feeder_alarm() -> Option<FeederAlarm> {
    match FEEDER_ALARM.swap(ALARM_NONE, Ordering::Acquire) {
        ALARM_CLOSE => Some(FeederAlarm::CloseHatch),
        ALARM_SETTLED => Some(FeederAlarm::Settled),
        _ => None,
    }
}

/// Take the pending food-level edge, clearing it.
pub fn take_food_edge() -> Option<Edge> {
    match FOOD_EDGE.swap(EDGE_NONE, Ordering::Acquire) {
        EDGE_RISING => Some(Edge::Rising),
        EDGE_FALLING => Some(Edge::Falling),
        _ => None,
    }
}

/// Take the status tick flag.
pub fn take_status_tick() -> bool {
    STATUS_TICK.swap(false, Ordering::Acquire)
}

/// Take the trigger tick flag.
pub fn take_trigger_tick() -> bool {
    TRIGGER_TICK.swap(false, Ordering::Acquire)
}

/// Take the next pending echo edge and its timestamp, rise before fall.
///
/// Call repeatedly until `None` to drain a rise/fall pair that arrived
/// within one loop pass.
pub fn take_echo_edge() -> Option<(Edge, u32)> {
    let pending = ECHO_PENDING.load(Ordering::Acquire);
    if pending & ECHO_RISE_BIT != 0 {
        ECHO_PENDING.fetch_and(!ECHO_RISE_BIT, Ordering::AcqRel);
        return Some((Edge::Rising, ECHO_RISE_US.load(Ordering::Relaxed)));
    }
    if pending & ECHO_FALL_BIT != 0 {
        ECHO_PENDING.fetch_and(!ECHO_FALL_BIT, Ordering::AcqRel);
        return Some((Edge::Falling, ECHO_FALL_US.load(Ordering::Relaxed)));
    }
    None
}

/// Take the echo watchdog flag.
pub fn take_echo_timeout() -> bool {
    ECHO_TIMEOUT.swap(false, Ordering::Acquire)
}

/// Take the vibration flag.
pub fn take_vibration() -> bool {
    VIBRATION.swap(false, Ordering::Acquire)
}

/// Take the buzzer-off flag.
pub fn take_buzzer_off() -> bool {
    BUZZER_OFF.swap(false, Ordering::Acquire)
}

/// Reset every cell.  Test support: the cells are process-wide statics,
/// so each test must start from a clean slate.
pub fn reset_for_test() {
    FEEDER_ALARM.store(ALARM_NONE, Ordering::SeqCst);
    FOOD_EDGE.store(EDGE_NONE, Ordering::SeqCst);
    STATUS_TICK.store(false, Ordering::SeqCst);
    TRIGGER_TICK.store(false, Ordering::SeqCst);
    ECHO_PENDING.store(0, Ordering::SeqCst);
    ECHO_TIMEOUT.store(false, Ordering::SeqCst);
    VIBRATION.store(false, Ordering::SeqCst);
    BUZZER_OFF.store(false, Ordering::SeqCst);
}
