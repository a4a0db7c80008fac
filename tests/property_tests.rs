//! Property and fuzz-style tests for robustness of core data structures.
//!
//! Runs on host (x86_64) only — proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use aquamon::control::smoothing::MovingAverage;
use aquamon::sensors::distance::{EchoOutcome, RangeCycle, UltrasonicRanger};
use proptest::prelude::*;

// ── Smoothing filter: mean of the last min(N+k, N) samples ────

proptest! {
    /// For any sample sequence, the reported average equals the arithmetic
    /// mean of the last `min(pushed, capacity)` values.
    #[test]
    fn filter_average_matches_tail_mean(
        samples in proptest::collection::vec(-1000.0f32..1000.0, 1..=40),
    ) {
        const CAP: usize = 5;
        let mut filter = MovingAverage::<CAP>::new();
        let mut last_avg = 0.0;
        for &s in &samples {
            last_avg = filter.push(s);
        }

        let tail_len = samples.len().min(CAP);
        let tail = &samples[samples.len() - tail_len..];
        let expected: f32 = tail.iter().sum::<f32>() / tail_len as f32;

        // f32 summation order differs between filter and oracle; allow a
        // small relative tolerance.
        let tol = 1e-3 * (1.0 + expected.abs());
        prop_assert!(
            (last_avg - expected).abs() <= tol,
            "avg {} != mean-of-tail {}", last_avg, expected
        );
    }

    /// The fill count never exceeds capacity.
    #[test]
    fn filter_len_saturates(pushes in 0usize..200) {
        let mut filter = MovingAverage::<7>::new();
        for i in 0..pushes {
            filter.push(i as f32);
        }
        prop_assert_eq!(filter.len(), pushes.min(7));
    }
}

// ── Ranging cycle: never wedges, accepts only plausible results ──

#[derive(Debug, Clone)]
enum RangeOp {
    Trigger,
    Rise(u32),
    Fall(u32),
    Timeout,
}

fn arb_range_op() -> impl Strategy<Value = RangeOp> {
    prop_oneof![
        Just(RangeOp::Trigger),
        (0u32..=100_000u32).prop_map(RangeOp::Rise),
        (0u32..=100_000u32).prop_map(RangeOp::Fall),
        Just(RangeOp::Timeout),
    ]
}

proptest! {
    /// Arbitrary interleavings of triggers, edges and timeouts must never
    /// leave the cycle stuck: after a timeout the ranger always accepts a
    /// new trigger.
    #[test]
    fn ranging_never_wedges(
        ops in proptest::collection::vec(arb_range_op(), 1..=40),
    ) {
        let mut ranger = UltrasonicRanger::new();

        for op in &ops {
            match op {
                RangeOp::Trigger => {
                    if ranger.start_cycle() {
                        ranger.pulse_sent();
                    }
                }
                RangeOp::Rise(t) => ranger.on_echo_rise(*t),
                RangeOp::Fall(t) => { let _ = ranger.on_echo_fall(*t); }
                RangeOp::Timeout => { let _ = ranger.on_timeout(); }
            }
        }

        // Whatever happened, the watchdog path must restore Idle...
        ranger.on_timeout();
        prop_assert_eq!(ranger.cycle(), RangeCycle::Idle);
        // ...and a new measurement must start.
        prop_assert!(ranger.start_cycle());
    }

    /// Every accepted measurement lies strictly inside (0, 400) cm and
    /// discarded ones lie outside; either way the cycle closes.
    #[test]
    fn ranging_accepts_iff_plausible(rise in 0u32..=1_000_000, width in 0u32..=60_000) {
        let mut ranger = UltrasonicRanger::new();
        prop_assert!(ranger.start_cycle());
        ranger.pulse_sent();
        ranger.on_echo_rise(rise);

        let distance = width as f32 / 58.0;
        match ranger.on_echo_fall(rise.wrapping_add(width)) {
            EchoOutcome::Accepted { distance_cm, .. } => {
                prop_assert!(distance_cm > 0.0 && distance_cm < 400.0);
                prop_assert!((distance_cm - distance).abs() < 1e-3);
            }
            EchoOutcome::Discarded { distance_cm } => {
                prop_assert!(distance_cm <= 0.0 || distance_cm >= 400.0);
            }
            EchoOutcome::Ignored => prop_assert!(false, "fall in WaitingFall must resolve"),
        }
        prop_assert_eq!(ranger.cycle(), RangeCycle::Idle);
    }
}
