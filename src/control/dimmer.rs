//! Ambient-light → lamp duty tier table.
//!
//! Stepped lookup, recomputed on every status tick from the smoothed LDR
//! reading.  Darker tank → more lamp.  No hysteresis: the smoothing window
//! upstream already suppresses flicker-rate oscillation.

/// Map a smoothed illuminance reading (ADC counts) to a duty fraction.
///
/// Boundaries are strict `<`: a reading of exactly 500 belongs to the
/// 0.80 tier, not 1.00.
pub fn duty_for_level(level: f32) -> f32 {
    if level < 500.0 {
        1.0
    } else if level < 600.0 {
        0.8
    } else if level < 800.0 {
        0.5
    } else if level < 1100.0 {
        0.3
    } else if level < 1600.0 {
        0.1
    } else {
        0.0
    }
}
