//! Pure control-law leaves: smoothing, hysteresis, and the lamp tier table.
//!
//! Nothing in here touches hardware — every function is deterministic and
//! unit-tested on the host.

pub mod dimmer;
pub mod hysteresis;
pub mod smoothing;
