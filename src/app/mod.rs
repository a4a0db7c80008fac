//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the AquaMon system:
//! the feeder cycle, heater band, lamp tiers, and ranging pipeline,
//! dispatched from the event cells by the control loop.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
