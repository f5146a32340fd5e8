//! Application core: pure domain logic, zero I/O.
//!
//! Boot sequencing, the deferred button handler, countdown expiry and
//! the periodic status report.  All interaction with the chip happens
//! through **port traits** defined in [`ports`], keeping this layer
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
