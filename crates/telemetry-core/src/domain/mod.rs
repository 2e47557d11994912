//! Domain helpers for telemetry consumers.
//!
//! Nothing in here touches the network.  The relay itself never calls into
//! this module; it exists for the peers that render telemetry.

pub mod battery;

pub use battery::{BatteryLevel, BatteryRange, InvalidBatteryRange};
