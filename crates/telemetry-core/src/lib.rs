//! # telemetry-core
//!
//! Shared library for the telemetry relay containing the binary packet codec,
//! the JSON text-frame model, and the battery-voltage mapping used by
//! dashboard consumers.
//!
//! This crate is used by both the relay server and the probe client.
//! It has zero dependencies on async runtimes, sockets, or OS APIs.
//!
//! # Architecture overview
//!
//! Producers (sensor boards) push short telemetry frames over a WebSocket to
//! the relay, which fans every frame out to the other connected peers
//! (dashboards).  This crate defines what those frames look like:
//!
//! - **`protocol`** – The fixed 32-byte little-endian telemetry frame
//!   ([`TelemetryPacket`]) and the optional JSON text fallback
//!   ([`TelemetryJson`]).
//!
//! - **`domain`** – Presentation helpers with no I/O, such as converting a raw
//!   pack voltage into a charge percentage ([`BatteryRange`]).

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `telemetry_core::TelemetryPacket` instead of the full module path.
pub use domain::battery::{BatteryLevel, BatteryRange, InvalidBatteryRange};
pub use protocol::json::TelemetryJson;
pub use protocol::packet::{decode, encode, NotATelemetryFrame, TelemetryPacket, TELEMETRY_FRAME_LEN};
