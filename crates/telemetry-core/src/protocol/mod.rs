//! Protocol module containing the binary telemetry codec and the JSON text-frame model.

pub mod json;
pub mod packet;

pub use json::TelemetryJson;
pub use packet::{decode, encode, NotATelemetryFrame, TelemetryPacket, TELEMETRY_FRAME_LEN};
