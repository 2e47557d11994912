//! Synthetic telemetry for exercising a relay without hardware.
//!
//! Values follow slow sinusoids so a dashboard shows visible motion, and the
//! battery drains linearly from full to empty over roughly ten minutes at
//! 50 Hz.

use telemetry_core::{BatteryRange, TelemetryPacket};

const DRAIN_VOLTS_PER_PACKET: f32 = 0.000_05;

/// Builds packet number `sequence`, stamped `elapsed_ms` after the producer
/// started.
pub fn synthetic_packet(sequence: u32, elapsed_ms: u32) -> TelemetryPacket {
    let range = BatteryRange::default();
    let t = elapsed_ms as f32 / 1000.0;
    let drained = range.full_volts - sequence as f32 * DRAIN_VOLTS_PER_PACKET;

    TelemetryPacket {
        sequence,
        source_timestamp_ms: elapsed_ms,
        pitch: 15.0 * (t * 0.7).sin(),
        roll: 10.0 * (t * 1.1).cos(),
        yaw: (t * 20.0) % 360.0,
        temperature: 25.0 + 1.5 * (t * 0.05).sin(),
        humidity: 50.0 + 5.0 * (t * 0.03).cos(),
        battery_voltage: drained.max(range.empty_volts),
    }
}
