//! Binary codec for the fixed-size telemetry frame.
//!
//! Wire format:
//! ```text
//! [sequence:4][source_timestamp_ms:4][pitch:4][roll:4][yaw:4]
//! [temperature:4][humidity:4][battery_voltage:4]
//! ```
//! Total frame size: 32 bytes. All fields are little-endian; the six
//! measurements are IEEE-754 single-precision floats.
//!
//! Any payload that is not exactly 32 bytes long is not a telemetry frame.
//! That is a classification, not a failure: the relay forwards such payloads
//! opaquely as "other binary".

use thiserror::Error;

/// Exact length of a binary telemetry frame on the wire.
pub const TELEMETRY_FRAME_LEN: usize = 32;

const SEQUENCE_OFFSET: usize = 0;
const TIMESTAMP_OFFSET: usize = 4;
const PITCH_OFFSET: usize = 8;
const ROLL_OFFSET: usize = 12;
const YAW_OFFSET: usize = 16;
const TEMPERATURE_OFFSET: usize = 20;
const HUMIDITY_OFFSET: usize = 24;
const BATTERY_OFFSET: usize = 28;

/// Decoded form of one 32-byte telemetry frame.
///
/// Every field is a raw reinterpretation of the wire bytes.  No range checks
/// are applied: NaN, infinities and physically implausible values are valid
/// decode results.  Deciding what is "sane" is up to the consumer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPacket {
    /// Per-sender counter assigned by the producer.  Not validated.
    pub sequence: u32,
    /// Producer's local clock at capture time, in milliseconds.  The epoch is
    /// whatever the producer uses (typically milliseconds since boot).
    pub source_timestamp_ms: u32,
    /// Pitch in degrees.
    pub pitch: f32,
    /// Roll in degrees.
    pub roll: f32,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Ambient temperature in °C.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Raw cell/pack voltage in volts.
    pub battery_voltage: f32,
}

/// Returned by [`decode`] when the payload length is not [`TELEMETRY_FRAME_LEN`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("not a telemetry frame: expected {TELEMETRY_FRAME_LEN} bytes, got {len}")]
pub struct NotATelemetryFrame {
    /// Length of the payload that was inspected.
    pub len: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes a telemetry frame.
///
/// Exactly 32 bytes are required.  Field values never cause a failure.
///
/// # Errors
///
/// Returns [`NotATelemetryFrame`] if `bytes.len() != 32`.
///
/// # Examples
///
/// ```rust
/// use telemetry_core::protocol::packet::{decode, encode, TelemetryPacket};
///
/// let packet = TelemetryPacket {
///     sequence: 7,
///     source_timestamp_ms: 1_000,
///     pitch: 1.0,
///     roll: 2.0,
///     yaw: 3.0,
///     temperature: 21.5,
///     humidity: 40.0,
///     battery_voltage: 6.2,
/// };
/// let bytes = encode(&packet);
/// assert_eq!(decode(&bytes).unwrap(), packet);
/// assert!(decode(&bytes[..10]).is_err());
/// ```
pub fn decode(bytes: &[u8]) -> Result<TelemetryPacket, NotATelemetryFrame> {
    let frame: &[u8; TELEMETRY_FRAME_LEN] = bytes
        .try_into()
        .map_err(|_| NotATelemetryFrame { len: bytes.len() })?;

    Ok(TelemetryPacket {
        sequence: read_u32(frame, SEQUENCE_OFFSET),
        source_timestamp_ms: read_u32(frame, TIMESTAMP_OFFSET),
        pitch: read_f32(frame, PITCH_OFFSET),
        roll: read_f32(frame, ROLL_OFFSET),
        yaw: read_f32(frame, YAW_OFFSET),
        temperature: read_f32(frame, TEMPERATURE_OFFSET),
        humidity: read_f32(frame, HUMIDITY_OFFSET),
        battery_voltage: read_f32(frame, BATTERY_OFFSET),
    })
}

/// Encodes a [`TelemetryPacket`] into its 32-byte wire form.
///
/// This is the exact inverse of [`decode`]; floats are written bit-for-bit,
/// so NaN payloads survive a round trip.
pub fn encode(packet: &TelemetryPacket) -> [u8; TELEMETRY_FRAME_LEN] {
    let mut buf = [0u8; TELEMETRY_FRAME_LEN];
    write_u32(&mut buf, SEQUENCE_OFFSET, packet.sequence);
    write_u32(&mut buf, TIMESTAMP_OFFSET, packet.source_timestamp_ms);
    write_f32(&mut buf, PITCH_OFFSET, packet.pitch);
    write_f32(&mut buf, ROLL_OFFSET, packet.roll);
    write_f32(&mut buf, YAW_OFFSET, packet.yaw);
    write_f32(&mut buf, TEMPERATURE_OFFSET, packet.temperature);
    write_f32(&mut buf, HUMIDITY_OFFSET, packet.humidity);
    write_f32(&mut buf, BATTERY_OFFSET, packet.battery_voltage);
    buf
}

impl TelemetryPacket {
    /// Coarse one-way latency estimate: `now_ms - source_timestamp_ms`.
    ///
    /// The producer's clock and the local clock are not synchronised, so the
    /// number is only meaningful for spotting trends in operator logs.
    pub fn latency_estimate_ms(&self, now_ms: u64) -> i64 {
        (now_ms as i64).wrapping_sub(i64::from(self.source_timestamp_ms))
    }

    /// Renders the packet as a single operator log line.
    ///
    /// ```rust
    /// use telemetry_core::TelemetryPacket;
    ///
    /// let p = TelemetryPacket {
    ///     sequence: 1,
    ///     source_timestamp_ms: 1_000,
    ///     pitch: 12.5,
    ///     roll: -3.0,
    ///     yaw: 90.0,
    ///     temperature: 26.4,
    ///     humidity: 55.2,
    ///     battery_voltage: 6.1,
    /// };
    /// assert_eq!(
    ///     p.summary(1_250),
    ///     "T#1 | lat~250ms | P:12.5 R:-3.0 Y:90.0 | T:26.4C H:55.2% V:6.10V"
    /// );
    /// ```
    pub fn summary(&self, now_ms: u64) -> String {
        format!(
            "T#{} | lat~{}ms | P:{:.1} R:{:.1} Y:{:.1} | T:{:.1}C H:{:.1}% V:{:.2}V",
            self.sequence,
            self.latency_estimate_ms(now_ms),
            self.pitch,
            self.roll,
            self.yaw,
            self.temperature,
            self.humidity,
            self.battery_voltage,
        )
    }
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn read_u32(frame: &[u8; TELEMETRY_FRAME_LEN], offset: usize) -> u32 {
    u32::from_le_bytes([
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ])
}

fn read_f32(frame: &[u8; TELEMETRY_FRAME_LEN], offset: usize) -> f32 {
    f32::from_bits(read_u32(frame, offset))
}

fn write_u32(buf: &mut [u8; TELEMETRY_FRAME_LEN], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_f32(buf: &mut [u8; TELEMETRY_FRAME_LEN], offset: usize, value: f32) {
    write_u32(buf, offset, value.to_bits());
}

// ── Tests ─────────────────────────────────────────────────────────────────────
