//! Integration tests for the telemetry-core codec.
//!
//! These tests exercise the public API the way the relay and the probe use
//! it: raw bytes in, classification or decoded packet out, and the
//! decode-then-encode law that lets the relay forward bytes verbatim.

use telemetry_core::{decode, encode, NotATelemetryFrame, TelemetryPacket, TELEMETRY_FRAME_LEN};

/// Builds the frame a producer would send, field by field, without going
/// through `encode`, so the test checks the layout independently.
fn hand_built_frame(seq: u32, ts: u32, floats: [f32; 6]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(TELEMETRY_FRAME_LEN);
    bytes.extend_from_slice(&seq.to_le_bytes());
    bytes.extend_from_slice(&ts.to_le_bytes());
    for value in floats {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

#[test]
fn test_hand_built_frame_decodes_to_expected_fields() {
    // Arrange
    let bytes = hand_built_frame(1, 1000, [12.5, -3.0, 90.0, 26.4, 55.2, 6.1]);

    // Act
    let packet = decode(&bytes).expect("32 bytes must decode");

    // Assert
    assert_eq!(
        packet,
        TelemetryPacket {
            sequence: 1,
            source_timestamp_ms: 1000,
            pitch: 12.5,
            roll: -3.0,
            yaw: 90.0,
            temperature: 26.4,
            humidity: 55.2,
            battery_voltage: 6.1,
        }
    );
}

#[test]
fn test_decode_then_encode_reproduces_arbitrary_bytes() {
    // Every 32-byte input is a valid frame, including ones whose float
    // fields are NaN with arbitrary payloads.  Walk a few byte patterns that
    // cover those cases.
    let patterns: [[u8; TELEMETRY_FRAME_LEN]; 4] = [
        [0x00; TELEMETRY_FRAME_LEN],
        [0xFF; TELEMETRY_FRAME_LEN],
        std::array::from_fn(|i| i as u8),
        std::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(0x7F)),
    ];

    for bytes in patterns {
        let packet = decode(&bytes).expect("32 bytes must decode");
        assert_eq!(encode(&packet), bytes, "round trip changed {bytes:02X?}");
    }
}

#[test]
fn test_ten_byte_payload_is_classified_not_decoded() {
    let result = decode(&[0xAB; 10]);
    assert_eq!(result, Err(NotATelemetryFrame { len: 10 }));
}

#[test]
fn test_sequence_wraps_without_special_handling() {
    let bytes = hand_built_frame(u32::MAX, u32::MAX, [0.0; 6]);
    let packet = decode(&bytes).unwrap();
    assert_eq!(packet.sequence, u32::MAX);
    assert_eq!(packet.source_timestamp_ms, u32::MAX);
}
