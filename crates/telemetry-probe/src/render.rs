//! One-line rendering of received frames.

use telemetry_core::{decode, BatteryLevel, BatteryRange, TelemetryJson};

/// Describes a binary frame.
///
/// 32-byte frames are decoded and annotated with the battery charge; any
/// other length is reported by size only.
pub fn describe_binary(bytes: &[u8], now_ms: u64, range: &BatteryRange) -> String {
    match decode(bytes) {
        Ok(packet) => {
            let volts = packet.battery_voltage;
            format!(
                "{} | batt {:.0}% {}{}",
                packet.summary(now_ms),
                range.percent(volts),
                level_label(range.level(volts)),
                if range.is_critical(volts) { " CRITICAL" } else { "" },
            )
        }
        Err(_) => format!("other binary: {} bytes", bytes.len()),
    }
}

/// Describes a text frame.
///
/// JSON objects with at least one known key are rendered field by field;
/// anything else is echoed as plain text.
pub fn describe_text(text: &str, range: &BatteryRange) -> String {
    match TelemetryJson::from_text(text) {
        Ok(json) if !json.is_empty() => describe_json(&json, range),
        _ => format!("text: {text}"),
    }
}

fn describe_json(json: &TelemetryJson, range: &BatteryRange) -> String {
    let mut parts = Vec::new();
    if let Some((pitch, roll, yaw)) = json.attitude() {
        parts.push(format!("P:{pitch:.1} R:{roll:.1} Y:{yaw:.1}"));
    }
    if let Some(t) = json.temperature {
        parts.push(format!("T:{t:.1}C"));
    }
    if let Some(h) = json.humidity {
        parts.push(format!("H:{h:.1}%"));
    }
    if let Some(v) = json.battery {
        parts.push(format!(
            "V:{v:.2}V batt {:.0}% {}",
            range.percent(v),
            level_label(range.level(v))
        ));
    }
    if parts.is_empty() {
        // Only a partial attitude was present.
        return "json: (incomplete attitude)".to_string();
    }
    format!("json | {}", parts.join(" | "))
}

fn level_label(level: BatteryLevel) -> &'static str {
    match level {
        BatteryLevel::High => "high",
        BatteryLevel::Medium => "medium",
        BatteryLevel::Low => "low",
    }
}
