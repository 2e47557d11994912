//! JSON text-frame model.
//!
//! Producers that cannot emit the binary frame may send a UTF-8 JSON object
//! instead.  Every key is optional and unknown keys are ignored:
//!
//! ```json
//! {"pitch":1.5,"roll":-2.0,"yaw":180.0,"temperature":24.1,"humidity":48,"battery":6.3}
//! ```
//!
//! Known keys are coerced the way a browser dashboard would read them: a
//! numeric string is parsed, `true`/`false` become 1/0, and anything that is
//! not a number (`null`, `"up"`, arrays) reads as 0.  A bad value in one key
//! never hides the others.
//!
//! The relay never parses text frames; it forwards them untouched.  This type
//! is for consumers that want to render them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Telemetry carried in a JSON text frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryJson {
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub roll: Option<f32>,
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    /// Battery voltage in volts (the key is `battery` on the wire).
    #[serde(default, deserialize_with = "coerce_number", skip_serializing_if = "Option::is_none")]
    pub battery: Option<f32>,
}

impl TelemetryJson {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not valid JSON or not an
    /// object.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns `(pitch, roll, yaw)` only when all three are present.
    ///
    /// Orientation is only meaningful as a whole, so a partial triple is
    /// treated as absent.
    pub fn attitude(&self) -> Option<(f32, f32, f32)> {
        Some((self.pitch?, self.roll?, self.yaw?))
    }

    /// True if the object carried none of the known keys.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A present key always yields `Some`, whatever its value.
fn coerce_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(coerce(&value)))
}

fn coerce(value: &Value) -> f32 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if n.is_finite() {
        n as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_full_object() {
        let msg = TelemetryJson::from_text(
            r#"{"pitch":1,"roll":2,"yaw":3,"temperature":24.5,"humidity":40,"battery":6.2}"#,
        )
        .unwrap();
        assert_eq!(msg.attitude(), Some((1.0, 2.0, 3.0)));
        assert_eq!(msg.temperature, Some(24.5));
        assert_eq!(msg.humidity, Some(40.0));
        assert_eq!(msg.battery, Some(6.2));
    }

    #[test]
    fn test_from_text_missing_keys_are_none() {
        let msg = TelemetryJson::from_text(r#"{"temperature":19}"#).unwrap();
        assert_eq!(msg.temperature, Some(19.0));
        assert!(msg.pitch.is_none());
        assert!(msg.battery.is_none());
    }

    #[test]
    fn test_from_text_ignores_unknown_keys() {
        let msg = TelemetryJson::from_text(r#"{"altitude":120,"humidity":33}"#).unwrap();
        assert_eq!(msg.humidity, Some(33.0));
    }

    #[test]
    fn test_attitude_requires_all_three_axes() {
        let msg = TelemetryJson::from_text(r#"{"pitch":1,"roll":2}"#).unwrap();
        assert_eq!(msg.attitude(), None);
    }

    #[test]
    fn test_empty_object_is_empty() {
        let msg = TelemetryJson::from_text("{}").unwrap();
        assert!(msg.is_empty());
    }

    #[test]
    fn test_from_text_rejects_non_json() {
        assert!(TelemetryJson::from_text("hello").is_err());
    }

    #[test]
    fn test_from_text_rejects_non_object_json() {
        assert!(TelemetryJson::from_text("42").is_err());
        assert!(TelemetryJson::from_text(r#""pitch""#).is_err());
    }

    #[test]
    fn test_bad_value_reads_as_zero_and_keeps_other_keys() {
        // Arrange
        let text = r#"{"pitch":"up","roll":null,"yaw":3,"battery":6.1}"#;

        // Act
        let msg = TelemetryJson::from_text(text).unwrap();

        // Assert
        assert_eq!(msg.attitude(), Some((0.0, 0.0, 3.0)));
        assert_eq!(msg.battery, Some(6.1));
    }

    #[test]
    fn test_numeric_strings_and_booleans_are_coerced() {
        let msg =
            TelemetryJson::from_text(r#"{"temperature":" 21.5 ","humidity":true,"battery":"x"}"#)
                .unwrap();
        assert_eq!(msg.temperature, Some(21.5));
        assert_eq!(msg.humidity, Some(1.0));
        assert_eq!(msg.battery, Some(0.0));
    }

    #[test]
    fn test_serialize_omits_absent_keys() {
        let msg = TelemetryJson {
            yaw: Some(90.0),
            ..TelemetryJson::default()
        };
        assert_eq!(serde_json::to_string(&msg).unwrap(), r#"{"yaw":90.0}"#);
    }
}
