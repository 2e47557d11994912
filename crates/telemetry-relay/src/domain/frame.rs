//! Frames and their classification.
//!
//! A [`Frame`] is one WebSocket data message, kept in a form that can be
//! cloned cheaply for every recipient of a broadcast (the payload lives
//! behind an `Arc`, so fan-out to N peers never copies the bytes N times).
//!
//! # Classification order
//!
//! ```text
//! binary && len == 32  →  Telemetry
//! text                 →  Text
//! binary && len != 32  →  OtherBinary
//! ```

use std::fmt;
use std::sync::Arc;

use telemetry_core::TELEMETRY_FRAME_LEN;

/// One message received from, or queued for, a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A binary WebSocket message.
    Binary(Arc<[u8]>),
    /// A UTF-8 text WebSocket message.
    Text(Arc<str>),
}

impl Frame {
    /// Builds a binary frame, taking ownership of the buffer.
    pub fn binary(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Builds a text frame.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Self::Text(text.into())
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
        }
    }

    /// True when the payload is zero bytes long.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how the broadcast engine should treat this frame.
    pub fn class(&self) -> MessageClass {
        match self {
            Self::Binary(bytes) if bytes.len() == TELEMETRY_FRAME_LEN => MessageClass::Telemetry,
            Self::Text(_) => MessageClass::Text,
            Self::Binary(_) => MessageClass::OtherBinary,
        }
    }
}

/// Routing class of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// A 32-byte binary telemetry frame.
    Telemetry,
    /// A text frame (conventionally JSON), forwarded opaquely.
    Text,
    /// Any binary frame that is not 32 bytes, forwarded opaquely.
    OtherBinary,
}

impl MessageClass {
    /// Short label for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::Text => "text",
            Self::OtherBinary => "other-binary",
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
