//! BroadcastEngine: fan-out of one inbound frame to every other peer.
//!
//! # Routing policy
//!
//! | class          | condition              | forwarded as |
//! |----------------|------------------------|--------------|
//! | `Telemetry`    | binary, exactly 32 B   | binary       |
//! | `Text`         | text                   | text         |
//! | `OtherBinary`  | binary, any other size | binary       |
//!
//! Every class goes to every registered connection except the sender, with
//! the original payload untouched.  Telemetry frames are additionally decoded
//! for the diagnostic observer, but only after the fan-out has been
//! submitted, and the decode result never influences delivery.
//!
//! Delivery is fire-and-forget: a failure queuing to one recipient is logged
//! and counted, and the loop moves on to the next recipient.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use telemetry_core::{decode, TelemetryPacket};

use crate::application::connection::ConnectionId;
use crate::application::registry::RelayRegistry;
use crate::domain::{Frame, MessageClass};

/// Side channel for decoded telemetry.
///
/// Called once per telemetry frame, after the frame has been queued to every
/// recipient.  Implementations must not assume any particular clock relation
/// between `received_at_ms` and the packet's own timestamp.
#[cfg_attr(test, mockall::automock)]
pub trait TelemetryObserver: Send + Sync {
    fn on_telemetry(&self, sender: ConnectionId, packet: &TelemetryPacket, received_at_ms: u64);
}

/// Observer that writes one `info` line per telemetry frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl TelemetryObserver for LoggingObserver {
    fn on_telemetry(&self, sender: ConnectionId, packet: &TelemetryPacket, received_at_ms: u64) {
        info!(target: "telemetry", %sender, "{}", packet.summary(received_at_ms));
    }
}

/// Outcome of routing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteReport {
    pub class: MessageClass,
    /// Recipients the frame was queued to.
    pub delivered: usize,
    /// Recipients whose queue rejected the frame.
    pub failed: usize,
}

/// Routes frames from one connection to all others in the registry.
pub struct BroadcastEngine {
    registry: Arc<RelayRegistry>,
    observer: Option<Arc<dyn TelemetryObserver>>,
}

impl BroadcastEngine {
    /// Creates an engine with no diagnostic observer.
    pub fn new(registry: Arc<RelayRegistry>) -> Self {
        Self {
            registry,
            observer: None,
        }
    }

    /// Attaches a diagnostic observer for decoded telemetry.
    pub fn with_observer(mut self, observer: Arc<dyn TelemetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The registry this engine broadcasts to.
    pub fn registry(&self) -> &Arc<RelayRegistry> {
        &self.registry
    }

    /// Delivers `frame` from `sender` to every other registered connection.
    ///
    /// Never fails: per-recipient errors are absorbed into the report.
    pub fn route(&self, sender: ConnectionId, frame: Frame) -> RouteReport {
        let class = frame.class();
        let received_at_ms = epoch_millis();

        let mut report = RouteReport {
            class,
            delivered: 0,
            failed: 0,
        };

        self.registry.for_each_except(sender, |recipient| {
            match recipient.send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        "forward error ({class}) from {sender} to {} ({}): {e}",
                        recipient.id(),
                        recipient.remote()
                    );
                }
            }
        });

        debug!(
            "routed {} byte {class} frame from {sender}: delivered={} failed={}",
            frame.len(),
            report.delivered,
            report.failed
        );

        if class == MessageClass::Telemetry {
            self.observe(sender, &frame, received_at_ms);
        }

        report
    }

    fn observe(&self, sender: ConnectionId, frame: &Frame, received_at_ms: u64) {
        let Some(observer) = &self.observer else {
            return;
        };
        let Frame::Binary(bytes) = frame else {
            return;
        };
        match decode(bytes) {
            Ok(packet) => observer.on_telemetry(sender, &packet, received_at_ms),
            Err(e) => debug!("diagnostic decode skipped for frame from {sender}: {e}"),
        }
    }
}

/// Milliseconds since the UNIX epoch, or 0 if the clock is before it.
fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
