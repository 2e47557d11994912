//! Application layer for telemetry-relay.
//!
//! Everything here is transport-agnostic: a [`Connection`] is a queue plus a
//! state flag, the [`RelayRegistry`] is a set of queues, and the
//! [`BroadcastEngine`] decides which queues a frame goes to.  The WebSocket
//! plumbing that feeds and drains these queues lives in `infrastructure`.

pub mod broadcast;
pub mod connection;
pub mod registry;

pub use broadcast::{BroadcastEngine, LoggingObserver, RouteReport, TelemetryObserver};
pub use connection::{Connection, ConnectionId, ConnectionState, Recipient, SendError};
pub use registry::{RelayRegistry, SharedRecipient};
