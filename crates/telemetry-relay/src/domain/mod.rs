//! Domain layer for telemetry-relay.
//!
//! Pure types with no dependency on sockets, runtimes, or the file system.
//!
//! - [`Frame`]: one message as it travels through the relay, tagged binary or text.
//! - [`MessageClass`]: how the broadcast engine treats a frame.
//! - [`RelayConfig`]: runtime settings.

pub mod config;
pub mod frame;

pub use config::{ConfigError, RelayConfig};
pub use frame::{Frame, MessageClass};
