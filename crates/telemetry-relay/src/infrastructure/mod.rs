//! Infrastructure layer for telemetry-relay.
//!
//! # Responsibilities
//!
//! - Binding the TCP listener and running the accept loop
//! - Low-latency socket setup and the WebSocket handshake
//! - Per-session reader and writer tasks
//! - Reading the optional TOML config file
//!
//! # What does NOT belong here?
//!
//! - Routing decisions (that is the application layer)
//! - Frame classification (that is the domain layer)

pub mod config_file;
pub mod session;
pub mod ws_server;

pub use config_file::load_config;
pub use ws_server::{run_server, RelayServer};
