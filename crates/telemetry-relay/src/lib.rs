//! telemetry-relay library crate.
//!
//! This crate provides a WebSocket relay that takes every frame one peer
//! sends and forwards it, unchanged, to every other connected peer.  Sensor
//! boards push 32-byte binary telemetry frames; dashboards receive them.
//!
//! # Architecture
//!
//! ```text
//! Producer ──► [telemetry-relay] ──► Dashboard A
//!                      │
//!                      └──────────► Dashboard B
//!
//! [telemetry-relay]
//!   ├── domain/           Pure types: Frame, MessageClass, RelayConfig
//!   ├── application/      Connection, RelayRegistry, BroadcastEngine
//!   └── infrastructure/
//!         ├── ws_server/  Accept loop (tokio-tungstenite)
//!         ├── session/    Per-connection reader and writer tasks
//!         └── config_file/ Optional TOML config
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `telemetry-core`; it uses Tokio
//!   only for the non-blocking per-connection queue.
//! - `infrastructure` owns sockets, the WebSocket handshake, and file reads.

/// Domain layer: frames, classification, configuration.
pub mod domain;

/// Application layer: connection state, registry, and fan-out.
pub mod application;

/// Infrastructure layer: WebSocket server and config file loading.
pub mod infrastructure;
