//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for runtime settings.  It is
//! built from defaults, then optionally overlaid with a TOML file, then with
//! CLI flags / environment variables (see `main.rs`).
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! reads in here) lets tests construct a relay on an ephemeral port with one
//! struct literal.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Port used when neither the config file nor the CLI supplies one.
pub const DEFAULT_PORT: u16 = 3000;

/// Per-connection send queue depth used when none is configured.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 256;

/// Errors produced while building a [`RelayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A send queue must hold at least one frame.
    #[error("send_queue_capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// All runtime configuration for the relay.
///
/// # Example
///
/// ```rust
/// use telemetry_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Address and port the WebSocket listener binds to.
    pub bind_addr: SocketAddr,

    /// Maximum number of frames queued for one peer before further frames to
    /// that peer are dropped.  A slow dashboard loses frames; it never slows
    /// down the producer or the other dashboards.
    pub send_queue_capacity: usize,

    /// Log one line per telemetry frame (sequence, latency estimate, fields).
    pub log_telemetry: bool,
}

impl Default for RelayConfig {
    /// | Field               | Default        |
    /// |---------------------|----------------|
    /// | bind_addr           | `0.0.0.0:3000` |
    /// | send_queue_capacity | 256            |
    /// | log_telemetry       | `true`         |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            log_telemetry: true,
        }
    }
}

impl RelayConfig {
    /// Parses a TOML document.  Missing keys keep their defaults.
    ///
    /// ```toml
    /// bind_addr = "127.0.0.1:4000"
    /// send_queue_capacity = 64
    /// log_telemetry = false
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, and
    /// [`ConfigError::ZeroQueueCapacity`] if the queue capacity is zero.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks invariants that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroQueueCapacity`] if `send_queue_capacity` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}
