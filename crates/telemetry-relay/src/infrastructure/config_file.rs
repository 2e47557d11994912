//! Loading [`RelayConfig`] from a TOML file.
//!
//! ```toml
//! # relay.toml
//! bind_addr = "0.0.0.0:3000"
//! send_queue_capacity = 256
//! log_telemetry = true
//! ```
//!
//! Every key is optional; absent keys keep their defaults.

use std::path::Path;

use crate::domain::config::{ConfigError, RelayConfig};

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, and the errors of
/// [`RelayConfig::from_toml_str`] for invalid content.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RelayConfig::from_toml_str(&text)
}
