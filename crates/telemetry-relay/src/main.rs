//! Telemetry relay: entry point.
//!
//! Accepts WebSocket connections from producers (e.g. a flight controller
//! bridge) and dashboards, and fans every Text/Binary message out to every
//! other connected peer.
//!
//! # Usage
//!
//! ```text
//! telemetry-relay [OPTIONS]
//!
//! Options:
//!   --config <FILE>            TOML config file
//!   --port <PORT>              Listener port [default: 3000]
//!   --bind <IP>                Listener address [default: 0.0.0.0]
//!   --queue-capacity <N>       Per-peer send queue depth [default: 256]
//!   --quiet-telemetry          Do not log one line per telemetry frame
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then the `--config` file, then CLI flags / environment
//! variables.  CLI args take precedence over environment variables.
//!
//! | Variable               | Flag               |
//! |------------------------|--------------------|
//! | `PORT`                 | `--port`           |
//! | `RELAY_BIND`           | `--bind`           |
//! | `RELAY_QUEUE_CAPACITY` | `--queue-capacity` |
//! | `RELAY_CONFIG`         | `--config`         |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use telemetry_relay::domain::RelayConfig;
use telemetry_relay::infrastructure::{load_config, run_server};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Low-latency WebSocket relay for telemetry frames.
#[derive(Debug, Parser)]
#[command(
    name = "telemetry-relay",
    about = "Fan-out WebSocket relay for 32-byte telemetry frames and JSON text",
    version
)]
struct Cli {
    /// TOML file with `bind_addr`, `send_queue_capacity` and `log_telemetry`.
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// TCP port to listen on.  Overrides the port of the config file.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// IP address to bind.  `0.0.0.0` accepts LAN peers, `127.0.0.1` only
    /// local ones.
    #[arg(long, env = "RELAY_BIND")]
    bind: Option<IpAddr>,

    /// Frames queued per peer before frames to that peer are dropped.
    #[arg(long, env = "RELAY_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Suppress the per-frame telemetry log line.
    #[arg(long)]
    quiet_telemetry: bool,
}

impl Cli {
    /// Resolves the final [`RelayConfig`] from defaults, the optional config
    /// file, and the CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// resulting configuration is invalid (zero queue capacity).
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => RelayConfig::default(),
        };

        let ip = self.bind.unwrap_or_else(|| config.bind_addr.ip());
        let port = self.port.unwrap_or_else(|| config.bind_addr.port());
        config.bind_addr = SocketAddr::new(ip, port);

        if let Some(capacity) = self.queue_capacity {
            config.send_queue_capacity = capacity;
        }
        if self.quiet_telemetry {
            config.log_telemetry = false;
        }

        config.validate().context("invalid relay configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Initialise `tracing_subscriber` (`RUST_LOG`, falling back to `info`).
/// 2. Parse CLI arguments and resolve the [`RelayConfig`].
/// 3. Spawn a Ctrl+C handler that clears the shared `running` flag.
/// 4. Run the accept loop until the flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;

    info!(
        "telemetry relay starting: bind={}, queue={}, log_telemetry={}",
        config.bind_addr, config.send_queue_capacity, config.log_telemetry
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("telemetry relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Parsing tests only assert flags given on the command line, which win
    // over any PORT / RELAY_* variables set in the developer's shell.
    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["telemetry-relay"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    // Resolution tests build the Cli directly so the environment never leaks in.
    fn no_overrides() -> Cli {
        Cli {
            config: None,
            port: None,
            bind: None,
            queue_capacity: None,
            quiet_telemetry: false,
        }
    }

    #[test]
    fn test_cli_quiet_telemetry_defaults_to_off() {
        let cli = parse(&[]);
        assert!(!cli.quiet_telemetry);
    }

    #[test]
    fn test_cli_port_override() {
        let cli = parse(&["--port", "9999"]);
        assert_eq!(cli.port, Some(9999));
    }

    #[test]
    fn test_cli_bind_override() {
        let cli = parse(&["--bind", "127.0.0.1"]);
        assert_eq!(cli.bind, Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_cli_queue_capacity_and_quiet_flags() {
        let cli = parse(&["--queue-capacity", "8", "--quiet-telemetry"]);
        assert_eq!(cli.queue_capacity, Some(8));
        assert!(cli.quiet_telemetry);
    }

    #[test]
    fn test_cli_invalid_bind_is_rejected() {
        let result = Cli::try_parse_from(["telemetry-relay", "--bind", "not-an-ip"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_relay_config_without_overrides_is_default() {
        let config = no_overrides().into_relay_config().unwrap();
        assert_eq!(config, RelayConfig::default());
    }

    #[test]
    fn test_into_relay_config_applies_port_and_bind() {
        // Arrange
        let cli = Cli {
            port: Some(4100),
            bind: Some("127.0.0.1".parse().unwrap()),
            ..no_overrides()
        };

        // Act
        let config = cli.into_relay_config().unwrap();

        // Assert
        assert_eq!(config.bind_addr, "127.0.0.1:4100".parse().unwrap());
    }

    #[test]
    fn test_into_relay_config_port_alone_keeps_default_ip() {
        let cli = Cli {
            port: Some(8080),
            ..no_overrides()
        };
        let config = cli.into_relay_config().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn test_into_relay_config_quiet_telemetry_disables_logging() {
        let cli = Cli {
            quiet_telemetry: true,
            ..no_overrides()
        };
        assert!(!cli.into_relay_config().unwrap().log_telemetry);
    }

    #[test]
    fn test_into_relay_config_queue_capacity_override() {
        let cli = Cli {
            queue_capacity: Some(8),
            ..no_overrides()
        };
        assert_eq!(cli.into_relay_config().unwrap().send_queue_capacity, 8);
    }

    #[test]
    fn test_into_relay_config_zero_queue_capacity_returns_error() {
        let cli = Cli {
            queue_capacity: Some(0),
            ..no_overrides()
        };
        assert!(cli.into_relay_config().is_err());
    }

    #[test]
    fn test_into_relay_config_cli_port_overrides_file() {
        // Arrange: a config file that sets its own address
        let path = std::env::temp_dir().join(format!(
            "telemetry-relay-main-{}.toml",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "bind_addr = \"127.0.0.1:4000\"").unwrap();
        writeln!(file, "send_queue_capacity = 32").unwrap();
        drop(file);
        let cli = Cli {
            config: Some(path.clone()),
            port: Some(5000),
            ..no_overrides()
        };

        // Act
        let config = cli.into_relay_config().unwrap();
        std::fs::remove_file(&path).ok();

        // Assert: file supplies ip and capacity, CLI supplies port
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.send_queue_capacity, 32);
    }

    #[test]
    fn test_into_relay_config_missing_file_returns_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/relay.toml")),
            ..no_overrides()
        };
        assert!(cli.into_relay_config().is_err());
    }
}
