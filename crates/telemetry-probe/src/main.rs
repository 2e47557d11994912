//! telemetry-probe: a terminal peer for the telemetry relay.
//!
//! ```text
//! telemetry-probe watch    --url ws://127.0.0.1:3000
//! telemetry-probe simulate --url ws://127.0.0.1:3000 --rate-hz 50 [--count 500]
//! ```
//!
//! `watch` prints one line per received frame to stdout.  `simulate` sends
//! synthetic 32-byte packets at a fixed rate.  Both stop on Ctrl+C.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use telemetry_core::{encode, BatteryRange};
use telemetry_probe::{describe_binary, describe_text, synthetic_packet};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "telemetry-probe",
    about = "Watch or feed a telemetry relay from the terminal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Connect as a consumer and print every frame the relay forwards.
    Watch {
        /// Relay WebSocket URL.
        #[arg(long, default_value = "ws://127.0.0.1:3000", env = "RELAY_URL")]
        url: String,

        /// Pack voltage shown as 0 %.
        #[arg(long, default_value_t = 5.0)]
        empty_volts: f32,

        /// Pack voltage shown as 100 %.
        #[arg(long, default_value_t = 6.6)]
        full_volts: f32,
    },
    /// Connect as a producer and send synthetic telemetry packets.
    Simulate {
        /// Relay WebSocket URL.
        #[arg(long, default_value = "ws://127.0.0.1:3000", env = "RELAY_URL")]
        url: String,

        /// Packets per second.
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=1000))]
        rate_hz: u32,

        /// Stop after this many packets.  Runs until Ctrl+C when absent.
        #[arg(long)]
        count: Option<u32>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Watch {
            url,
            empty_volts,
            full_volts,
        } => {
            let range = BatteryRange::new(empty_volts, full_volts)?;
            watch(&url, range).await
        }
        Command::Simulate {
            url,
            rate_hz,
            count,
        } => simulate(&url, rate_hz, count).await,
    }
}

async fn watch(url: &str, range: BatteryRange) -> anyhow::Result<()> {
    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!("watching {url}");

    let (_ws_tx, mut ws_rx) = ws.split();

    loop {
        let next = tokio::select! {
            next = ws_rx.next() => next,
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, stopping");
                return Ok(());
            }
        };

        match next {
            Some(Ok(Message::Binary(bytes))) => {
                println!("{}", describe_binary(&bytes, epoch_millis(), &range));
            }
            Some(Ok(Message::Text(text))) => {
                println!("{}", describe_text(&text, &range));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e).context("relay connection failed"),
            None => {
                info!("relay closed the connection");
                return Ok(());
            }
        }
    }
}

async fn simulate(url: &str, rate_hz: u32, count: Option<u32>) -> anyhow::Result<()> {
    let (mut ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!("simulating {rate_hz} Hz into {url}");

    let mut ticker = interval(Duration::from_secs(1) / rate_hz);
    // A stalled socket should lower the rate, not produce a burst afterwards.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let started = Instant::now();
    let mut sequence: u32 = 0;

    loop {
        if count.is_some_and(|limit| sequence >= limit) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, stopping");
                break;
            }
        }

        // The wire timestamp is a u32 millisecond clock; it wraps after ~49 days.
        let elapsed_ms = started.elapsed().as_millis() as u32;
        let frame = encode(&synthetic_packet(sequence, elapsed_ms));
        ws.send(Message::Binary(frame.to_vec()))
            .await
            .context("failed to send telemetry frame")?;
        sequence = sequence.wrapping_add(1);
    }

    info!("sent {sequence} packets");
    if let Err(e) = ws.close(None).await {
        warn!("close handshake failed: {e}");
    }
    Ok(())
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_battery_defaults_match_default_range() {
        let cli = Cli::parse_from(["telemetry-probe", "watch", "--url", "ws://h:1"]);
        match cli.command {
            Command::Watch {
                url,
                empty_volts,
                full_volts,
            } => {
                assert_eq!(url, "ws://h:1");
                assert_eq!(
                    BatteryRange::new(empty_volts, full_volts).unwrap(),
                    BatteryRange::default()
                );
            }
            other => panic!("expected watch, got {other:?}"),
        }
    }

    #[test]
    fn test_watch_battery_range_override() {
        // Arrange: a 3S pack
        let cli = Cli::parse_from([
            "telemetry-probe",
            "watch",
            "--empty-volts",
            "9.0",
            "--full-volts",
            "12.6",
        ]);

        // Act
        let Command::Watch {
            empty_volts,
            full_volts,
            ..
        } = cli.command
        else {
            panic!("expected watch");
        };
        let range = BatteryRange::new(empty_volts, full_volts).unwrap();

        // Assert
        assert_eq!(range.percent(12.6), 100.0);
        assert_eq!(range.percent(9.0), 0.0);
    }

    #[test]
    fn test_watch_inverted_battery_range_is_rejected() {
        let cli = Cli::parse_from([
            "telemetry-probe",
            "watch",
            "--empty-volts",
            "6.6",
            "--full-volts",
            "5.0",
        ]);
        let Command::Watch {
            empty_volts,
            full_volts,
            ..
        } = cli.command
        else {
            panic!("expected watch");
        };
        assert!(BatteryRange::new(empty_volts, full_volts).is_err());
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::parse_from(["telemetry-probe", "simulate", "--url", "ws://h:1"]);
        match cli.command {
            Command::Simulate {
                url,
                rate_hz,
                count,
            } => {
                assert_eq!(url, "ws://h:1");
                assert_eq!(rate_hz, 50);
                assert_eq!(count, None);
            }
            other => panic!("expected simulate, got {other:?}"),
        }
    }

    #[test]
    fn test_simulate_count_override() {
        let cli = Cli::parse_from(["telemetry-probe", "simulate", "--url", "ws://h:1", "--count", "10"]);
        assert!(matches!(cli.command, Command::Simulate { count: Some(10), .. }));
    }

    #[test]
    fn test_simulate_zero_rate_is_rejected() {
        let result = Cli::try_parse_from(["telemetry-probe", "simulate", "--rate-hz", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["telemetry-probe"]).is_err());
    }
}
