//! WebSocket server: the connection acceptor.
//!
//! [`RelayServer`] is the composition root.  It owns the listener and builds
//! the [`RelayRegistry`] and [`BroadcastEngine`] that every session shares.
//!
//! # Scalability
//!
//! Each peer runs in its own Tokio task.  The accept loop never awaits a
//! session: it accepts a stream and spawns a task for it before accepting the
//! next one, so a slow handshake never delays other peers.
//!
//! # Shutdown
//!
//! The loop polls a shared `AtomicBool` every 200 ms (see `main.rs`, where a
//! Ctrl+C handler clears it).

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{error, info};

use crate::application::{BroadcastEngine, LoggingObserver, RelayRegistry};
use crate::domain::RelayConfig;
use crate::infrastructure::session::{handle_session, SessionContext};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A bound relay, ready to serve.
pub struct RelayServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: Arc<RelayRegistry>,
    ctx: Arc<SessionContext>,
}

impl RelayServer {
    /// Validates `config`, binds the listener, and wires up a fresh registry
    /// and broadcast engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the listener
    /// cannot be bound (port in use, no permission).  Both are fatal.
    pub async fn bind(config: RelayConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid relay configuration")?;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind WebSocket listener on {}", config.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("failed to read bound listener address")?;

        let registry = Arc::new(RelayRegistry::new());
        let mut engine = BroadcastEngine::new(Arc::clone(&registry));
        if config.log_telemetry {
            engine = engine.with_observer(Arc::new(LoggingObserver));
        }

        let ctx = Arc::new(SessionContext {
            engine: Arc::new(engine),
            send_queue_capacity: config.send_queue_capacity,
        });

        Ok(Self {
            listener,
            local_addr,
            registry,
            ctx,
        })
    }

    /// The address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The registry shared by every session of this server.
    pub fn registry(&self) -> Arc<RelayRegistry> {
        Arc::clone(&self.registry)
    }

    /// Runs the accept loop until `running` is cleared.
    ///
    /// Transient accept errors (e.g. file-descriptor exhaustion) are logged
    /// and the loop keeps going.
    pub async fn serve(self, running: Arc<AtomicBool>) -> anyhow::Result<()> {
        info!("WebSocket relay listening on ws://{}", self.local_addr);

        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            match timeout(ACCEPT_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer_addr))) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        handle_session(stream, peer_addr, ctx).await;
                    });
                }
                Ok(Err(e)) => {
                    error!("accept error: {e}");
                }
                Err(_) => {
                    // No connection within the poll interval; re-check the flag.
                }
            }
        }

        Ok(())
    }
}

/// Binds and serves in one call.  Used by `main.rs`.
///
/// # Errors
///
/// Returns an error if [`RelayServer::bind`] fails.
pub async fn run_server(config: RelayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    RelayServer::bind(config).await?.serve(running).await
}
