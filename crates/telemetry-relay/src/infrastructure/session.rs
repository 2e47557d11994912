//! Per-connection session: handshake, registration, reader, writer, cleanup.
//!
//! Each accepted TCP stream runs through [`handle_session`] on its own Tokio
//! task:
//!
//! 1. Disable Nagle's algorithm so small frames leave immediately.
//! 2. Complete the WebSocket handshake.
//! 3. Create the [`Connection`] and add it to the registry.
//! 4. Run two loops concurrently:
//!    - **Reader**: every Text/Binary message goes to
//!      [`BroadcastEngine::route`].
//!    - **Writer**: drains the connection's queue onto the socket, one
//!      message at a time, in FIFO order.
//! 5. When either loop ends, close the connection and remove it from the
//!    registry (exactly once, gated on [`Connection::close`]).
//!
//! The reader never waits on any other peer's socket: routing only enqueues.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, info, warn};

use crate::application::{BroadcastEngine, Connection, ConnectionId, Recipient};
use crate::domain::Frame;

/// Shared state every session needs.  Built once by the server.
pub struct SessionContext {
    pub engine: Arc<BroadcastEngine>,
    pub send_queue_capacity: usize,
}

/// Entry point for each per-session task.  Logs the outcome.
pub async fn handle_session(stream: TcpStream, peer_addr: SocketAddr, ctx: Arc<SessionContext>) {
    match run_session(stream, peer_addr, &ctx).await {
        Ok(()) => info!("client disconnected: {peer_addr}"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

async fn run_session(
    stream: TcpStream,
    peer_addr: SocketAddr,
    ctx: &SessionContext,
) -> anyhow::Result<()> {
    configure_low_latency(&stream, peer_addr);

    // tungstenite never negotiates permessage-deflate, so frames go out
    // uncompressed without any extra configuration.
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let (conn, queue) = Connection::new(peer_addr.to_string(), ctx.send_queue_capacity);
    let id = conn.id();
    let registry = ctx.engine.registry();
    registry.add(Arc::new(conn.clone()));
    info!(
        "client connected: {peer_addr} as {id} ({} open)",
        registry.len()
    );

    let (ws_tx, ws_rx) = ws_stream.split();
    let mut writer = tokio::spawn(write_frames(ws_tx, queue, id, conn.remote()));

    let result = tokio::select! {
        outcome = read_frames(ws_rx, id, &ctx.engine) => outcome,
        outcome = &mut writer => match outcome {
            Ok(written) => written,
            Err(e) => Err(anyhow::anyhow!("writer task failed: {e}")),
        },
    };

    if conn.close() {
        registry.remove(id);
    }
    writer.abort();
    debug!("session {id}: removed ({} open)", registry.len());

    result.with_context(|| format!("session {id}"))
}

/// Best-effort TCP_NODELAY.  A transport that refuses it still works.
fn configure_low_latency(stream: &TcpStream, peer_addr: SocketAddr) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("could not set TCP_NODELAY for {peer_addr}: {e}");
    }
}

/// Reads messages until the peer closes or the transport fails.
///
/// Returns `Ok(())` on an orderly close and `Err` on a transport error.  A
/// protocol violation (typically a peer that vanished without a close
/// handshake) is logged at `warn` and ends the session like a close.
async fn read_frames<S>(mut ws_rx: S, id: ConnectionId, engine: &BroadcastEngine) -> anyhow::Result<()>
where
    S: Stream<Item = Result<WsMessage, WsError>> + Unpin,
{
    while let Some(next) = ws_rx.next().await {
        let msg = match next {
            Ok(msg) => msg,
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                debug!("session {id}: closed");
                return Ok(());
            }
            Err(WsError::Protocol(e)) => {
                warn!("session {id}: protocol error, closing: {e}");
                return Ok(());
            }
            Err(e) => return Err(e).context("read failed"),
        };

        match into_frame(msg) {
            Some(frame) => {
                engine.route(id, frame);
            }
            None => {
                // Close frames end the loop via the next poll returning None;
                // Ping/Pong are answered by tungstenite itself.
                debug!("session {id}: control frame");
            }
        }
    }
    Ok(())
}

/// Drains the connection's queue onto the socket.
///
/// A write failure is logged at `warn` and returned, so the session ends
/// with an error rather than as an ordinary disconnect.
async fn write_frames<S>(
    mut ws_tx: S,
    mut queue: mpsc::Receiver<Frame>,
    id: ConnectionId,
    remote: Arc<str>,
) -> anyhow::Result<()>
where
    S: Sink<WsMessage, Error = WsError> + Unpin,
{
    while let Some(frame) = queue.recv().await {
        // `send` flushes after every message: no batching on our side.
        match ws_tx.send(into_ws_message(frame)).await {
            Ok(()) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                debug!("session {id}: peer closed before write");
                return Ok(());
            }
            Err(e) => {
                warn!("write error to {id} ({remote}): {e}");
                return Err(e).context("write failed");
            }
        }
    }
    if let Err(e) = ws_tx.close().await {
        debug!("session {id}: close failed: {e}");
    }
    Ok(())
}

/// Maps a tungstenite message to a relay frame.  Control frames map to `None`.
fn into_frame(msg: WsMessage) -> Option<Frame> {
    match msg {
        WsMessage::Text(text) => Some(Frame::text(text)),
        WsMessage::Binary(bytes) => Some(Frame::binary(bytes)),
        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Close(_) | WsMessage::Frame(_) => None,
    }
}

/// Maps a relay frame back to a tungstenite message with the same tag.
fn into_ws_message(frame: Frame) -> WsMessage {
    match frame {
        Frame::Binary(bytes) => WsMessage::Binary(bytes.to_vec()),
        Frame::Text(text) => WsMessage::Text(text.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
