//! One peer's live session, as seen by the rest of the relay.
//!
//! A [`Connection`] is a cheap, cloneable handle.  It owns:
//!
//! - a random [`ConnectionId`] (the registry key; no cross-session identity),
//! - the remote address label used in log lines,
//! - the sending half of a bounded per-connection queue,
//! - an explicit `Open → Closed` state.
//!
//! The receiving half of the queue is drained by the session's writer task,
//! which is what gives each recipient FIFO delivery in submission order.
//!
//! # Lifecycle
//!
//! ```text
//!   Open ──close()──► Closed
//! ```
//!
//! [`Connection::close`] returns `true` to exactly one caller.  The session
//! task only removes the connection from the registry when it wins that
//! transition, so a close racing with a transport error never removes twice.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::domain::Frame;

/// Identity of one transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first UUID group is plenty to tell sessions apart in logs.
        let full = self.0.simple().to_string();
        f.write_str(&full[..8])
    }
}

/// Lifecycle state of a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Registered and accepting frames.
    Open,
    /// Closed by the peer, by a transport error, or by shutdown.
    Closed,
}

/// Why a frame could not be queued for a recipient.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SendError {
    /// The recipient's queue is at capacity (slow or stalled peer).
    #[error("send queue full")]
    QueueFull,
    /// The recipient has closed or its writer task has exited.
    #[error("connection closed")]
    Closed,
}

/// Anything the broadcast engine can deliver a frame to.
///
/// `send` must not wait on the network: it only enqueues.
#[cfg_attr(test, mockall::automock)]
pub trait Recipient: Send + Sync {
    /// Registry key of this recipient.
    fn id(&self) -> ConnectionId;

    /// Remote address label, for log lines only.
    fn remote(&self) -> Arc<str>;

    /// Queues `frame` for transmission, preserving its binary/text tag.
    ///
    /// # Errors
    ///
    /// Returns [`SendError`] if the frame cannot be queued.
    fn send(&self, frame: Frame) -> Result<(), SendError>;
}

/// Cloneable handle to one peer's session.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

#[derive(Debug)]
struct ConnectionInner {
    id: ConnectionId,
    remote: Arc<str>,
    queue: mpsc::Sender<Frame>,
    open: AtomicBool,
}

impl Connection {
    /// Creates an open connection and the receiving end of its send queue.
    ///
    /// `queue_capacity` is clamped to at least 1.
    pub fn new(remote: impl Into<Arc<str>>, queue_capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let conn = Self {
            inner: Arc::new(ConnectionInner {
                id: ConnectionId::new(),
                remote: remote.into(),
                queue: tx,
                open: AtomicBool::new(true),
            }),
        };
        (conn, rx)
    }

    /// Registry key.
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        if self.inner.open.load(Ordering::Acquire) {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    /// Moves the connection to `Closed`.
    ///
    /// Returns `true` only for the call that performed the transition; every
    /// later call returns `false`.
    pub fn close(&self) -> bool {
        self.inner.open.swap(false, Ordering::AcqRel)
    }

    /// Queues a frame without waiting.
    ///
    /// # Errors
    ///
    /// - [`SendError::Closed`] if the connection is closed or its writer is gone.
    /// - [`SendError::QueueFull`] if the queue is at capacity.
    pub fn send(&self, frame: Frame) -> Result<(), SendError> {
        if self.state() == ConnectionState::Closed {
            return Err(SendError::Closed);
        }
        self.inner.queue.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }
}

impl Recipient for Connection {
    fn id(&self) -> ConnectionId {
        Connection::id(self)
    }

    fn remote(&self) -> Arc<str> {
        Arc::clone(&self.inner.remote)
    }

    fn send(&self, frame: Frame) -> Result<(), SendError> {
        Connection::send(self, frame)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_is_open() {
        let (conn, _rx) = Connection::new("127.0.0.1:5000", 4);
        assert_eq!(conn.state(), ConnectionState::Open);
        assert_eq!(&*conn.remote(), "127.0.0.1:5000");
    }

    #[test]
    fn test_ids_are_unique() {
        let (a, _rx_a) = Connection::new("a", 1);
        let (b, _rx_b) = Connection::new("b", 1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_clone_shares_identity_and_state() {
        let (conn, _rx) = Connection::new("a", 1);
        let copy = conn.clone();
        assert_eq!(conn.id(), copy.id());
        conn.close();
        assert_eq!(copy.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_close_returns_true_exactly_once() {
        let (conn, _rx) = Connection::new("a", 1);
        assert!(conn.close());
        assert!(!conn.close());
        assert!(!conn.clone().close());
    }

    #[test]
    fn test_send_preserves_fifo_order() {
        // Arrange
        let (conn, mut rx) = Connection::new("a", 8);

        // Act
        conn.send(Frame::text("one")).unwrap();
        conn.send(Frame::binary(vec![2u8])).unwrap();
        conn.send(Frame::text("three")).unwrap();

        // Assert
        assert_eq!(rx.try_recv().unwrap(), Frame::text("one"));
        assert_eq!(rx.try_recv().unwrap(), Frame::binary(vec![2u8]));
        assert_eq!(rx.try_recv().unwrap(), Frame::text("three"));
    }

    #[test]
    fn test_send_on_full_queue_reports_queue_full() {
        let (conn, _rx) = Connection::new("a", 1);
        conn.send(Frame::text("fills the queue")).unwrap();
        assert_eq!(conn.send(Frame::text("overflow")), Err(SendError::QueueFull));
    }

    #[test]
    fn test_send_after_close_reports_closed() {
        let (conn, _rx) = Connection::new("a", 4);
        conn.close();
        assert_eq!(conn.send(Frame::text("late")), Err(SendError::Closed));
    }

    #[test]
    fn test_send_after_writer_dropped_reports_closed() {
        let (conn, rx) = Connection::new("a", 4);
        drop(rx);
        assert_eq!(conn.send(Frame::text("nobody")), Err(SendError::Closed));
    }

    #[test]
    fn test_zero_capacity_is_clamped_to_one() {
        let (conn, _rx) = Connection::new("a", 0);
        assert!(conn.send(Frame::text("fits")).is_ok());
    }

    #[test]
    fn test_connection_id_display_is_short() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string().len(), 8);
    }

    #[tokio::test]
    async fn test_queued_frame_is_received_by_writer_side() {
        let (conn, mut rx) = Connection::new("a", 2);
        let sender = conn.clone();
        tokio::spawn(async move {
            sender.send(Frame::binary(vec![9u8; 32])).unwrap();
        });
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame, Frame::binary(vec![9u8; 32]));
    }
}
