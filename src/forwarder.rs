//! Frame forwarder.
//!
//! Serializes metric events into multipart messages and pushes them to
//! the broker over a ZeroMQ PUSH socket. The socket is connected once at
//! startup and reused for the process lifetime.
//!
//! Forwarding is best-effort and fire-and-forget: no acknowledgement is
//! awaited and a failed send is never retried — the caller logs it and
//! moves on to the next event.

use bytes::Bytes;
use thiserror::Error;
use zeromq::{PushSocket, Socket, SocketSend, ZmqMessage};

use crate::protocol::MetricEvent;

/// Errors that can occur in the forwarding layer.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Broker socket could not be created or connected (startup, fatal).
    #[error("failed to connect to broker at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: zeromq::ZmqError,
    },

    /// Push of one message failed (steady state, recoverable).
    #[error("transport send failed: {0}")]
    Send(#[from] zeromq::ZmqError),
}

/// Push-socket front to the metrics broker.
pub struct Forwarder {
    socket: PushSocket,
    endpoint: String,
}

impl Forwarder {
    /// Create a PUSH socket and connect it to `endpoint`
    /// (e.g. `tcp://127.0.0.1:2999`).
    ///
    /// # Errors
    /// Returns [`ForwardError::Connect`] if the broker endpoint cannot be
    /// reached; callers treat this as fatal at startup.
    pub async fn connect(endpoint: &str) -> Result<Self, ForwardError> {
        let mut socket = PushSocket::new();
        socket
            .connect(endpoint)
            .await
            .map_err(|source| ForwardError::Connect {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        tracing::info!(endpoint, "connected to broker");
        Ok(Self {
            socket,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Push one event to the broker.
    ///
    /// Frames within the message are sent in strict sequence; a failure
    /// aborts this message only.
    pub async fn send(&mut self, event: &MetricEvent) -> Result<(), ForwardError> {
        self.socket.send(encode(event)).await?;
        tracing::debug!(
            kind = event.kind(),
            name = event.name(),
            frames = ?event.frames(),
            "event forwarded"
        );
        Ok(())
    }

    /// Broker endpoint this forwarder is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Best-effort close of the broker socket.
    pub async fn close(self) {
        self.socket.close().await;
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Serialize an event into its wire message: an empty leading delimiter
/// frame, then the kind tag and tokens as separate frames, each data
/// frame's payload NUL-terminated.
pub fn encode(event: &MetricEvent) -> ZmqMessage {
    // The delimiter frame is truly empty; only data frames carry the NUL.
    let mut message = ZmqMessage::from(Bytes::new());
    for frame in event.frames() {
        let mut data = Vec::with_capacity(frame.len() + 1);
        data.extend_from_slice(frame.as_bytes());
        data.push(0);
        message.push_back(data.into());
    }
    message
}
