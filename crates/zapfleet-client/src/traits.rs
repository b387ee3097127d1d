//! Capability interface to the underlying messaging-protocol client.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::ClientError;

/// An authenticated connection to the messaging network.
///
/// The handle is not proven safe for concurrent use; callers serialize
/// sends per session.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Probe live connectivity against the network.
    async fn is_connected(&self) -> Result<bool, ClientError>;

    /// Send a plain text message. Returns the network message id.
    async fn send_text(&self, to: &str, body: &str) -> Result<String, ClientError>;

    /// Send an image from disk with an optional caption. Returns the
    /// network message id.
    async fn send_image(
        &self,
        to: &str,
        image: &Path,
        caption: Option<&str>,
    ) -> Result<String, ClientError>;
}

/// Constructs clients for named sessions.
///
/// `connect` drives the QR handshake: every time the network issues a new
/// code it is pushed on `qr_tx` as a `data:<mime>;base64,<payload>` string.
/// A cached session may restore without emitting any code at all. The
/// future resolves once the session is authenticated.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    /// Construct and authenticate the client for `session`.
    async fn connect(
        &self,
        session: &str,
        qr_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Arc<dyn MessagingClient>, ClientError>;
}
