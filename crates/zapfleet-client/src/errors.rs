//! Client capability errors.

use thiserror::Error;

/// Errors surfaced by a messaging client capability.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client exists but is not authenticated yet.
    #[error("client is not connected")]
    NotConnected,

    /// The underlying client could not be constructed or authenticated.
    #[error("connect failure: {0}")]
    ConnectFailure(String),

    /// A message send was rejected by the network.
    #[error("send failed: {0}")]
    Send(String),

    /// Media could not be read or uploaded.
    #[error("media upload failed: {0}")]
    Upload(String),

    /// The recipient identifier was rejected by the network.
    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
}
