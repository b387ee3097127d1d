//! Orchestration errors.

use thiserror::Error;
use zapfleet_client::QrDecodeError;

use crate::roster::RosterError;

/// Errors surfaced by session orchestration and bulk dispatch.
///
/// Per-contact send failures are not errors at this level; they are
/// recorded in the dispatch report and the batch continues.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A QR payload did not match the `data:<mime>;base64,<payload>` shape.
    #[error("{0}")]
    QrDecode(#[from] QrDecodeError),

    /// No session is registered under this name.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The underlying client could not be constructed.
    #[error("client construction failed for session {session}: {reason}")]
    ClientConstruction {
        /// Session the construction was attempted for.
        session: String,
        /// Why the client capability refused to come up.
        reason: String,
    },

    /// The session exists but holds no client handle yet.
    #[error("session {0} has no client handle")]
    ClientMissing(String),

    /// The contact roster could not be read.
    #[error("{0}")]
    Roster(#[from] RosterError),

    /// The handshake task died without publishing an outcome.
    #[error("handshake for session {0} ended unexpectedly")]
    HandshakeAborted(String),
}
