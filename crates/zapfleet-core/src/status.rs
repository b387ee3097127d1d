//! Session connection lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle state of one named messaging session.
///
/// `Pending → AwaitingScan → Connected`, with `Failed` reachable from
/// either non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session created, underlying client not yet constructed.
    Pending,
    /// A QR code has been issued and is waiting to be scanned.
    AwaitingScan,
    /// Authenticated and ready to send.
    Connected,
    /// Handshake died (malformed QR payload or client construction error).
    Failed,
}

impl SessionStatus {
    /// Whether the handshake has run to completion (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Connected | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::AwaitingScan.is_terminal());
        assert!(SessionStatus::Connected.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SessionStatus::AwaitingScan).unwrap();
        assert_eq!(json, r#""awaiting_scan""#);
    }

    #[test]
    fn deserializes_snake_case() {
        let status: SessionStatus = serde_json::from_str(r#""connected""#).unwrap();
        assert_eq!(status, SessionStatus::Connected);
    }
}
