//! Fallback connector for builds with no messaging backend wired in.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::errors::ClientError;
use crate::traits::{ClientConnector, MessagingClient};

/// Connector used when no real messaging backend is configured. Every
/// session creation fails with a construction error, so callers can retry
/// once a backend is wired in.
pub struct StubConnector;

#[async_trait]
impl ClientConnector for StubConnector {
    async fn connect(
        &self,
        session: &str,
        _qr_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Arc<dyn MessagingClient>, ClientError> {
        warn!(session, "no messaging backend configured");
        Err(ClientError::ConnectFailure(
            "no messaging backend configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_refuses_to_connect() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = StubConnector.connect("s1", tx).await.err().unwrap();
        assert!(matches!(err, ClientError::ConnectFailure(_)));
    }
}
