//! Pre-programmed connector and client for deterministic tests — no
//! network, no real handshake.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, mpsc};

use crate::errors::ClientError;
use crate::traits::{ClientConnector, MessagingClient};

/// Scripted behavior for one authentication attempt.
pub enum MockHandshake {
    /// Resolve immediately without emitting a QR (cached session restore).
    Restored,
    /// Emit each payload in order, then wait for [`MockConnector::release`]
    /// before resolving (the "scan").
    QrThenConnect(Vec<String>),
    /// Fail client construction.
    Fail(String),
}

/// Connector that replays a [`MockHandshake`] and counts constructions.
pub struct MockConnector {
    handshake: MockHandshake,
    release: Notify,
    connects: AtomicUsize,
    client: Arc<MockClient>,
}

impl MockConnector {
    /// Connector replaying `handshake` for every session.
    pub fn new(handshake: MockHandshake) -> Self {
        Self {
            handshake,
            release: Notify::new(),
            connects: AtomicUsize::new(0),
            client: Arc::new(MockClient::new()),
        }
    }

    /// The client every successful handshake resolves to.
    pub fn client(&self) -> Arc<MockClient> {
        self.client.clone()
    }

    /// How many times `connect` was invoked.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Let a pending `QrThenConnect` handshake complete (the scan).
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ClientConnector for MockConnector {
    async fn connect(
        &self,
        _session: &str,
        qr_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Arc<dyn MessagingClient>, ClientError> {
        let _ = self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.handshake {
            MockHandshake::Restored => {
                self.client.set_connected(true);
                Ok(self.client.clone())
            }
            MockHandshake::Fail(reason) => Err(ClientError::ConnectFailure(reason.clone())),
            MockHandshake::QrThenConnect(payloads) => {
                for payload in payloads {
                    let _ = qr_tx.send(payload.clone());
                }
                self.release.notified().await;
                self.client.set_connected(true);
                Ok(self.client.clone())
            }
        }
    }
}

/// A message recorded by [`MockClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    /// Recipient identifier.
    pub to: String,
    /// `"text"` or `"image"`.
    pub kind: &'static str,
    /// Text body, or the image path for image sends.
    pub body: String,
    /// Image caption, when present.
    pub caption: Option<String>,
}

/// Client that records every send and can be scripted to fail for chosen
/// recipients or to fault its connectivity probe.
#[derive(Default)]
pub struct MockClient {
    connected: AtomicBool,
    probe_fault: AtomicBool,
    failing: RwLock<HashSet<String>>,
    sent: Mutex<Vec<SentMessage>>,
}

impl MockClient {
    /// Disconnected client with no scripted failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the connectivity flag.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make `is_connected` return an error.
    pub fn fail_probe(&self, fault: bool) {
        self.probe_fault.store(fault, Ordering::SeqCst);
    }

    /// Make sends to `recipient` fail.
    pub fn fail_for(&self, recipient: impl Into<String>) {
        let _ = self.failing.write().insert(recipient.into());
    }

    /// Everything sent so far, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    fn record(&self, message: SentMessage) -> Result<String, ClientError> {
        if self.failing.read().contains(&message.to) {
            return Err(ClientError::Send(format!(
                "rejected by network: {}",
                message.to
            )));
        }
        let mut sent = self.sent.lock();
        sent.push(message);
        Ok(format!("mock-{}", sent.len()))
    }
}

#[async_trait]
impl MessagingClient for MockClient {
    async fn is_connected(&self) -> Result<bool, ClientError> {
        if self.probe_fault.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectFailure("probe fault".into()));
        }
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<String, ClientError> {
        self.record(SentMessage {
            to: to.to_owned(),
            kind: "text",
            body: body.to_owned(),
            caption: None,
        })
    }

    async fn send_image(
        &self,
        to: &str,
        image: &Path,
        caption: Option<&str>,
    ) -> Result<String, ClientError> {
        self.record(SentMessage {
            to: to.to_owned(),
            kind: "image",
            body: image.display().to_string(),
            caption: caption.map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn restored_handshake_connects_without_qr() {
        let connector = MockConnector::new(MockHandshake::Restored);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = connector.connect("s1", tx).await.unwrap();
        assert!(client.is_connected().await.unwrap());
        assert!(rx.try_recv().is_err());
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn qr_handshake_emits_then_waits_for_release() {
        let connector = Arc::new(MockConnector::new(MockHandshake::QrThenConnect(vec![
            "data:image/png;base64,AAAA".into(),
        ])));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let task = {
            let connector = connector.clone();
            tokio::spawn(async move { connector.connect("s1", tx).await.map(|_| ()) })
        };

        assert_eq!(rx.recv().await.unwrap(), "data:image/png;base64,AAAA");
        connector.release();
        task.await.unwrap().unwrap();
        assert!(connector.client().is_connected().await.unwrap());
    }

    #[tokio::test]
    async fn failing_handshake_reports_construction_error() {
        let connector = MockConnector::new(MockHandshake::Fail("boot failed".into()));
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = connector.connect("s1", tx).await.err().unwrap();
        assert!(matches!(err, ClientError::ConnectFailure(_)));
    }

    #[tokio::test]
    async fn client_records_sends_in_order() {
        let client = MockClient::new();
        let _ = client.send_text("a@c.us", "hi").await.unwrap();
        let _ = client
            .send_image("b@c.us", Path::new("/tmp/p.png"), Some("cap"))
            .await
            .unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@c.us");
        assert_eq!(sent[0].kind, "text");
        assert_eq!(sent[1].kind, "image");
        assert_eq!(sent[1].caption.as_deref(), Some("cap"));
    }

    #[tokio::test]
    async fn scripted_recipient_failure() {
        let client = MockClient::new();
        client.fail_for("bad@c.us");
        assert!(client.send_text("bad@c.us", "hi").await.is_err());
        assert!(client.send_text("good@c.us", "hi").await.is_ok());
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn probe_fault_errors() {
        let client = MockClient::new();
        client.fail_probe(true);
        assert!(client.is_connected().await.is_err());
    }
}
