//! One named messaging session.
//!
//! All mutation of a session's status, handshake signal, and client handle
//! goes through the [`SessionDriver`], which is owned exclusively by that
//! session's handshake task. Everyone else holds an [`Arc<Session>`] and
//! only reads.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard, watch};

use zapfleet_client::MessagingClient;
use zapfleet_core::SessionStatus;

use crate::handshake::{AuthSignal, HandshakeFault};

pub(crate) type SignalSlot = Option<Result<AuthSignal, HandshakeFault>>;

/// A named, independently authenticated messaging connection.
pub struct Session {
    name: String,
    status: watch::Receiver<SessionStatus>,
    signal: watch::Receiver<SignalSlot>,
    client: RwLock<Option<Arc<dyn MessagingClient>>>,
    send_gate: Mutex<()>,
}

impl Session {
    /// Create a session in `Pending` state together with the driver that
    /// owns its write side.
    pub(crate) fn new(name: impl Into<String>) -> (Arc<Self>, SessionDriver) {
        let (status_tx, status_rx) = watch::channel(SessionStatus::Pending);
        let (signal_tx, signal_rx) = watch::channel(None);
        let session = Arc::new(Self {
            name: name.into(),
            status: status_rx,
            signal: signal_rx,
            client: RwLock::new(None),
            send_gate: Mutex::new(()),
        });
        let driver = SessionDriver {
            session: session.clone(),
            status: status_tx,
            signal: signal_tx,
        };
        (session, driver)
    }

    /// Session name (the registry key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// The client capability, once the handshake has installed it.
    pub fn client(&self) -> Option<Arc<dyn MessagingClient>> {
        self.client.read().clone()
    }

    pub(crate) fn subscribe_signal(&self) -> watch::Receiver<SignalSlot> {
        self.signal.clone()
    }

    /// Serializes sends for this session: the client handle is not proven
    /// safe for concurrent use.
    pub(crate) async fn send_gate(&self) -> MutexGuard<'_, ()> {
        self.send_gate.lock().await
    }
}

/// Write side of a session, held by its handshake task.
pub(crate) struct SessionDriver {
    session: Arc<Session>,
    status: watch::Sender<SessionStatus>,
    signal: watch::Sender<SignalSlot>,
}

impl SessionDriver {
    pub(crate) fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        let _ = self.status.send_replace(status);
    }

    pub(crate) fn publish(&self, signal: Result<AuthSignal, HandshakeFault>) {
        let _ = self.signal.send_replace(Some(signal));
    }

    pub(crate) fn install_client(&self, client: Arc<dyn MessagingClient>) {
        *self.session.client.write() = Some(client);
    }
}
