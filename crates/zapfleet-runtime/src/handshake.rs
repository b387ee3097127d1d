//! QR handshake coordination.
//!
//! One task per session creation drives the connector's handshake: it
//! forwards each emitted QR payload (a handshake may re-issue codes when
//! one expires unscanned, or emit none at all for a cached restore),
//! installs the client on success, and publishes the outcome on the
//! session's signal channel so the creating request can await it without
//! being wired to any particular HTTP response.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use zapfleet_client::{ClientConnector, QrDecodeError, QrPayload};
use zapfleet_core::SessionStatus;

use crate::errors::RuntimeError;
use crate::session::{Session, SessionDriver};

/// First observable event of an authentication attempt.
#[derive(Clone, Debug)]
pub enum AuthSignal {
    /// A QR code is ready to be streamed back to the caller.
    QrReady(QrPayload),
    /// The session authenticated without needing a scan.
    Connected,
}

/// Why a handshake died. Kept `Clone` so it can ride a watch channel.
#[derive(Clone, Debug)]
pub(crate) enum HandshakeFault {
    QrDecode(QrDecodeError),
    Construction(String),
}

impl HandshakeFault {
    fn into_runtime(self, session: &str) -> RuntimeError {
        match self {
            Self::QrDecode(e) => RuntimeError::QrDecode(e),
            Self::Construction(reason) => RuntimeError::ClientConstruction {
                session: session.to_owned(),
                reason,
            },
        }
    }
}

/// Start the handshake task for a freshly created session.
pub(crate) fn spawn(
    driver: SessionDriver,
    connector: Arc<dyn ClientConnector>,
    sessions: Arc<DashMap<String, Arc<Session>>>,
) -> JoinHandle<()> {
    tokio::spawn(run(driver, connector, sessions))
}

async fn run(
    driver: SessionDriver,
    connector: Arc<dyn ClientConnector>,
    sessions: Arc<DashMap<String, Arc<Session>>>,
) {
    let name = driver.session().name().to_owned();
    let (qr_tx, mut qr_rx) = mpsc::unbounded_channel();
    let connect = connector.connect(&name, qr_tx);
    tokio::pin!(connect);
    let mut qr_open = true;

    loop {
        tokio::select! {
            result = &mut connect => {
                match result {
                    Ok(client) => {
                        driver.install_client(client);
                        driver.set_status(SessionStatus::Connected);
                        driver.publish(Ok(AuthSignal::Connected));
                        info!(session = %name, "session connected");
                    }
                    Err(e) => {
                        warn!(session = %name, error = %e, "client construction failed");
                        driver.set_status(SessionStatus::Failed);
                        // leave the name free so a later request can retry
                        let _ = sessions.remove(&name);
                        driver.publish(Err(HandshakeFault::Construction(e.to_string())));
                    }
                }
                return;
            }
            maybe_raw = qr_rx.recv(), if qr_open => {
                let Some(raw) = maybe_raw else {
                    qr_open = false;
                    continue;
                };
                match QrPayload::parse(&raw) {
                    Ok(qr) => {
                        debug!(session = %name, mime = %qr.mime, bytes = qr.bytes.len(), "qr code issued");
                        driver.set_status(SessionStatus::AwaitingScan);
                        driver.publish(Ok(AuthSignal::QrReady(qr)));
                    }
                    Err(e) => {
                        warn!(session = %name, error = %e, "dropping handshake");
                        driver.set_status(SessionStatus::Failed);
                        driver.publish(Err(HandshakeFault::QrDecode(e)));
                        // dropping the connect future abandons the attempt;
                        // no client handle is ever retained
                        return;
                    }
                }
            }
        }
    }
}

/// Await the first QR / connected / failure signal of a session's
/// authentication attempt.
///
/// Only the request that created the session consumes this; later requests
/// for the same name get an acknowledgment from the registry instead.
pub async fn first_signal(session: &Session) -> Result<AuthSignal, RuntimeError> {
    let mut rx = session.subscribe_signal();
    loop {
        let current = rx.borrow_and_update().clone();
        if let Some(signal) = current {
            return signal.map_err(|fault| fault.into_runtime(session.name()));
        }
        if rx.changed().await.is_err() {
            return Err(RuntimeError::HandshakeAborted(session.name().to_owned()));
        }
    }
}
