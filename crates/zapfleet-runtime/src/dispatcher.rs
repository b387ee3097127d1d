//! Bulk dispatch: one message per contact, serialized per session.
//!
//! Batch delivery is best-effort. A failed send is logged and recorded in
//! the report; it never aborts the remainder of the batch. Sends for one
//! session are serialized behind the session's send gate, while different
//! sessions dispatch concurrently and independently.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use zapfleet_core::{Contact, DispatchOutcome, DispatchReport, MessagePayload};

use crate::errors::RuntimeError;
use crate::session::Session;

/// Send `payload` to every contact in input order on `session`'s client.
///
/// Requires the session to hold a client handle; a session that is still
/// mid-handshake but already has one is attempted opportunistically.
#[instrument(skip_all, fields(session = session.name(), kind = payload.kind(), contacts = contacts.len()))]
pub async fn dispatch(
    session: &Session,
    payload: &MessagePayload,
    contacts: &[Contact],
) -> Result<DispatchReport, RuntimeError> {
    let client = session
        .client()
        .ok_or_else(|| RuntimeError::ClientMissing(session.name().to_owned()))?;

    let _gate = session.send_gate().await;
    let batch_id = Uuid::now_v7().to_string();
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(contacts.len());

    for contact in contacts {
        let result = match payload {
            MessagePayload::Text { body } => client.send_text(contact.phone(), body).await,
            MessagePayload::Image { path, caption } => {
                client
                    .send_image(contact.phone(), path, caption.as_deref())
                    .await
            }
        };
        match result {
            Ok(message_id) => {
                debug!(batch_id, contact = %contact, message_id, "sent");
                outcomes.push(DispatchOutcome::delivered(contact.clone()));
            }
            Err(e) => {
                warn!(batch_id, contact = %contact, error = %e, "send failed");
                outcomes.push(DispatchOutcome::failed(contact.clone(), e.to_string()));
            }
        }
    }

    let report = DispatchReport {
        batch_id,
        session: session.name().to_owned(),
        outcomes,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        batch_id = %report.batch_id,
        sent = report.sent(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}

/// Run a batch, then drop the consumed roster file. Removal failures are
/// logged, never surfaced.
pub async fn dispatch_and_cleanup(
    session: Arc<Session>,
    payload: MessagePayload,
    contacts: Vec<Contact>,
    roster_path: Option<PathBuf>,
) -> Result<DispatchReport, RuntimeError> {
    let report = dispatch(&session, &payload, &contacts).await?;
    if let Some(path) = roster_path {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "roster file removed"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove roster file"),
        }
    }
    Ok(report)
}
