//! Per-batch dispatch results.
//!
//! Batch delivery is best-effort: individual send failures are recorded
//! here instead of aborting the remainder of the batch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contact::Contact;

/// Outcome of one send attempt within a batch.
#[derive(Clone, Debug, Serialize)]
pub struct DispatchOutcome {
    /// Recipient the send was attempted to.
    pub contact: Contact,
    /// Whether the send was accepted by the client capability.
    pub ok: bool,
    /// Failure description when `ok` is false.
    pub error: Option<String>,
}

impl DispatchOutcome {
    /// Successful attempt.
    pub fn delivered(contact: Contact) -> Self {
        Self {
            contact,
            ok: true,
            error: None,
        }
    }

    /// Failed attempt.
    pub fn failed(contact: Contact, error: impl Into<String>) -> Self {
        Self {
            contact,
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of one bulk dispatch, in input order.
#[derive(Clone, Debug, Serialize)]
pub struct DispatchReport {
    /// Batch identifier (UUID v7).
    pub batch_id: String,
    /// Session the batch ran on.
    pub session: String,
    /// One outcome per contact, in attempt order.
    pub outcomes: Vec<DispatchOutcome>,
    /// When the first send was issued.
    pub started_at: DateTime<Utc>,
    /// When the last send settled.
    pub finished_at: DateTime<Utc>,
}

impl DispatchReport {
    /// Number of sends the client accepted.
    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    /// Number of failed sends.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.sent()
    }
}
