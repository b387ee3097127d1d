//! Process-wide session registry.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, instrument, warn};

use zapfleet_client::ClientConnector;

use crate::handshake;
use crate::session::Session;

/// Result of an idempotent create.
pub enum SessionEntry {
    /// This call created the session and started its handshake; the caller
    /// should await the first authentication signal.
    Created(Arc<Session>),
    /// The session already existed; no new client was constructed and no
    /// new handshake was started.
    Existing(Arc<Session>),
}

impl SessionEntry {
    /// The session either way.
    pub fn session(&self) -> &Arc<Session> {
        match self {
            Self::Created(s) | Self::Existing(s) => s,
        }
    }

    /// Whether this call performed the creation.
    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Mapping from session name to session, shared by all request-handling
/// tasks. At most one session — and one underlying client — ever exists
/// per name, even when two first-time requests race.
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, Arc<Session>>>,
    connector: Arc<dyn ClientConnector>,
}

impl SessionRegistry {
    /// Empty registry constructing clients through `connector`.
    pub fn new(connector: Arc<dyn ClientConnector>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            connector,
        }
    }

    /// Return the session for `name`, creating it and starting its
    /// handshake on first request. The map entry is claimed under the
    /// shard lock, so a racing second caller always observes `Existing`.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, name: &str) -> SessionEntry {
        match self.sessions.entry(name.to_owned()) {
            Entry::Occupied(entry) => SessionEntry::Existing(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (session, driver) = Session::new(name);
                let _ = entry.insert(session.clone());
                let _ = handshake::spawn(driver, self.connector.clone(), self.sessions.clone());
                debug!(session = name, "session created");
                SessionEntry::Created(session)
            }
        }
    }

    /// Look up a session without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<Session>> {
        self.sessions.get(name).map(|entry| entry.value().clone())
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Probe a session's live connectivity. Absent sessions, sessions
    /// without a client handle, and faulted probes all read as `false`;
    /// this never raises.
    #[instrument(skip(self))]
    pub async fn is_connected(&self, name: &str) -> bool {
        let Some(session) = self.get(name) else {
            return false;
        };
        let Some(client) = session.client() else {
            return false;
        };
        match client.is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!(session = name, error = %e, "connectivity probe failed");
                false
            }
        }
    }
}
