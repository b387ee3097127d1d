//! Route handlers: QR handshake, connectivity, roster upload, bulk dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Json, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use zapfleet_core::MessagePayload;
use zapfleet_runtime::registry::{SessionEntry, SessionRegistry};
use zapfleet_runtime::roster::RosterOptions;
use zapfleet_runtime::{AuthSignal, RuntimeError, dispatcher, handshake, roster};

use crate::health;
use crate::rosters::RosterStore;

/// Shared state accessible from every handler.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide session registry.
    pub registry: Arc<SessionRegistry>,
    /// Roster upload storage.
    pub rosters: Arc<RosterStore>,
    /// How rosters are parsed.
    pub roster_options: RosterOptions,
    /// When the server started.
    pub start_time: Instant,
}

/// Error envelope returned by the routes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed (missing field, bad multipart body).
    #[error("{0}")]
    BadRequest(String),
    /// Handshake or dispatch-setup failure.
    #[error("{0}")]
    Internal(String),
}

impl From<RuntimeError> for ApiError {
    fn from(e: RuntimeError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = %status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the router with all routes.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/qrcode/{session}", get(qrcode))
        .route("/connected/{session}", get(connected))
        .route("/upload/{session}", post(upload))
        .route("/message/{session}", post(message))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<health::HealthResponse> {
    Json(health::health_check(state.start_time, state.registry.len()))
}

/// GET /qrcode/{session}
///
/// The first request for a name creates the session and streams the QR
/// image back (content type from the decoded payload). Requests for an
/// existing session get a JSON connectivity acknowledgment instead of a
/// second handshake.
async fn qrcode(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Response, ApiError> {
    match state.registry.get_or_create(&session) {
        SessionEntry::Existing(_) => {
            let connected = state.registry.is_connected(&session).await;
            Ok(Json(json!({ "connected": connected })).into_response())
        }
        SessionEntry::Created(created) => match handshake::first_signal(&created).await? {
            AuthSignal::QrReady(qr) => {
                Ok(([(header::CONTENT_TYPE, qr.mime)], qr.bytes).into_response())
            }
            AuthSignal::Connected => Ok(Json(json!({ "connected": true })).into_response()),
        },
    }
}

/// GET /connected/{session} — absent sessions read as `false`, never an
/// error.
async fn connected(State(state): State<AppState>, Path(session): Path<String>) -> Json<Value> {
    Json(json!({ "connected": state.registry.is_connected(&session).await }))
}

/// POST /upload/{session} — multipart roster upload, field `file`.
async fn upload(
    State(state): State<AppState>,
    Path(session): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("roster.csv").to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        let path = state
            .rosters
            .save(&session, &original_name, bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to store roster: {e}")))?;
        info!(session, path = %path.display(), "roster uploaded");
        return Ok(Json(json!({ "message": true })));
    }
    Err(ApiError::BadRequest("missing file field".into()))
}

/// POST /message/{session} body.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Text body, or the caption when `image` is set. Required.
    pub message: Option<String>,
    /// Server-local path to an image to send instead of plain text.
    pub image: Option<PathBuf>,
}

/// POST /message/{session}
///
/// Loads the previously uploaded roster, issues the batch, and
/// acknowledges immediately; per-contact outcomes are observable via logs
/// only. Setup failures (absent session or client, unreadable roster)
/// surface as 500 before the acknowledgment.
async fn message(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(text) = request.message.filter(|m| !m.trim().is_empty()) else {
        return Err(ApiError::BadRequest("message is required".into()));
    };

    let handle = state
        .registry
        .get(&session)
        .ok_or_else(|| RuntimeError::SessionNotFound(session.clone()))?;
    if handle.client().is_none() {
        return Err(RuntimeError::ClientMissing(session.clone()).into());
    }

    let roster_path = state
        .rosters
        .find(&session)
        .await
        .ok_or_else(|| ApiError::Internal(format!("no roster uploaded for session {session}")))?;

    let options = state.roster_options.clone();
    let load_path = roster_path.clone();
    let contacts = tokio::task::spawn_blocking(move || roster::load_contacts(&load_path, &options))
        .await
        .map_err(|e| ApiError::Internal(format!("roster load task failed: {e}")))?
        .map_err(RuntimeError::from)?;

    let payload = match request.image {
        Some(path) => MessagePayload::image(path, Some(text)),
        None => MessagePayload::text(text),
    };

    let issued = contacts.len();
    info!(session, contacts = issued, kind = payload.kind(), "batch accepted");
    // fire-and-forget: acknowledged as soon as the batch is issued
    drop(tokio::spawn(async move {
        if let Err(e) =
            dispatcher::dispatch_and_cleanup(handle, payload, contacts, Some(roster_path)).await
        {
            error!(error = %e, "bulk dispatch failed");
        }
    }));

    Ok(Json(json!({ "message": true, "contacts": issued })))
}
