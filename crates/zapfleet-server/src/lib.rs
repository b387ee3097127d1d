//! HTTP façade for zapfleet.
//!
//! Routes (spec'd surface):
//! - `GET /qrcode/{session}` — create the session on first request and
//!   stream back the QR image; acknowledge with JSON afterwards.
//! - `GET /connected/{session}` — connectivity probe, never errors.
//! - `POST /upload/{session}` — multipart roster upload (`file` field).
//! - `POST /message/{session}` — bulk-dispatch against the uploaded roster.
//! - `GET /health` — liveness.

pub mod config;
pub mod health;
pub mod rosters;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use server::ZapfleetServer;
