//! Session lifecycle and bulk-dispatch core.
//!
//! This crate owns the orchestration layer between the HTTP façade and the
//! messaging client capability: a process-wide [`SessionRegistry`], the QR
//! handshake coordinator in [`handshake`], the serialized-per-session bulk
//! dispatcher in [`dispatcher`], and the contact roster loader in
//! [`roster`].

pub mod dispatcher;
pub mod errors;
pub mod handshake;
pub mod registry;
pub mod roster;
pub mod session;

pub use errors::RuntimeError;
pub use handshake::AuthSignal;
pub use registry::{SessionEntry, SessionRegistry};
pub use roster::RosterOptions;
pub use session::Session;
