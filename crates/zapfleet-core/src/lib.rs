//! Core domain types for zapfleet.
//!
//! This crate holds the vocabulary shared by the runtime and the HTTP
//! façade: session lifecycle states, qualified contacts, message payloads,
//! and per-batch dispatch reports. It has no transport or I/O dependencies.

pub mod contact;
pub mod payload;
pub mod report;
pub mod status;

pub use contact::Contact;
pub use payload::MessagePayload;
pub use report::{DispatchOutcome, DispatchReport};
pub use status::SessionStatus;
