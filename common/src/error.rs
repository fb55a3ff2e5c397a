use thiserror::Error;

use crate::booking::BookingId;

/// Failure to complete an HTTP exchange at all (no status received).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Errors from the extraction collaborator (LLM).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("no API key configured for the extraction service")]
    MissingApiKey,
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Non-success HTTP status. The body is kept for logs, never shown to users.
    #[error("extraction service returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("extraction service error: {0}")]
    Api(String),
    #[error("malformed extraction response: {0}")]
    Malformed(String),
}

/// Errors from the intake submission endpoint.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("intake endpoint returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("could not encode intake payload: {0}")]
    Encode(String),
}

/// Errors surfaced by the chat intake engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("a request is already in flight")]
    Busy,
    #[error("message is empty")]
    EmptyInput,
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Errors from the document scan engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("a scan is already in progress")]
    Busy,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("selected file is empty")]
    EmptyFile,
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Errors from the booking store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("booking {0} not found")]
    NotFound(BookingId),
    #[error("could not serialize bookings: {0}")]
    Serialize(String),
}
