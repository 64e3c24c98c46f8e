use std::time::Duration;

use thiserror::Error;

/// Fatal startup errors: missing or malformed configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required prompt fields: {}", .0.join(", "))]
    MissingPromptFields(Vec<String>),

    #[error("malformed prompt field '{field}': {reason}")]
    MalformedPrompt { field: String, reason: String },

    #[error("missing required setting: {0}")]
    MissingSetting(String),

    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Failures of a single inference call.
///
/// Always recovered by the dispatch engine and mapped to a fallback reply.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("inference call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from repository operations (audit log persistence).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from media retrieval or storage.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media download failed: {0}")]
    Download(String),

    #[error("media storage failed: {0}")]
    Storage(String),
}

/// Errors at the messaging-platform boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("missing webhook signature")]
    MissingSignature,

    #[error("webhook signature mismatch")]
    SignatureMismatch,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error("reply delivery failed: {0}")]
    Delivery(String),
}
