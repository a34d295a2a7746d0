//! Error types for the request layer.
//!
//! Parsing and tier reduction never fail; everything here belongs to the
//! boundary where a user action turns into a backend request.

use thiserror::Error;

/// Failure talking to the generation backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),
    #[error("login rejected for user {0}")]
    LoginRejected(String),
    #[error("not logged in")]
    Unauthenticated,
}

/// Reasons a refinement request cannot be built.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementError {
    #[error("refinement instruction is empty")]
    EmptyInstruction,
    #[error("no idea has been generated yet")]
    NoActiveIdea,
}

/// Reasons the idea form cannot be submitted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("business type is required")]
    MissingBusinessType,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
