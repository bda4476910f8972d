//! Error types for the smoke runner
//!
//! Assertion mismatches are not errors; they land in the tally. An `Error`
//! returned from a step is a fault and is recorded by the run loop.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type SmokeResult<T> = Result<T, SmokeError>;
