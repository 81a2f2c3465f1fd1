//! Error types for the collection stage.
//!
//! Everything here is stage-fatal. Per-entity failures are not errors; they
//! become `ClipSkip` values on the collection result.

use thiserror::Error;

/// Result type for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Errors that can occur while driving the rendering session.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("failed to launch rendering session: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("period selection failed: {0}")]
    PeriodSelection(String),

    #[error("selector {selector:?} not present after {waited_ms}ms")]
    SelectorTimeout { selector: String, waited_ms: u64 },

    #[error("session error: {0}")]
    Session(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("ledger I/O error: {0}")]
    Ledger(#[from] std::io::Error),
}
