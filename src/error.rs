//! Error types for Nutri-Assess
//!
//! The calculation itself never fails; these errors only arise at the
//! transport boundary (JSON parsing and report encoding).

use thiserror::Error;

/// Errors that can occur while reading input or encoding a report
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse assessment input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No assessment records in input")]
    EmptyBatch,

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
