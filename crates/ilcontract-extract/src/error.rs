//! Error types for contract extraction.
//!
//! Errors here are fatal for one method's extraction. Rejected clauses are
//! not errors; they become [`ExtractionDiagnostic`](ilcontract_core::ExtractionDiagnostic)s.

use ilcontract_core::{CoreError, MethodBody};
use thiserror::Error;

/// Errors produced while extracting contracts from one method.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The method body contains a node kind with no traversal rule.
    #[error("malformed tree in {method}: no traversal rule for node kind '{kind}'")]
    MalformedTree { method: String, kind: String },

    /// Any other core-model failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The extractor configuration is unusable.
    #[error("invalid extractor configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Configuration JSON failed to parse.
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Attaches the method name to a core error raised while walking `body`.
    pub(crate) fn in_method(body: &MethodBody, err: CoreError) -> Self {
        match err {
            CoreError::MalformedTree { kind } => ExtractError::MalformedTree {
                method: body.qualified_name(),
                kind,
            },
            other => ExtractError::Core(other),
        }
    }
}
