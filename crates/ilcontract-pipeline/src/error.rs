//! Pipeline error types.
//!
//! A [`PipelineError`] aborts the operation that raised it. Per-method
//! extraction failures on malformed trees are not errors at this level;
//! they are reported as failed methods.

use std::path::PathBuf;

use ilcontract_extract::ExtractError;
use ilcontract_storage::StorageError;
use thiserror::Error;

/// Errors produced by batch analysis and its configuration.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Cache backend failure or content-addressing violation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Extraction failed for a reason other than a malformed tree.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// An environment variable holds an unusable value.
    #[error("invalid configuration: {var}: {reason}")]
    Config { var: &'static str, reason: String },

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
