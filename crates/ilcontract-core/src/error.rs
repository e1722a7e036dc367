//! Core error types for ilcontract-core.
//!
//! Uses `thiserror` for structured, matchable variants covering the failure
//! modes of the node model, traversal, and the contract-set invariant.

use thiserror::Error;

use crate::contract::ClausePosition;

/// Errors produced by the ilcontract-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Traversal reached a node kind with no visitation rule.
    #[error("malformed tree: no traversal rule for node kind '{kind}'")]
    MalformedTree { kind: String },

    /// A method body was built around something other than a root block.
    #[error("invalid method body: {reason}")]
    InvalidBody { reason: String },

    /// A fingerprint was built from a slice of the wrong width.
    #[error("invalid fingerprint: expected 32 bytes, got {len}")]
    InvalidFingerprint { len: usize },

    /// A clause condition still references values duplicated on the
    /// evaluation stack, so it cannot be re-evaluated on its own.
    #[error("clause at {position} is not stack-balanced: {markers} stack marker(s)")]
    UnbalancedClause {
        position: ClausePosition,
        markers: usize,
    },
}
