//! Per-method extraction results.
//!
//! An [`Extraction`] is what the extractor produces for one method body and
//! what the cache stores under that body's fingerprint: the accepted
//! [`ContractSet`] plus the diagnostics for the rejected candidates.

use serde::{Deserialize, Serialize};

use crate::contract::{ClauseKind, ClausePosition, ContractSet};

/// A finding that does not stop extraction of the rest of the method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ExtractionDiagnostic {
    /// A candidate clause's condition still depends on values duplicated on
    /// the evaluation stack, so it was discarded.
    #[error(
        "unextractable {kind} clause at {position}: `{condition}` depends on {stack_markers} duplicated stack value(s)"
    )]
    UnextractableClause {
        /// Where the candidate was found.
        position: ClausePosition,
        /// The kind the clause would have had.
        kind: ClauseKind,
        /// Number of stack markers in the isolated condition.
        stack_markers: usize,
        /// Rendered condition, for humans.
        condition: String,
    },
}

impl ExtractionDiagnostic {
    /// Position of the statement the diagnostic refers to.
    pub fn position(&self) -> ClausePosition {
        match self {
            ExtractionDiagnostic::UnextractableClause { position, .. } => *position,
        }
    }
}

/// Result of extracting one method: the accepted clauses plus diagnostics
/// for the rejected ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub contracts: ContractSet,
    #[serde(default)]
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl Extraction {
    /// `true` if at least one candidate clause was rejected.
    pub fn is_partial(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

impl From<ContractSet> for Extraction {
    fn from(contracts: ContractSet) -> Self {
        Extraction {
            contracts,
            diagnostics: Vec::new(),
        }
    }
}
