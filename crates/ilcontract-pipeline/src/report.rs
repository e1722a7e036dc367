//! Per-method and per-assembly analysis reports.

use ilcontract_core::{ContractSet, Fingerprint};
use ilcontract_extract::ExtractionDiagnostic;
use ilcontract_storage::CacheFormatError;
use serde::Serialize;

/// Outcome of analyzing one method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MethodStatus {
    /// Every candidate clause was accepted.
    Success,
    /// At least one candidate clause was rejected.
    Partial,
    /// The method body could not be traversed; no contracts were produced.
    Failed,
}

/// Where a method's contracts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultSource {
    Cache,
    Extracted,
}

/// A finding attached to one method's report.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum PipelineDiagnostic {
    #[error(transparent)]
    Extraction(#[from] ExtractionDiagnostic),

    #[error("malformed tree: no traversal rule for node kind '{kind}'")]
    MalformedTree { kind: String },

    #[error("stale cache record ignored: {0}")]
    StaleCacheRecord(CacheFormatError),
}

/// Analysis result for one method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodReport {
    /// Qualified method name, `Type::Method`.
    pub method: String,
    pub fingerprint: Fingerprint,
    pub status: MethodStatus,
    pub source: ResultSource,
    pub contracts: ContractSet,
    pub diagnostics: Vec<PipelineDiagnostic>,
}

/// Analysis results for a whole assembly, in method order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyReport {
    pub assembly: String,
    pub methods: Vec<MethodReport>,
}

impl AssemblyReport {
    pub fn count(&self, status: MethodStatus) -> usize {
        self.methods.iter().filter(|m| m.status == status).count()
    }

    pub fn from_cache(&self) -> usize {
        self.methods
            .iter()
            .filter(|m| m.source == ResultSource::Cache)
            .count()
    }

    /// Total number of accepted clauses across all methods.
    pub fn clause_count(&self) -> usize {
        self.methods.iter().map(|m| m.contracts.len()).sum()
    }

    /// Report for the method with qualified name `method`.
    pub fn method(&self, method: &str) -> Option<&MethodReport> {
        self.methods.iter().find(|m| m.method == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_record_diagnostic_does_not_claim_a_write() {
        let diag = PipelineDiagnostic::StaleCacheRecord(CacheFormatError::ChecksumMismatch);
        let message = diag.to_string();
        assert!(message.starts_with("stale cache record ignored: "), "{message}");
    }
}
