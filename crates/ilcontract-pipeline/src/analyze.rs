//! Cache-first contract analysis of methods and assemblies.
//!
//! [`Analyzer::analyze_method`] consults the cache before extracting. A hit
//! skips extraction entirely; a miss extracts and stores the result.
//! [`Analyzer::analyze_assembly`] runs that per method on the rayon pool.

use std::sync::Arc;

use rayon::prelude::*;

use ilcontract_core::MethodBody;
use ilcontract_extract::{ExtractError, Extraction, Extractor, ExtractorConfig};
use ilcontract_storage::{ContractCache, Lookup};

use crate::error::PipelineError;
use crate::report::{AssemblyReport, MethodReport, MethodStatus, PipelineDiagnostic, ResultSource};

/// A named collection of decoded method bodies.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub name: String,
    pub methods: Vec<MethodBody>,
}

impl Assembly {
    pub fn new(name: impl Into<String>, methods: Vec<MethodBody>) -> Self {
        Assembly {
            name: name.into(),
            methods,
        }
    }
}

/// Extracts contracts through a shared cache.
///
/// The cache handle is explicit so several analyzers (or several runs) can
/// share one cache.
#[derive(Debug, Clone)]
pub struct Analyzer {
    extractor: Extractor,
    cache: Arc<ContractCache>,
}

impl Analyzer {
    pub fn new(config: ExtractorConfig, cache: Arc<ContractCache>) -> Self {
        Analyzer {
            extractor: Extractor::new(config),
            cache,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn cache(&self) -> &Arc<ContractCache> {
        &self.cache
    }

    /// Analyzes one method.
    ///
    /// A hit reports the stored extraction, diagnostics included, so the
    /// status does not depend on whether the cache was warm. A malformed
    /// body yields a [`MethodStatus::Failed`] report and is not cached.
    /// Cache backend failures and content-addressing violations are
    /// returned as errors.
    pub fn analyze_method(&self, body: &MethodBody) -> Result<MethodReport, PipelineError> {
        let fingerprint = body.fingerprint;
        let mut diagnostics = Vec::new();

        match self.cache.lookup(&fingerprint)? {
            Lookup::Hit(extraction) => {
                return Ok(method_report(body, ResultSource::Cache, extraction, diagnostics));
            }
            Lookup::Miss => {}
            Lookup::Stale(err) => diagnostics.push(PipelineDiagnostic::StaleCacheRecord(err)),
        }

        let extraction = match self.extractor.extract(body) {
            Ok(extraction) => extraction,
            Err(ExtractError::MalformedTree { method, kind }) => {
                tracing::warn!(%method, %kind, "method skipped: malformed tree");
                diagnostics.push(PipelineDiagnostic::MalformedTree { kind });
                return Ok(MethodReport {
                    method,
                    fingerprint,
                    status: MethodStatus::Failed,
                    source: ResultSource::Extracted,
                    contracts: Default::default(),
                    diagnostics,
                });
            }
            Err(other) => return Err(other.into()),
        };

        self.cache.put_extraction(&fingerprint, &extraction)?;
        Ok(method_report(body, ResultSource::Extracted, extraction, diagnostics))
    }

    /// Analyzes every method of `assembly` in parallel.
    ///
    /// Reports keep the assembly's method order. The first pipeline error
    /// aborts the batch.
    pub fn analyze_assembly(&self, assembly: &Assembly) -> Result<AssemblyReport, PipelineError> {
        let methods = assembly
            .methods
            .par_iter()
            .map(|body| self.analyze_method(body))
            .collect::<Result<Vec<_>, _>>()?;

        let report = AssemblyReport {
            assembly: assembly.name.clone(),
            methods,
        };
        tracing::info!(
            assembly = %report.assembly,
            methods = report.methods.len(),
            succeeded = report.count(MethodStatus::Success),
            partial = report.count(MethodStatus::Partial),
            failed = report.count(MethodStatus::Failed),
            cached = report.from_cache(),
            clauses = report.clause_count(),
            "assembly analyzed"
        );
        Ok(report)
    }
}

/// Builds the report for a method whose extraction succeeded, from the
/// cache or fresh.
fn method_report(
    body: &MethodBody,
    source: ResultSource,
    extraction: Extraction,
    mut diagnostics: Vec<PipelineDiagnostic>,
) -> MethodReport {
    let status = if extraction.is_partial() {
        MethodStatus::Partial
    } else {
        MethodStatus::Success
    };
    diagnostics.extend(
        extraction
            .diagnostics
            .into_iter()
            .map(PipelineDiagnostic::Extraction),
    );
    MethodReport {
        method: body.qualified_name(),
        fingerprint: body.fingerprint,
        status,
        source,
        contracts: extraction.contracts,
        diagnostics,
    }
}
