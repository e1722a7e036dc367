//! The contract extractor.
//!
//! [`Extractor::extract`] walks a method body's top-level statements in
//! order, turns every contract call and legacy guard into a candidate clause,
//! and keeps the candidates whose isolated condition is stack-balanced.
//! A rejected candidate becomes a diagnostic; it never stops the scan.

use std::sync::Arc;

use ilcontract_core::fold::negate;
use ilcontract_core::visit::check_structure;
use ilcontract_core::{
    ClauseKind, ClausePosition, ContractClause, CoreError, Extraction, ExtractionDiagnostic,
    MethodBody, NodeRef,
};

use crate::config::{ContractTable, ExtractorConfig};
use crate::error::ExtractError;
use crate::patterns::{classify, ContractRegions, StatementShape};

/// Extracts contract sets from method bodies.
///
/// Holds no per-method state, so one extractor can be shared across worker
/// threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    table: ContractTable,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new(ExtractorConfig::default())
    }
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let table = ContractTable::new(&config.contract_methods);
        Extractor { config, table }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the contract set of `body`.
    ///
    /// Fails only if the body contains a node kind with no traversal rule.
    /// An empty body yields an empty set and no diagnostics. Running twice on
    /// the same body yields equal results.
    pub fn extract(&self, body: &MethodBody) -> Result<Extraction, ExtractError> {
        let node_count =
            check_structure(body.root()).map_err(|e| ExtractError::in_method(body, e))?;

        let statements = body.statements();
        let shapes: Vec<StatementShape<'_>> = statements
            .iter()
            .map(|stmt| classify(stmt, &self.table, self.config.end_contract_block.as_ref()))
            .collect();
        let regions = ContractRegions::compute(&shapes);

        let mut extraction = Extraction::default();
        for (index, (stmt, shape)) in statements.iter().zip(&shapes).enumerate() {
            let position = ClausePosition {
                statement_index: index,
                offset: stmt.offset,
            };
            let clause = match shape {
                StatementShape::ContractCall {
                    kind,
                    condition,
                    message,
                } => ContractClause::new(*kind, Arc::clone(condition), position)
                    .with_message(message.clone()),
                StatementShape::LegacyGuard { test } => {
                    let kind = regions.legacy_kind(index, self.config.legacy_rule);
                    let condition = negate(test).map_err(|e| ExtractError::in_method(body, e))?;
                    ContractClause::new(kind, condition, position)
                }
                StatementShape::EndContractBlock | StatementShape::Return | StatementShape::Other => {
                    continue
                }
            };
            self.accept(body, clause, &mut extraction)?;
        }

        tracing::debug!(
            method = %body.qualified_name(),
            nodes = node_count,
            accepted = extraction.contracts.len(),
            rejected = extraction.diagnostics.len(),
            "extracted contracts"
        );
        Ok(extraction)
    }

    /// Validates `clause` into the set, or records why it was rejected.
    fn accept(
        &self,
        body: &MethodBody,
        clause: ContractClause,
        extraction: &mut Extraction,
    ) -> Result<(), ExtractError> {
        let kind: ClauseKind = clause.kind;
        let condition: NodeRef = Arc::clone(&clause.condition);
        match extraction.contracts.try_push(clause) {
            Ok(()) => Ok(()),
            Err(CoreError::UnbalancedClause { position, markers }) => {
                tracing::debug!(
                    method = %body.qualified_name(),
                    %position,
                    %kind,
                    markers,
                    "rejected clause with stack markers"
                );
                extraction
                    .diagnostics
                    .push(ExtractionDiagnostic::UnextractableClause {
                        position,
                        kind,
                        stack_markers: markers,
                        condition: condition.to_string(),
                    });
                Ok(())
            }
            Err(other) => Err(ExtractError::in_method(body, other)),
        }
    }
}
