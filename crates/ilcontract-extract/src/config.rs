//! Extractor configuration.
//!
//! [`ExtractorConfig`] names the calls that declare contracts and how legacy
//! `if (..) throw` guards are classified. The default matches the
//! `System.Diagnostics.Contracts.Contract` API. Every field falls back to its
//! default when missing from JSON.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use ilcontract_core::{CalleeRef, ClauseKind};

use crate::error::ExtractError;

/// Declaring type of the standard contract API.
pub const CONTRACT_TYPE: &str = "System.Diagnostics.Contracts.Contract";

/// One contract-declaring call: callee, argument count, and clause kind.
///
/// The condition is always the first argument. A second argument, when the
/// arity allows one, is the user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMethod {
    pub callee: CalleeRef,
    pub arity: usize,
    pub kind: ClauseKind,
}

impl ContractMethod {
    pub fn new(callee: CalleeRef, arity: usize, kind: ClauseKind) -> Self {
        ContractMethod { callee, arity, kind }
    }
}

/// How a legacy `if (test) throw` guard is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegacyPositionRule {
    /// Guards in the leading contract block are preconditions. A guard
    /// outside it, followed only by contract statements or a return, is a
    /// postcondition. Anything else stays a precondition.
    #[default]
    LeadingRequiresTrailingEnsures,
    /// Every guard is a precondition.
    AlwaysRequires,
}

impl FromStr for LegacyPositionRule {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "leading-requires-trailing-ensures" => Ok(LegacyPositionRule::LeadingRequiresTrailingEnsures),
            "always-requires" => Ok(LegacyPositionRule::AlwaysRequires),
            other => Err(ExtractError::InvalidConfig {
                reason: format!("unknown legacy position rule '{other}'"),
            }),
        }
    }
}

/// Configuration for [`Extractor`](crate::extract::Extractor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Calls recognized as contract declarations, in priority order.
    pub contract_methods: Vec<ContractMethod>,
    /// Zero-argument call that closes the leading contract block.
    pub end_contract_block: Option<CalleeRef>,
    pub legacy_rule: LegacyPositionRule,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let callee = |name: &str| CalleeRef::new(CONTRACT_TYPE, name);
        let mut contract_methods = Vec::new();
        for (name, kind) in [
            ("Requires", ClauseKind::Requires),
            ("Ensures", ClauseKind::Ensures),
            ("Invariant", ClauseKind::Invariant),
        ] {
            contract_methods.push(ContractMethod::new(callee(name), 1, kind));
            contract_methods.push(ContractMethod::new(callee(name), 2, kind));
        }
        ExtractorConfig {
            contract_methods,
            end_contract_block: Some(callee("EndContractBlock")),
            legacy_rule: LegacyPositionRule::default(),
        }
    }
}

impl ExtractorConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let config: ExtractorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects tables that cannot yield a condition.
    pub fn validate(&self) -> Result<(), ExtractError> {
        for method in &self.contract_methods {
            if method.arity == 0 {
                return Err(ExtractError::InvalidConfig {
                    reason: format!("contract method {} has arity 0", method.callee),
                });
            }
        }
        Ok(())
    }

    pub fn with_legacy_rule(mut self, rule: LegacyPositionRule) -> Self {
        self.legacy_rule = rule;
        self
    }
}

/// Lookup table built from [`ExtractorConfig::contract_methods`]:
/// callee, then arity, to clause kind. The first entry for a pair wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct ContractTable {
    by_callee: IndexMap<CalleeRef, IndexMap<usize, ClauseKind>>,
}

impl ContractTable {
    pub(crate) fn new(methods: &[ContractMethod]) -> Self {
        let mut by_callee: IndexMap<CalleeRef, IndexMap<usize, ClauseKind>> = IndexMap::new();
        for method in methods {
            by_callee
                .entry(method.callee.clone())
                .or_default()
                .entry(method.arity)
                .or_insert(method.kind);
        }
        ContractTable { by_callee }
    }

    pub(crate) fn lookup(&self, callee: &CalleeRef, arity: usize) -> Option<ClauseKind> {
        self.by_callee.get(callee)?.get(&arity).copied()
    }

    pub(crate) fn knows(&self, callee: &CalleeRef) -> bool {
        self.by_callee.contains_key(callee)
    }
}
