//! Contract extraction from decoded method bodies.
//!
//! [`Extractor`] recognizes `Contract.Requires`/`Ensures`/`Invariant` calls
//! and legacy `if (..) throw` guards among a method's top-level statements,
//! validates each isolated condition for stack balance, and returns the
//! accepted [`ContractSet`](ilcontract_core::ContractSet) together with
//! diagnostics for the rejected candidates.

pub mod config;
pub mod error;
pub mod extract;
mod patterns;

pub use config::{ContractMethod, ExtractorConfig, LegacyPositionRule, CONTRACT_TYPE};
pub use error::ExtractError;
pub use extract::Extractor;
pub use ilcontract_core::{Extraction, ExtractionDiagnostic};
