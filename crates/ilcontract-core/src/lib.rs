//! Expression model and traversal for IL contract extraction.
//!
//! - [`node`]: immutable, `Arc`-shared expression nodes
//! - [`visit`]: read-only pre-order traversal
//! - [`fold`]: persistent rewriting with structural sharing
//! - [`stack`]: stack-balance validation
//! - [`contract`]: contract clauses and validated contract sets
//! - [`extraction`]: per-method extraction results and diagnostics
//! - [`method`]: decoded method bodies

pub mod contract;
pub mod error;
pub mod extraction;
pub mod fold;
pub mod id;
pub mod method;
pub mod node;
pub mod ops;
pub mod stack;
pub mod visit;

// Re-export commonly used types
pub use contract::{ClauseKind, ClausePosition, ContractClause, ContractSet};
pub use error::CoreError;
pub use extraction::{Extraction, ExtractionDiagnostic};
pub use id::{Fingerprint, IlOffset, FINGERPRINT_LEN};
pub use method::{MethodBody, MethodSignature, Parameter};
pub use node::{Node, NodeKind, NodeOp, NodeRef};
pub use ops::{BinOp, CalleeRef, ConstValue, UnOp, VarRef};
pub use stack::count_stack_markers;
pub use visit::Visitor;
