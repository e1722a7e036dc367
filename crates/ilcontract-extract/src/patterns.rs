//! Statement pattern recognition.
//!
//! Classifies each top-level statement as a contract call, a legacy
//! `if (test) throw` guard, the contract-block terminator, or anything else.
//! Classification only borrows from the tree; isolating and validating the
//! condition happens in [`crate::extract`].

use ilcontract_core::{CalleeRef, ClauseKind, ConstValue, NodeOp, NodeRef};

use crate::config::{ContractTable, LegacyPositionRule};

/// The recognized shape of one top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StatementShape<'a> {
    /// A call to a configured contract method with a matching arity.
    ContractCall {
        kind: ClauseKind,
        condition: &'a NodeRef,
        message: Option<String>,
    },
    /// `if (test) throw ...` with no else branch. The clause condition is
    /// the negation of `test`.
    LegacyGuard { test: &'a NodeRef },
    /// The zero-argument contract-block terminator.
    EndContractBlock,
    /// A plain `return`, which does not end a trailing contract block.
    Return,
    Other,
}

impl StatementShape<'_> {
    /// Statements that belong to a contract block.
    pub(crate) fn is_contract(&self) -> bool {
        matches!(
            self,
            StatementShape::ContractCall { .. }
                | StatementShape::LegacyGuard { .. }
                | StatementShape::EndContractBlock
        )
    }
}

/// Classifies one statement against the contract table.
pub(crate) fn classify<'a>(
    stmt: &'a NodeRef,
    table: &ContractTable,
    end_contract_block: Option<&CalleeRef>,
) -> StatementShape<'a> {
    match &stmt.op {
        NodeOp::Call { callee, args } => {
            if args.is_empty() && end_contract_block == Some(callee) {
                return StatementShape::EndContractBlock;
            }
            match (table.lookup(callee, args.len()), args.first()) {
                (Some(kind), Some(condition)) => StatementShape::ContractCall {
                    kind,
                    condition,
                    message: args.get(1).and_then(literal_message),
                },
                _ => {
                    if table.knows(callee) {
                        tracing::debug!(
                            callee = %callee,
                            arity = args.len(),
                            "contract call with unexpected argument count ignored"
                        );
                    }
                    StatementShape::Other
                }
            }
        }
        NodeOp::Conditional {
            test,
            then_branch,
            else_branch: None,
        } if always_throws(then_branch) => StatementShape::LegacyGuard { test },
        NodeOp::Return { .. } => StatementShape::Return,
        _ => StatementShape::Other,
    }
}

/// `throw ...`, or a block whose only statement is one.
fn always_throws(node: &NodeRef) -> bool {
    match &node.op {
        NodeOp::Throw { .. } => true,
        NodeOp::Block { stmts } => matches!(stmts.as_slice(), [only] if matches!(only.op, NodeOp::Throw { .. })),
        _ => false,
    }
}

/// A user message is only kept when it is a string literal.
fn literal_message(node: &NodeRef) -> Option<String> {
    match &node.op {
        NodeOp::Literal {
            value: ConstValue::String(s),
        } => Some(s.clone()),
        _ => None,
    }
}

/// Where the leading contract block ends and the trailing one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContractRegions {
    /// Statements `[0, leading_end)` form the leading contract block.
    pub(crate) leading_end: usize,
    /// Statements `[trailing_start, len)` are contract statements or returns.
    pub(crate) trailing_start: usize,
}

impl ContractRegions {
    pub(crate) fn compute(shapes: &[StatementShape<'_>]) -> Self {
        let mut leading_end = 0;
        for shape in shapes {
            if !shape.is_contract() {
                break;
            }
            leading_end += 1;
            if *shape == StatementShape::EndContractBlock {
                break;
            }
        }

        let mut trailing_start = shapes.len();
        while trailing_start > 0 {
            let shape = &shapes[trailing_start - 1];
            if shape.is_contract() || *shape == StatementShape::Return {
                trailing_start -= 1;
            } else {
                break;
            }
        }

        ContractRegions {
            leading_end,
            trailing_start,
        }
    }

    /// Kind of a legacy guard at `index` under `rule`.
    pub(crate) fn legacy_kind(&self, index: usize, rule: LegacyPositionRule) -> ClauseKind {
        match rule {
            LegacyPositionRule::AlwaysRequires => ClauseKind::Requires,
            LegacyPositionRule::LeadingRequiresTrailingEnsures => {
                if index >= self.leading_end && index >= self.trailing_start {
                    ClauseKind::Ensures
                } else {
                    ClauseKind::Requires
                }
            }
        }
    }
}
