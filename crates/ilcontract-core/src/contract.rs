//! Contract clauses and validated contract sets.
//!
//! A [`ContractSet`] only ever holds stack-balanced clauses: [`ContractSet::try_push`]
//! runs the stack-balance validator before accepting a clause, and
//! deserialization goes through the same check. Downstream consumers can
//! evaluate every clause as a standalone condition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::IlOffset;
use crate::node::NodeRef;
use crate::stack::count_stack_markers;

/// What a clause promises and where a verifier checks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseKind {
    /// Precondition, checked at method entry.
    Requires,
    /// Postcondition, checked at normal return.
    Ensures,
    /// Object invariant, checked at every observable state boundary.
    Invariant,
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a clause was found: its top-level statement index and, when the
/// loader provided one, the statement's IL offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClausePosition {
    pub statement_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<IlOffset>,
}

impl fmt::Display for ClausePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "statement {}", self.statement_index)?;
        if let Some(offset) = self.offset {
            write!(f, " ({offset})")?;
        }
        Ok(())
    }
}

/// One extracted precondition, postcondition, or invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractClause {
    pub kind: ClauseKind,
    /// The isolated condition expression.
    pub condition: NodeRef,
    pub position: ClausePosition,
    /// User-supplied message (`Contract.Requires(cond, "message")`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContractClause {
    pub fn new(kind: ClauseKind, condition: NodeRef, position: ClausePosition) -> Self {
        ContractClause {
            kind,
            condition,
            position,
            message: None,
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

impl fmt::Display for ContractClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.condition)
    }
}

/// The ordered, validated contracts of one method.
///
/// Order is encounter order in the method body and is significant to
/// consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ContractClause>", into = "Vec<ContractClause>")]
pub struct ContractSet {
    clauses: Vec<ContractClause>,
}

impl ContractSet {
    pub fn new() -> Self {
        ContractSet::default()
    }

    /// Appends `clause` if its condition is stack-balanced.
    ///
    /// Returns [`CoreError::UnbalancedClause`] (leaving the set unchanged) if
    /// the condition still contains stack markers, or
    /// [`CoreError::MalformedTree`] if it cannot be traversed.
    pub fn try_push(&mut self, clause: ContractClause) -> Result<(), CoreError> {
        let markers = count_stack_markers(&clause.condition)?;
        if markers > 0 {
            return Err(CoreError::UnbalancedClause {
                position: clause.position,
                markers,
            });
        }
        self.clauses.push(clause);
        Ok(())
    }

    pub fn clauses(&self) -> &[ContractClause] {
        &self.clauses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContractClause> {
        self.clauses.iter()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clauses of one kind, in encounter order.
    pub fn of_kind(&self, kind: ClauseKind) -> impl Iterator<Item = &ContractClause> {
        self.clauses.iter().filter(move |c| c.kind == kind)
    }
}

impl<'a> IntoIterator for &'a ContractSet {
    type Item = &'a ContractClause;
    type IntoIter = std::slice::Iter<'a, ContractClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl TryFrom<Vec<ContractClause>> for ContractSet {
    type Error = CoreError;

    fn try_from(clauses: Vec<ContractClause>) -> Result<Self, Self::Error> {
        let mut set = ContractSet::new();
        for clause in clauses {
            set.try_push(clause)?;
        }
        Ok(set)
    }
}

impl From<ContractSet> for Vec<ContractClause> {
    fn from(set: ContractSet) -> Self {
        set.clauses
    }
}
