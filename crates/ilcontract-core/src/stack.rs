//! Stack-balance validation.
//!
//! A decoded expression can contain [`NodeOp::StackDuplicate`] markers where
//! the loader saw a value consumed from an earlier `dup`. Such a subtree only
//! makes sense in its original stack context. Once a condition is sliced out
//! of its statement, any marker left inside it means the condition cannot be
//! re-evaluated on its own.
//!
//! [`NodeOp::StackDuplicate`]: crate::node::NodeOp::StackDuplicate

use crate::error::CoreError;
use crate::node::Node;
use crate::visit::{walk_children, Visitor};

/// Counts `StackDuplicate` nodes anywhere below (and including) the root.
#[derive(Debug, Default)]
pub struct StackMarkerCounter {
    count: usize,
}

impl StackMarkerCounter {
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Visitor for StackMarkerCounter {
    fn visit_stack_duplicate(&mut self, node: &Node) -> Result<(), CoreError> {
        self.count += 1;
        walk_children(self, node)
    }
}

/// Returns the number of stack markers in `root`'s subtree.
///
/// Deterministic: the same tree always yields the same count. Fails only if
/// the subtree contains a node kind with no traversal rule.
pub fn count_stack_markers(root: &Node) -> Result<usize, CoreError> {
    let mut counter = StackMarkerCounter::default();
    counter.visit_node(root)?;
    Ok(counter.count())
}

/// Returns `true` if `root` contains no stack markers.
pub fn is_stack_balanced(root: &Node) -> Result<bool, CoreError> {
    Ok(count_stack_markers(root)? == 0)
}
