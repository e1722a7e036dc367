//! Read-only tree traversal.
//!
//! [`Visitor`] walks a tree depth-first in pre-order: the node itself, then
//! its children in positional order. [`Visitor::visit_node`] dispatches on
//! the node kind to a per-kind method; every per-kind method defaults to
//! [`walk_children`], so an implementation overrides only the kinds it cares
//! about and calls `walk_children` itself when it wants to keep descending.
//!
//! The walk is total over the model. The one kind without a traversal rule,
//! `Unrecognized`, fails with [`CoreError::MalformedTree`] unless a visitor
//! overrides [`Visitor::visit_unrecognized`].
//!
//! Visitors only ever see `&Node`; building a changed tree is the job of
//! [`crate::fold::Folder`].
//!
//! # Example
//!
//! ```
//! use ilcontract_core::error::CoreError;
//! use ilcontract_core::node::Node;
//! use ilcontract_core::ops::VarRef;
//! use ilcontract_core::visit::{walk_children, Visitor};
//!
//! #[derive(Default)]
//! struct CountVars(usize);
//!
//! impl Visitor for CountVars {
//!     fn visit_variable_ref(&mut self, node: &Node, _var: &VarRef) -> Result<(), CoreError> {
//!         self.0 += 1;
//!         walk_children(self, node)
//!     }
//! }
//!
//! let tree = Node::not(Node::arg(0, "flag"));
//! let mut counter = CountVars::default();
//! counter.visit_node(&tree).unwrap();
//! assert_eq!(counter.0, 1);
//! ```

use crate::error::CoreError;
use crate::node::{Node, NodeOp, NodeRef};
use crate::ops::{BinOp, CalleeRef, ConstValue, UnOp, VarRef};

/// A read-only pass over an expression tree.
pub trait Visitor {
    /// Visits any node by dispatching on its kind.
    fn visit_node(&mut self, node: &Node) -> Result<(), CoreError> {
        walk_node(self, node)
    }

    /// Visits an optional child. An absent node is a no-op.
    fn visit_opt(&mut self, node: Option<&NodeRef>) -> Result<(), CoreError> {
        match node {
            Some(node) => self.visit_node(node),
            None => Ok(()),
        }
    }

    fn visit_literal(&mut self, node: &Node, _value: &ConstValue) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_variable_ref(&mut self, node: &Node, _var: &VarRef) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_field_ref(&mut self, node: &Node, _field: &str) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_binary_op(&mut self, node: &Node, _op: BinOp) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_unary_op(&mut self, node: &Node, _op: UnOp) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_call(&mut self, node: &Node, _callee: &CalleeRef, _args: &[NodeRef]) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_new_object(&mut self, node: &Node, _ctor: &CalleeRef) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_stack_duplicate(&mut self, node: &Node) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_block(&mut self, node: &Node, _stmts: &[NodeRef]) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_conditional(&mut self, node: &Node) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_throw(&mut self, node: &Node) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    fn visit_return(&mut self, node: &Node) -> Result<(), CoreError> {
        walk_children(self, node)
    }

    /// No traversal rule exists for unrecognized instructions.
    fn visit_unrecognized(&mut self, _node: &Node, opcode: &str) -> Result<(), CoreError> {
        Err(CoreError::MalformedTree {
            kind: opcode.to_string(),
        })
    }
}

/// Dispatches `node` to the matching per-kind method of `visitor`.
pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) -> Result<(), CoreError> {
    match &node.op {
        NodeOp::Literal { value } => visitor.visit_literal(node, value),
        NodeOp::VariableRef { var } => visitor.visit_variable_ref(node, var),
        NodeOp::FieldRef { field, .. } => visitor.visit_field_ref(node, field),
        NodeOp::BinaryOp { op, .. } => visitor.visit_binary_op(node, *op),
        NodeOp::UnaryOp { op, .. } => visitor.visit_unary_op(node, *op),
        NodeOp::Call { callee, args } => visitor.visit_call(node, callee, args),
        NodeOp::NewObject { ctor, .. } => visitor.visit_new_object(node, ctor),
        NodeOp::StackDuplicate => visitor.visit_stack_duplicate(node),
        NodeOp::Block { stmts } => visitor.visit_block(node, stmts),
        NodeOp::Conditional { .. } => visitor.visit_conditional(node),
        NodeOp::Throw { .. } => visitor.visit_throw(node),
        NodeOp::Return { .. } => visitor.visit_return(node),
        NodeOp::Unrecognized { opcode, .. } => visitor.visit_unrecognized(node, opcode),
    }
}

/// Visits every child of `node` in positional order, stopping at the first
/// error.
pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, node: &Node) -> Result<(), CoreError> {
    for child in node.children() {
        visitor.visit_node(child)?;
    }
    Ok(())
}

/// Visitor that records nothing. Walking with it checks that a tree has a
/// traversal rule for every node it contains.
#[derive(Debug, Default)]
pub struct StructureCheck {
    /// Number of nodes visited so far.
    pub nodes: usize,
}

impl Visitor for StructureCheck {
    fn visit_node(&mut self, node: &Node) -> Result<(), CoreError> {
        self.nodes += 1;
        walk_node(self, node)
    }
}

/// Walks `root` with [`StructureCheck`], returning the node count.
pub fn check_structure(root: &Node) -> Result<usize, CoreError> {
    let mut check = StructureCheck::default();
    check.visit_node(root)?;
    Ok(check.nodes)
}
