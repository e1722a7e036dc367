//! Persistent tree rewriting.
//!
//! A [`Folder`] never mutates its input. [`fold_children`] folds every child
//! and rebuilds the parent only when at least one child came back as a
//! different allocation; otherwise the original [`NodeRef`] is returned, so
//! untouched subtrees stay shared between the old and new trees.

use std::sync::Arc;

use crate::error::CoreError;
use crate::node::{Node, NodeOp, NodeRef};

/// A rewriting pass producing a new tree.
pub trait Folder {
    /// Folds one node. The default rebuilds the node from its folded children.
    fn fold_node(&mut self, node: &NodeRef) -> Result<NodeRef, CoreError> {
        fold_children(self, node)
    }
}

fn fold_one<F: Folder + ?Sized>(
    folder: &mut F,
    node: &NodeRef,
    changed: &mut bool,
) -> Result<NodeRef, CoreError> {
    let folded = folder.fold_node(node)?;
    if !Arc::ptr_eq(&folded, node) {
        *changed = true;
    }
    Ok(folded)
}

fn fold_opt<F: Folder + ?Sized>(
    folder: &mut F,
    node: &Option<NodeRef>,
    changed: &mut bool,
) -> Result<Option<NodeRef>, CoreError> {
    node.as_ref()
        .map(|n| fold_one(folder, n, changed))
        .transpose()
}

fn fold_vec<F: Folder + ?Sized>(
    folder: &mut F,
    nodes: &[NodeRef],
    changed: &mut bool,
) -> Result<Vec<NodeRef>, CoreError> {
    nodes.iter().map(|n| fold_one(folder, n, changed)).collect()
}

/// Folds the children of `node`, reusing `node` itself when nothing changed.
pub fn fold_children<F: Folder + ?Sized>(folder: &mut F, node: &NodeRef) -> Result<NodeRef, CoreError> {
    let mut changed = false;
    let op = match &node.op {
        NodeOp::Literal { .. } | NodeOp::VariableRef { .. } | NodeOp::StackDuplicate => {
            return Ok(Arc::clone(node));
        }
        NodeOp::FieldRef {
            target,
            declaring_type,
            field,
        } => NodeOp::FieldRef {
            target: fold_opt(folder, target, &mut changed)?,
            declaring_type: declaring_type.clone(),
            field: field.clone(),
        },
        NodeOp::BinaryOp { op, lhs, rhs } => NodeOp::BinaryOp {
            op: *op,
            lhs: fold_one(folder, lhs, &mut changed)?,
            rhs: fold_one(folder, rhs, &mut changed)?,
        },
        NodeOp::UnaryOp { op, operand } => NodeOp::UnaryOp {
            op: *op,
            operand: fold_one(folder, operand, &mut changed)?,
        },
        NodeOp::Call { callee, args } => NodeOp::Call {
            callee: callee.clone(),
            args: fold_vec(folder, args, &mut changed)?,
        },
        NodeOp::NewObject { ctor, args } => NodeOp::NewObject {
            ctor: ctor.clone(),
            args: fold_vec(folder, args, &mut changed)?,
        },
        NodeOp::Block { stmts } => NodeOp::Block {
            stmts: fold_vec(folder, stmts, &mut changed)?,
        },
        NodeOp::Conditional {
            test,
            then_branch,
            else_branch,
        } => NodeOp::Conditional {
            test: fold_one(folder, test, &mut changed)?,
            then_branch: fold_one(folder, then_branch, &mut changed)?,
            else_branch: fold_opt(folder, else_branch, &mut changed)?,
        },
        NodeOp::Throw { exception } => NodeOp::Throw {
            exception: fold_opt(folder, exception, &mut changed)?,
        },
        NodeOp::Return { value } => NodeOp::Return {
            value: fold_opt(folder, value, &mut changed)?,
        },
        NodeOp::Unrecognized { opcode, .. } => {
            return Err(CoreError::MalformedTree {
                kind: opcode.clone(),
            });
        }
    };

    if changed {
        Ok(Arc::new(Node {
            op,
            offset: node.offset,
        }))
    } else {
        Ok(Arc::clone(node))
    }
}

/// Normalizes logical negations.
///
/// - `!!e` becomes `e`
/// - `!(a == b)` becomes `a != b` and `!(a != b)` becomes `a == b`
///
/// Ordered comparisons are left under their negation; see
/// [`BinOp::exact_negation`](crate::ops::BinOp::exact_negation).
#[derive(Debug, Default)]
pub struct NegationSimplifier;

impl Folder for NegationSimplifier {
    fn fold_node(&mut self, node: &NodeRef) -> Result<NodeRef, CoreError> {
        let node = fold_children(self, node)?;
        if let NodeOp::UnaryOp {
            op: crate::ops::UnOp::Not,
            operand,
        } = &node.op
        {
            match &operand.op {
                NodeOp::UnaryOp {
                    op: crate::ops::UnOp::Not,
                    operand: inner,
                } => return Ok(Arc::clone(inner)),
                NodeOp::BinaryOp { op, lhs, rhs } => {
                    if let Some(flipped) = op.exact_negation() {
                        return Ok(Arc::new(Node {
                            op: NodeOp::BinaryOp {
                                op: flipped,
                                lhs: Arc::clone(lhs),
                                rhs: Arc::clone(rhs),
                            },
                            offset: operand.offset,
                        }));
                    }
                }
                _ => {}
            }
        }
        Ok(node)
    }
}

/// Builds the logical negation of `expr` and simplifies it.
pub fn negate(expr: &NodeRef) -> Result<NodeRef, CoreError> {
    NegationSimplifier.fold_node(&Node::not(Arc::clone(expr)))
}
