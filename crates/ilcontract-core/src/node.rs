//! The expression node model for decoded method bodies.
//!
//! A method body is a tree of [`Node`]s shared through [`NodeRef`]
//! (`Arc<Node>`). Nodes are immutable once built: passes that change a tree
//! build a new root and reuse every untouched subtree (see [`crate::fold`]).
//!
//! Each [`NodeOp`] variant fixes its own child layout. `BinaryOp` always has
//! exactly two children, `UnaryOp` exactly one, and so on. Optional children
//! (`else` branches, rethrows, void returns, static field receivers) are
//! `Option<NodeRef>`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::IlOffset;
use crate::ops::{BinOp, CalleeRef, ConstValue, UnOp, VarRef};

/// Shared handle to an immutable node.
pub type NodeRef = Arc<Node>;

/// Children of a node in positional order. Most nodes have at most three.
pub type Children<'a> = SmallVec<[&'a NodeRef; 4]>;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// Payload-free tag of a [`NodeOp`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Literal,
    VariableRef,
    FieldRef,
    BinaryOp,
    UnaryOp,
    Call,
    NewObject,
    StackDuplicate,
    Block,
    Conditional,
    Throw,
    Return,
    Unrecognized,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The operation a node performs, with its payload and owned children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeOp {
    /// A constant.
    Literal { value: ConstValue },
    /// A read of an argument, local, or `this`.
    VariableRef { var: VarRef },
    /// A field read. `target` is `None` for static fields.
    FieldRef {
        target: Option<NodeRef>,
        declaring_type: String,
        field: String,
    },
    BinaryOp {
        op: BinOp,
        lhs: NodeRef,
        rhs: NodeRef,
    },
    UnaryOp { op: UnOp, operand: NodeRef },
    /// A method call. Instance calls carry the receiver as `args[0]`.
    Call { callee: CalleeRef, args: Vec<NodeRef> },
    /// `newobj`: constructor call producing a fresh object.
    NewObject { ctor: CalleeRef, args: Vec<NodeRef> },
    /// Marker for a value the loader could only express as "whatever was
    /// duplicated earlier on the evaluation stack" (`dup` followed by a later
    /// `pop`). A subtree containing one is not a standalone expression.
    StackDuplicate,
    /// A statement sequence.
    Block { stmts: Vec<NodeRef> },
    /// `if (test) then_branch else else_branch`.
    Conditional {
        test: NodeRef,
        then_branch: NodeRef,
        else_branch: Option<NodeRef>,
    },
    /// `throw exception`, or `rethrow` when `exception` is `None`.
    Throw { exception: Option<NodeRef> },
    Return { value: Option<NodeRef> },
    /// An instruction shape the loader could not map onto the model. It has
    /// no traversal rule; visiting it fails with `MalformedTree`.
    Unrecognized { opcode: String, children: Vec<NodeRef> },
}

impl NodeOp {
    /// Returns the payload-free kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeOp::Literal { .. } => NodeKind::Literal,
            NodeOp::VariableRef { .. } => NodeKind::VariableRef,
            NodeOp::FieldRef { .. } => NodeKind::FieldRef,
            NodeOp::BinaryOp { .. } => NodeKind::BinaryOp,
            NodeOp::UnaryOp { .. } => NodeKind::UnaryOp,
            NodeOp::Call { .. } => NodeKind::Call,
            NodeOp::NewObject { .. } => NodeKind::NewObject,
            NodeOp::StackDuplicate => NodeKind::StackDuplicate,
            NodeOp::Block { .. } => NodeKind::Block,
            NodeOp::Conditional { .. } => NodeKind::Conditional,
            NodeOp::Throw { .. } => NodeKind::Throw,
            NodeOp::Return { .. } => NodeKind::Return,
            NodeOp::Unrecognized { .. } => NodeKind::Unrecognized,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A node in a method's expression tree: an operation plus the IL offset it
/// was decoded from, when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub op: NodeOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<IlOffset>,
}

impl Node {
    /// Wraps an operation with no offset.
    pub fn new(op: NodeOp) -> NodeRef {
        Arc::new(Node { op, offset: None })
    }

    /// Wraps an operation decoded at `offset`.
    pub fn located(op: NodeOp, offset: IlOffset) -> NodeRef {
        Arc::new(Node {
            op,
            offset: Some(offset),
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.op.kind()
    }

    /// Children in their fixed positional order. Absent optional children are
    /// skipped.
    pub fn children(&self) -> Children<'_> {
        let mut out = Children::new();
        match &self.op {
            NodeOp::Literal { .. } | NodeOp::VariableRef { .. } | NodeOp::StackDuplicate => {}
            NodeOp::FieldRef { target, .. } => out.extend(target.as_ref()),
            NodeOp::BinaryOp { lhs, rhs, .. } => {
                out.push(lhs);
                out.push(rhs);
            }
            NodeOp::UnaryOp { operand, .. } => out.push(operand),
            NodeOp::Call { args, .. } | NodeOp::NewObject { args, .. } => out.extend(args.iter()),
            NodeOp::Block { stmts } => out.extend(stmts.iter()),
            NodeOp::Conditional {
                test,
                then_branch,
                else_branch,
            } => {
                out.push(test);
                out.push(then_branch);
                out.extend(else_branch.as_ref());
            }
            NodeOp::Throw { exception } => out.extend(exception.as_ref()),
            NodeOp::Return { value } => out.extend(value.as_ref()),
            NodeOp::Unrecognized { children, .. } => out.extend(children.iter()),
        }
        out
    }

    // -- Convenience constructors used by loaders and tests --

    pub fn literal(value: ConstValue) -> NodeRef {
        Node::new(NodeOp::Literal { value })
    }

    pub fn var(var: VarRef) -> NodeRef {
        Node::new(NodeOp::VariableRef { var })
    }

    /// A named argument reference.
    pub fn arg(index: u16, name: &str) -> NodeRef {
        Node::var(VarRef::Argument {
            index,
            name: Some(name.to_string()),
        })
    }

    pub fn field(target: Option<NodeRef>, declaring_type: &str, field: &str) -> NodeRef {
        Node::new(NodeOp::FieldRef {
            target,
            declaring_type: declaring_type.to_string(),
            field: field.to_string(),
        })
    }

    pub fn binary(op: BinOp, lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        Node::new(NodeOp::BinaryOp { op, lhs, rhs })
    }

    pub fn unary(op: UnOp, operand: NodeRef) -> NodeRef {
        Node::new(NodeOp::UnaryOp { op, operand })
    }

    pub fn not(operand: NodeRef) -> NodeRef {
        Node::unary(UnOp::Not, operand)
    }

    pub fn call(callee: CalleeRef, args: Vec<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Call { callee, args })
    }

    pub fn new_object(ctor: CalleeRef, args: Vec<NodeRef>) -> NodeRef {
        Node::new(NodeOp::NewObject { ctor, args })
    }

    pub fn stack_duplicate() -> NodeRef {
        Node::new(NodeOp::StackDuplicate)
    }

    pub fn block(stmts: Vec<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Block { stmts })
    }

    pub fn conditional(test: NodeRef, then_branch: NodeRef, else_branch: Option<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Conditional {
            test,
            then_branch,
            else_branch,
        })
    }

    pub fn throw(exception: Option<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Throw { exception })
    }

    pub fn ret(value: Option<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Return { value })
    }

    pub fn unrecognized(opcode: &str, children: Vec<NodeRef>) -> NodeRef {
        Node::new(NodeOp::Unrecognized {
            opcode: opcode.to_string(),
            children,
        })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Writes `node`, parenthesized when it is itself a binary expression.
fn fmt_operand(node: &Node, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if matches!(node.op, NodeOp::BinaryOp { .. }) {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}

fn fmt_args(args: &[NodeRef], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            NodeOp::Literal { value } => write!(f, "{value}"),
            NodeOp::VariableRef { var } => write!(f, "{var}"),
            NodeOp::FieldRef {
                target: Some(target),
                field,
                ..
            } => {
                fmt_operand(target, f)?;
                write!(f, ".{field}")
            }
            NodeOp::FieldRef {
                target: None,
                declaring_type,
                field,
            } => write!(f, "{declaring_type}.{field}"),
            NodeOp::BinaryOp { op, lhs, rhs } => {
                fmt_operand(lhs, f)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(rhs, f)
            }
            NodeOp::UnaryOp { op, operand } => {
                f.write_str(op.symbol())?;
                fmt_operand(operand, f)
            }
            NodeOp::Call { callee, args } => {
                write!(f, "{}.{}(", callee.short_type_name(), callee.name)?;
                fmt_args(args, f)?;
                f.write_str(")")
            }
            NodeOp::NewObject { ctor, args } => {
                write!(f, "new {}(", ctor.short_type_name())?;
                fmt_args(args, f)?;
                f.write_str(")")
            }
            NodeOp::StackDuplicate => f.write_str("<dup>"),
            NodeOp::Block { stmts } => {
                f.write_str("{ ")?;
                for stmt in stmts {
                    write!(f, "{stmt}; ")?;
                }
                f.write_str("}")
            }
            NodeOp::Conditional {
                test,
                then_branch,
                else_branch,
            } => {
                write!(f, "if ({test}) {then_branch}")?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {else_branch}")?;
                }
                Ok(())
            }
            NodeOp::Throw {
                exception: Some(exception),
            } => write!(f, "throw {exception}"),
            NodeOp::Throw { exception: None } => f.write_str("rethrow"),
            NodeOp::Return { value: Some(value) } => write!(f, "return {value}"),
            NodeOp::Return { value: None } => f.write_str("return"),
            NodeOp::Unrecognized { opcode, .. } => write!(f, "<unrecognized {opcode}>"),
        }
    }
}
