//! Payload types carried by expression nodes.
//!
//! Operators, literal values, variable references, and callee identities.
//! None of these own child nodes; children live on [`NodeOp`](crate::node::NodeOp).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Binary operators recovered from the IL evaluation stack.
///
/// Comparison results (`ceq`, `cgt`, `clt` and the branch forms) are folded
/// into the comparison variants by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Short-circuit `&&`, reconstructed from branch chains.
    LogicalAnd,
    /// Short-circuit `||`, reconstructed from branch chains.
    LogicalOr,
}

impl BinOp {
    /// Surface symbol used when rendering expressions.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::LogicalAnd => "&&",
            BinOp::LogicalOr => "||",
        }
    }

    /// Returns `true` for the six relational operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    /// The operator whose result is the exact logical negation of this one.
    ///
    /// Only equality is invertible for every operand type. Ordered comparisons
    /// are not (`!(a < b)` differs from `a >= b` on unordered floats), so they
    /// return `None`.
    pub fn exact_negation(self) -> Option<BinOp> {
        match self {
            BinOp::Eq => Some(BinOp::Ne),
            BinOp::Ne => Some(BinOp::Eq),
            _ => None,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    /// Logical negation of a boolean.
    Not,
    /// Arithmetic negation.
    Neg,
    /// Bitwise complement.
    BitNot,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Not => "!",
            UnOp::Neg => "-",
            UnOp::BitNot => "~",
        }
    }
}

// ---------------------------------------------------------------------------
// Literals and references
// ---------------------------------------------------------------------------

/// Constant values pushed by `ldc.*`, `ldstr` and `ldnull`.
///
/// `F32` constants are widened to `F64` by the loader.
///
/// Floats compare and serialize by bit pattern, so `NaN` equals itself and
/// non-finite values survive a JSON round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstValue {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(#[serde(with = "f64_bits")] f64),
    String(String),
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Null, ConstValue::Null) => true,
            (ConstValue::Bool(a), ConstValue::Bool(b)) => a == b,
            (ConstValue::I32(a), ConstValue::I32(b)) => a == b,
            (ConstValue::I64(a), ConstValue::I64(b)) => a == b,
            (ConstValue::F64(a), ConstValue::F64(b)) => a.to_bits() == b.to_bits(),
            (ConstValue::String(a), ConstValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

mod f64_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.to_bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        u64::deserialize(deserializer).map(f64::from_bits)
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => f.write_str("null"),
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::I32(v) => write!(f, "{v}"),
            ConstValue::I64(v) => write!(f, "{v}L"),
            ConstValue::F64(v) => write!(f, "{v:?}"),
            ConstValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A local slot, argument slot, or the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarRef {
    This,
    Argument {
        index: u16,
        /// Parameter name from metadata, when the loader resolved it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Local { index: u16 },
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarRef::This => f.write_str("this"),
            VarRef::Argument { name: Some(name), .. } => f.write_str(name),
            VarRef::Argument { index, name: None } => write!(f, "arg{index}"),
            VarRef::Local { index } => write!(f, "loc{index}"),
        }
    }
}

/// Identity of a called method or constructor: declaring type plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalleeRef {
    /// Fully qualified declaring type, e.g. `System.Diagnostics.Contracts.Contract`.
    pub declaring_type: String,
    /// Member name, e.g. `Requires` or `.ctor`.
    pub name: String,
}

impl CalleeRef {
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        CalleeRef {
            declaring_type: declaring_type.into(),
            name: name.into(),
        }
    }

    /// Declaring type without its namespace.
    pub fn short_type_name(&self) -> &str {
        self.declaring_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.declaring_type)
    }
}

impl fmt::Display for CalleeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)
    }
}
