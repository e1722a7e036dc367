//! Decoded method bodies handed over by the binary loader.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::Fingerprint;
use crate::node::{NodeOp, NodeRef};

/// A formal parameter as recorded in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

/// The signature of an analyzed method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, return_type: impl Into<String>) -> Self {
        MethodSignature {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", param.type_name, param.name)?;
        }
        f.write_str(")")
    }
}

/// One method's decoded body plus the metadata extraction needs.
///
/// The root is always a `Block`; its statements are the method's top-level
/// statement sequence. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    pub declaring_type: String,
    pub signature: MethodSignature,
    pub fingerprint: Fingerprint,
    root: NodeRef,
}

impl MethodBody {
    /// Builds a method body, checking that `root` is a block.
    pub fn new(
        declaring_type: impl Into<String>,
        signature: MethodSignature,
        fingerprint: Fingerprint,
        root: NodeRef,
    ) -> Result<Self, CoreError> {
        if !matches!(root.op, NodeOp::Block { .. }) {
            return Err(CoreError::InvalidBody {
                reason: format!("root must be a Block, found {}", root.kind()),
            });
        }
        Ok(MethodBody {
            declaring_type: declaring_type.into(),
            signature,
            fingerprint,
            root,
        })
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// The top-level statement sequence.
    pub fn statements(&self) -> &[NodeRef] {
        match &self.root.op {
            NodeOp::Block { stmts } => stmts,
            _ => &[],
        }
    }

    /// `Namespace.Type::Method`, for logs and reports.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.signature.name)
    }
}
