//! Syntax tree definitions for C-minus-f
//!
//! These nodes are produced by the external parser and consumed by the IR
//! builder in [`crate::codegen`]. They carry declared element types but no
//! resolved symbols; name resolution happens during lowering.

pub mod ops;
pub mod expressions;
pub mod statements;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types at module level
pub use ops::{AddOp, MulOp, RelOp};
pub use expressions::{Expression, Number, Var};
pub use statements::{
    CompoundStmt, Declaration, FunDeclaration, Param, Program, Statement, VarDeclaration,
};

/// Declared element type of a literal, variable, parameter or function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSpecifier {
    Int,
    Float,
    Void,
}

impl fmt::Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpecifier::Int => write!(f, "int"),
            TypeSpecifier::Float => write!(f, "float"),
            TypeSpecifier::Void => write!(f, "void"),
        }
    }
}
