//! IR Value Representations
//!
//! Defines the handles used to name IR entities and the [`Value`] operand
//! type. Every handle is an index into an arena owned by the module
//! (functions, globals) or by a function (blocks, instructions), so a
//! handle stays valid until the entity it names is erased.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalId(pub u32);

/// Basic block handle, local to its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Instruction handle, local to its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// IR Value - represents operands in IR instructions
///
/// `Argument` and `Instruction` are only meaningful inside the function
/// that owns the referencing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Constant i32
    ConstInt(i32),

    /// Constant float
    ConstFloat(f32),

    /// Zero-initialized constant of any type (global initializers)
    ConstZero(TypeId),

    /// Address of a global variable
    Global(GlobalId),

    Function(FunctionId),

    /// Function argument by position
    Argument(u32),

    /// Result of an instruction
    Instruction(InstId),
}

impl Value {
    pub fn is_constant(&self) -> bool {
        matches!(self, Value::ConstInt(_) | Value::ConstFloat(_) | Value::ConstZero(_))
    }

    pub fn as_instruction(&self) -> Option<InstId> {
        match self {
            Value::Instruction(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionId> {
        match self {
            Value::Function(id) => Some(*id),
            _ => None,
        }
    }
}

/// One operand slot referencing a value: `operands[operand]` of `inst`
/// in `function`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Use {
    pub function: FunctionId,
    pub inst: InstId,
    pub operand: usize,
}
