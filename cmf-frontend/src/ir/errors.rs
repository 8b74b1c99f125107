//! IR error types

use thiserror::Error;
use crate::ir::{BlockId, FunctionId, InstId, Value};

/// Misuse of the IR construction API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IrError {
    #[error("No insertion point set")]
    NoInsertPoint,

    #[error("Unknown function {0}")]
    UnknownFunction(FunctionId),

    #[error("Unknown block {0}")]
    UnknownBlock(BlockId),

    #[error("Unknown instruction {0}")]
    UnknownInstruction(InstId),

    #[error("Block {block} of '{function}' is already terminated")]
    BlockTerminated { function: String, block: BlockId },

    #[error("Cannot insert at position {index} of block {block}")]
    InvalidPosition { block: BlockId, index: usize },

    #[error("Operand {0:?} does not name a live value")]
    InvalidOperand(Value),

    #[error("Instruction {inst} has no operand {index}")]
    InvalidOperandIndex { inst: InstId, index: usize },

    #[error("Expected a pointer operand for {instruction}, found {found}")]
    NotAPointer { instruction: &'static str, found: String },

    #[error("Cannot index into non-aggregate type {found}")]
    NotAggregate { found: String },

    #[error("Callee is not a function: {found}")]
    NotCallable { found: String },
}

/// Structural inconsistency found by [`crate::ir::Module::verify`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error("In '{function}': {inst} uses {value} at operand {operand}, but the use list does not record it")]
    MissingUse {
        function: String,
        inst: InstId,
        operand: usize,
        value: String,
    },

    #[error("In '{function}': use list of {value} records {inst} operand {operand}, which does not reference it")]
    StaleUse {
        function: String,
        inst: InstId,
        operand: usize,
        value: String,
    },

    #[error("In '{function}': block {block} does not end in a terminator")]
    Unterminated { function: String, block: String },

    #[error("In '{function}': block {block} has a terminator before its last instruction")]
    TerminatorNotLast { function: String, block: String },

    #[error("In '{function}': instruction {inst} is listed in block {block} but claims another parent")]
    WrongParent { function: String, inst: InstId, block: String },

    #[error("In '{function}': predecessor list of block {block} disagrees with the branches targeting it")]
    PredecessorMismatch { function: String, block: String },
}
