//! Intermediate Representation for C-minus-f
//!
//! An SSA-style IR with explicit use lists: every operand slot that names
//! a value is recorded in that value's use list, and every block knows its
//! predecessors and successors. Passes query these directly instead of
//! rescanning function bodies.
//!
//! ## Architecture
//!
//! - `types` - Interned type system (TypeTable, TypeId)
//! - `values` - Entity handles and the Value operand type
//! - `instructions` - Opcodes and instructions
//! - `blocks` - Basic block management
//! - `function` - Function definitions
//! - `module` - Module, global variables, and all use-list mutation
//! - `builder` - IR construction utilities
//! - `verify` - Structural consistency checks
//! - `printer` - Textual output

// Public exports - clean API surface
pub use self::types::{IrType, TypeDisplay, TypeId, TypeTable};
pub use self::values::{BlockId, FunctionId, GlobalId, InstId, Use, Value};
pub use self::instructions::{BinaryOp, CastOp, CmpPredicate, Instruction, Opcode};
pub use self::blocks::BasicBlock;
pub use self::function::{Argument, Function};
pub use self::module::{GlobalVariable, Module};
pub use self::builder::IrBuilder;
pub use self::errors::{IrError, VerifyError};

// Internal modules
mod types;
mod values;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
mod errors;
mod verify;
mod printer;

#[cfg(test)]
mod tests;
