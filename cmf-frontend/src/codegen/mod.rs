//! Code generation from the syntax tree to IR
//!
//! This module lowers a [`Program`](crate::ast::Program) into an IR
//! [`Module`](crate::ir::Module). The [`CodeGenerator`] handles top-level
//! declarations and hands function bodies to a [`StatementGenerator`],
//! which in turn creates an [`ExpressionGenerator`] for every expression.
//! Each expression lowering returns the value it produced.

mod errors;
mod scope;
pub mod expressions;
pub mod statements;
pub mod generator;

pub use errors::CodegenError;
pub use scope::Scope;
pub use generator::CodeGenerator;
pub use statements::StatementGenerator;
pub use expressions::ExpressionGenerator;

use crate::ast::TypeSpecifier;
use crate::ir::{IrBuilder, TypeId, Value};

/// Name of the runtime routine called on a negative array index
pub const NEG_INDEX_HANDLER: &str = "neg_idx_except";

/// IR type of a declared int/float element; `void` objects are rejected
pub(crate) fn element_type(ty: TypeSpecifier, name: &str) -> Result<TypeId, CodegenError> {
    match ty {
        TypeSpecifier::Int => Ok(TypeId::INT32),
        TypeSpecifier::Float => Ok(TypeId::FLOAT32),
        TypeSpecifier::Void => Err(CodegenError::InvalidType {
            name: name.to_string(),
            ty,
        }),
    }
}

/// Return type of a function declaration
pub(crate) fn return_type(ty: TypeSpecifier) -> TypeId {
    match ty {
        TypeSpecifier::Int => TypeId::INT32,
        TypeSpecifier::Float => TypeId::FLOAT32,
        TypeSpecifier::Void => TypeId::VOID,
    }
}

/// Terminate the current block with the zero of the function's return type
pub(crate) fn emit_default_return(builder: &mut IrBuilder) -> Result<(), CodegenError> {
    let ret = builder.return_type()?;
    if ret == TypeId::VOID {
        builder.create_void_ret()?;
    } else if ret == TypeId::FLOAT32 {
        builder.create_ret(Value::ConstFloat(0.0))?;
    } else {
        builder.create_ret(Value::ConstInt(0))?;
    }
    Ok(())
}
