//! Code generation error types

use cmf_common::CompilerError;
use thiserror::Error;
use crate::ast::TypeSpecifier;
use crate::ir::IrError;

/// Lowering errors for syntax trees that no well-typed program produces
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("Unsupported literal of type '{ty}'")]
    UnsupportedLiteral { ty: TypeSpecifier },

    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    #[error("'{name}' is a function, not a variable")]
    NotAVariable { name: String },

    #[error("'{name}' is not an array or pointer and cannot be indexed")]
    NotIndexable { name: String },

    #[error("Cannot assign to array '{name}'")]
    InvalidAssignment { name: String },

    #[error("'{name}' cannot be declared with type '{ty}'")]
    InvalidType { name: String, ty: TypeSpecifier },

    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("Function '{name}' expects {expected} arguments, found {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Redefinition of '{name}'")]
    Redefinition { name: String },

    #[error("Return statement in '{function}' does not match its return type '{ty}'")]
    ReturnTypeMismatch { function: String, ty: String },

    #[error(transparent)]
    Ir(#[from] IrError),
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        CompilerError::codegen_error(err.to_string())
    }
}
