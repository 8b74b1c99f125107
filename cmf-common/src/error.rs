//! Error handling for the C-minus-f compiler
//!
//! This module defines the umbrella error type returned by the public entry
//! points of every compiler phase, plus the diagnostic shown to the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main compiler error type that encompasses all phases of compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Invalid syntax tree: {message}")]
    InvalidInput { message: String },

    #[error("Code generation error: {message}")]
    CodegenError { message: String },

    #[error("IR verification failed: {message}")]
    VerifyError { message: String },
}

impl CompilerError {
    /// Create an error for a syntax tree that could not be read
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CompilerError::InvalidInput { message: message.into() }
    }

    /// Create a codegen error
    pub fn codegen_error(message: impl Into<String>) -> Self {
        CompilerError::CodegenError { message: message.into() }
    }

    /// Create a verification error
    pub fn verify_error(message: impl Into<String>) -> Self {
        CompilerError::VerifyError { message: message.into() }
    }

    /// Turn this error into the diagnostic printed by the driver
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.to_string())
    }
}

/// A fatal diagnostic printed once before the driver exits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_from_error() {
        let err = CompilerError::codegen_error("undefined variable 'x'");
        let diag = err.to_diagnostic();
        assert_eq!(diag.to_string(), "error: Code generation error: undefined variable 'x'");
    }

    #[test]
    fn test_verify_error_message() {
        let err = CompilerError::verify_error("block 'entry' of 'main' has no terminator");
        assert_eq!(
            err.to_diagnostic().to_string(),
            "error: IR verification failed: block 'entry' of 'main' has no terminator"
        );
    }
}
