//! C-minus-f Compiler - Common Types and Utilities
//!
//! This crate contains the error and diagnostic types shared by every
//! component of the compiler (frontend, optimizer and driver).

pub mod error;

pub use error::{CompilerError, Diagnostic};
