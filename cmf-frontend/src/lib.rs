//! C-minus-f Compiler - Frontend
//!
//! This crate provides the frontend components for the C-minus-f compiler:
//! - AST: the syntax tree handed over by the parser (as JSON)
//! - IR: the typed, use-list based intermediate representation
//! - Codegen: lowering of the syntax tree into IR

pub mod ast;
pub mod codegen;
pub mod ir;

pub use ast::{Declaration, Expression, Program, Statement, TypeSpecifier};
pub use codegen::{CodeGenerator, CodegenError};

use cmf_common::CompilerError;
use log::debug;
use crate::ir::Module;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Read a syntax tree serialized as JSON
    pub fn load_ast(json: &str) -> Result<Program, CompilerError> {
        serde_json::from_str(json).map_err(|e| CompilerError::invalid_input(e.to_string()))
    }

    /// Lower a syntax tree to an IR module
    pub fn compile_to_ir(program: &Program, module_name: &str) -> Result<Module, CompilerError> {
        let codegen = CodeGenerator::new(module_name.to_string());
        let module = codegen.generate(program)?;
        debug!(
            "Lowered '{}': {} functions, {} instructions",
            module_name,
            module.functions().count(),
            module.instruction_count()
        );

        module
            .verify()
            .map_err(|e| CompilerError::verify_error(e.to_string()))?;
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_ast_from_json() {
        let json = r#"{
            "declarations": [
                { "Var": { "ty": "Int", "id": "g", "array_len": 4 } },
                { "Fun": {
                    "ty": "Int",
                    "id": "main",
                    "params": [],
                    "body": {
                        "local_declarations": [],
                        "statements": [
                            { "Return": { "Num": { "ty": "Int", "int_value": 0, "float_value": 0.0 } } }
                        ]
                    }
                } }
            ]
        }"#;

        let program = Frontend::load_ast(json).unwrap();
        assert_eq!(program.declarations.len(), 2);
        match &program.declarations[1] {
            Declaration::Fun(func) => {
                assert_eq!(func.id, "main");
                assert_eq!(func.body.statements, vec![Statement::ret(Expression::int(0))]);
            }
            other => panic!("Expected function declaration, got {other:?}"),
        }

        let module = Frontend::compile_to_ir(&program, "json").unwrap();
        assert!(module.find_global("g").is_some());
        assert!(module.find_function("main").is_some());
    }

    #[test]
    fn test_load_ast_rejects_malformed_json() {
        let err = Frontend::load_ast(r#"{ "declarations": [ { "Class": {} } ] }"#).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidInput { .. }));
    }

    #[test]
    fn test_codegen_error_becomes_compiler_error() {
        let program = Program {
            declarations: vec![Declaration::Fun(ast::FunDeclaration {
                ty: TypeSpecifier::Void,
                id: "main".to_string(),
                params: vec![],
                body: ast::CompoundStmt {
                    local_declarations: vec![],
                    statements: vec![Statement::expr(Expression::var("missing"))],
                },
            })],
        };

        let err = Frontend::compile_to_ir(&program, "bad").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Code generation error: Undefined variable 'missing'"
        );
    }
}
