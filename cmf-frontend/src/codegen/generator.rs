//! Top-level code generation
//!
//! Declares the runtime library, registers every function so calls may
//! precede definitions, then lowers globals and function bodies in source
//! order.

use log::{debug, trace};
use crate::ast::{Declaration, FunDeclaration, Program, VarDeclaration};
use crate::ir::{FunctionId, IrBuilder, Module, TypeId, Value};
use super::{element_type, emit_default_return, return_type, CodegenError, Scope, NEG_INDEX_HANDLER};
use super::statements::StatementGenerator;

/// Code generator - transforms a syntax tree into an IR module
pub struct CodeGenerator {
    builder: IrBuilder,
    scope: Scope,
}

impl CodeGenerator {
    pub fn new(module_name: String) -> Self {
        Self {
            builder: IrBuilder::new(module_name),
            scope: Scope::new(),
        }
    }

    /// Generate the IR module for `program`
    pub fn generate(mut self, program: &Program) -> Result<Module, CodegenError> {
        let trap = self.declare_runtime()?;

        for decl in &program.declarations {
            if let Declaration::Fun(func) = decl {
                self.declare_function(func)?;
            }
        }

        for decl in &program.declarations {
            match decl {
                Declaration::Var(var) => self.generate_global(var)?,
                Declaration::Fun(func) => self.generate_function(func, trap)?,
            }
        }

        Ok(self.builder.finish())
    }

    /// Declare the runtime functions in the global scope, returning the
    /// negative-index handler
    fn declare_runtime(&mut self) -> Result<FunctionId, CodegenError> {
        let runtime: [(&str, TypeId, Vec<TypeId>); 4] = [
            ("input", TypeId::INT32, vec![]),
            ("output", TypeId::VOID, vec![TypeId::INT32]),
            ("outputFloat", TypeId::VOID, vec![TypeId::FLOAT32]),
            (NEG_INDEX_HANDLER, TypeId::VOID, vec![]),
        ];

        let mut trap = None;
        for (name, ret, params) in runtime {
            let id = self.builder.add_function(name, ret, params);
            self.bind(name, Value::Function(id))?;
            if name == NEG_INDEX_HANDLER {
                trap = Some(id);
            }
        }
        trap.ok_or_else(|| CodegenError::UndefinedFunction {
            name: NEG_INDEX_HANDLER.to_string(),
        })
    }

    fn declare_function(&mut self, func: &FunDeclaration) -> Result<(), CodegenError> {
        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            let elem = element_type(param.ty, &param.id)?;
            // Array parameters decay to pointers to their element
            params.push(if param.is_array {
                self.builder.types().pointer_to(elem)
            } else {
                elem
            });
        }

        let id = self.builder.add_function(&func.id, return_type(func.ty), params);
        self.bind(&func.id, Value::Function(id))
    }

    fn generate_global(&mut self, var: &VarDeclaration) -> Result<(), CodegenError> {
        let elem = element_type(var.ty, &var.id)?;
        let content = match var.array_len {
            Some(len) => self.builder.types().array_of(elem, len),
            None => elem,
        };
        let id = self.builder.add_global(&var.id, content);
        trace!("Declared global '{}'", var.id);
        self.bind(&var.id, Value::Global(id))
    }

    fn generate_function(&mut self, func: &FunDeclaration, trap: FunctionId) -> Result<(), CodegenError> {
        let id = match self.scope.find(&func.id) {
            Some(Value::Function(id)) => id,
            _ => {
                return Err(CodegenError::UndefinedFunction {
                    name: func.id.clone(),
                })
            }
        };
        debug!("Lowering function '{}'", func.id);

        self.builder.start_function(id)?;
        self.scope.enter();

        // Parameters live in stack slots like any other local
        for (index, param) in func.params.iter().enumerate() {
            let arg = Value::Argument(index as u32);
            let ty = self.builder.type_of(arg)?;
            let slot = self.builder.create_alloca(ty)?;
            self.builder.create_store(arg, slot)?;
            self.bind(&param.id, slot)?;
        }

        let mut stmt_gen = StatementGenerator {
            builder: &mut self.builder,
            scope: &mut self.scope,
            trap,
        };
        stmt_gen.generate_compound(&func.body)?;

        if !self.builder.is_terminated() {
            emit_default_return(&mut self.builder)?;
        }

        self.scope.exit();
        self.builder.finish_function();
        Ok(())
    }

    fn bind(&mut self, name: &str, value: Value) -> Result<(), CodegenError> {
        if self.scope.push(name, value) {
            Ok(())
        } else {
            Err(CodegenError::Redefinition {
                name: name.to_string(),
            })
        }
    }
}
