//! Statement code generation

use log::trace;
use crate::ast::{CompoundStmt, Expression, Statement, VarDeclaration};
use crate::ir::{CmpPredicate, FunctionId, IrBuilder, TypeId, Value};
use super::expressions::ExpressionGenerator;
use super::{element_type, CodegenError, Scope};

/// Statement generator context
pub struct StatementGenerator<'a> {
    pub builder: &'a mut IrBuilder,
    pub scope: &'a mut Scope,
    /// Runtime routine called on a negative array index
    pub trap: FunctionId,
}

impl<'a> StatementGenerator<'a> {
    /// Generate IR for a statement
    pub fn generate(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        match stmt {
            Statement::Compound(compound) => self.generate_compound(compound),

            Statement::Expression(Some(expr)) => {
                let mut expr_gen = self.create_expression_generator();
                expr_gen.generate(expr)?;
                Ok(())
            }

            Statement::Expression(None) => Ok(()),

            Statement::Selection { condition, then_stmt, else_stmt } => {
                self.generate_if(condition, then_stmt, else_stmt.as_deref())
            }

            Statement::Iteration { condition, body } => self.generate_while(condition, body),

            Statement::Return(expr) => self.generate_return(expr.as_ref()),
        }
    }

    /// Generate a `{ ... }` block in its own scope
    ///
    /// Statements after one that terminates the current block are not
    /// lowered.
    pub fn generate_compound(&mut self, compound: &CompoundStmt) -> Result<(), CodegenError> {
        self.scope.enter();

        for decl in &compound.local_declarations {
            self.generate_local(decl)?;
        }

        for stmt in &compound.statements {
            if self.builder.is_terminated() {
                trace!("Skipping statements after a terminator");
                break;
            }
            self.generate(stmt)?;
        }

        self.scope.exit();
        Ok(())
    }

    fn generate_local(&mut self, decl: &VarDeclaration) -> Result<(), CodegenError> {
        let elem = element_type(decl.ty, &decl.id)?;
        let content = match decl.array_len {
            Some(len) => self.builder.types().array_of(elem, len),
            None => elem,
        };
        let slot = self.builder.create_alloca(content)?;
        if self.scope.push(&decl.id, slot) {
            Ok(())
        } else {
            Err(CodegenError::Redefinition {
                name: decl.id.clone(),
            })
        }
    }

    /// Lower a condition and compare it against zero of its own type
    fn generate_condition(&mut self, condition: &Expression) -> Result<Value, CodegenError> {
        let mut expr_gen = self.create_expression_generator();
        let value = expr_gen.generate(condition)?;
        let ty = self.builder.type_of(value)?;

        if ty == TypeId::INT32 {
            Ok(self.builder.create_icmp(CmpPredicate::Ne, value, Value::ConstInt(0))?)
        } else if ty == TypeId::FLOAT32 {
            Ok(self.builder.create_fcmp(CmpPredicate::Ne, value, Value::ConstFloat(0.0))?)
        } else {
            Err(CodegenError::TypeMismatch {
                context: "condition".to_string(),
                expected: "int or float".to_string(),
                found: self.builder.module().types.display(ty).to_string(),
            })
        }
    }

    fn generate_if(
        &mut self,
        condition: &Expression,
        then_stmt: &Statement,
        else_stmt: Option<&Statement>,
    ) -> Result<(), CodegenError> {
        let cond = self.generate_condition(condition)?;

        let then_block = self.builder.create_block("then")?;
        let else_block = match else_stmt {
            Some(_) => Some(self.builder.create_block("else")?),
            None => None,
        };
        let end_block = self.builder.create_block("end")?;

        self.builder
            .create_cond_br(cond, then_block, else_block.unwrap_or(end_block))?;

        self.builder.set_insert_point(then_block);
        self.generate(then_stmt)?;
        if !self.builder.is_terminated() {
            self.builder.create_br(end_block)?;
        }

        if let (Some(block), Some(stmt)) = (else_block, else_stmt) {
            self.builder.set_insert_point(block);
            self.generate(stmt)?;
            if !self.builder.is_terminated() {
                self.builder.create_br(end_block)?;
            }
        }

        self.builder.set_insert_point(end_block);
        Ok(())
    }

    fn generate_while(&mut self, condition: &Expression, body: &Statement) -> Result<(), CodegenError> {
        let cond_block = self.builder.create_block("loop.cond")?;
        let body_block = self.builder.create_block("loop.body")?;
        let end_block = self.builder.create_block("loop.end")?;

        self.builder.create_br(cond_block)?;

        // The condition is re-evaluated on every iteration
        self.builder.set_insert_point(cond_block);
        let cond = self.generate_condition(condition)?;
        self.builder.create_cond_br(cond, body_block, end_block)?;

        self.builder.set_insert_point(body_block);
        self.generate(body)?;
        if !self.builder.is_terminated() {
            self.builder.create_br(cond_block)?;
        }

        self.builder.set_insert_point(end_block);
        Ok(())
    }

    fn generate_return(&mut self, expr: Option<&Expression>) -> Result<(), CodegenError> {
        let ret = self.builder.return_type()?;

        match (expr, ret == TypeId::VOID) {
            (None, true) => {
                self.builder.create_void_ret()?;
            }
            (Some(expr), false) => {
                let mut expr_gen = self.create_expression_generator();
                let value = expr_gen.generate(expr)?;
                let value = expr_gen.coerce(value, ret, "return value")?;
                self.builder.create_ret(value)?;
            }
            _ => return Err(self.return_mismatch(ret)),
        }
        Ok(())
    }

    fn return_mismatch(&self, ret: TypeId) -> CodegenError {
        let module = self.builder.module();
        let function = self
            .builder
            .current_function()
            .ok()
            .and_then(|id| module.function(id))
            .map(|f| f.name.clone())
            .unwrap_or_default();
        CodegenError::ReturnTypeMismatch {
            function,
            ty: module.types.display(ret).to_string(),
        }
    }

    /// Create an expression generator sharing this context
    pub fn create_expression_generator(&mut self) -> ExpressionGenerator<'_> {
        ExpressionGenerator {
            builder: self.builder,
            scope: self.scope,
            trap: self.trap,
        }
    }
}
