//! Expression code generation
//!
//! Every `generate_*` method returns the value it produced. Mixed int/float
//! operands are promoted to float; relational results are widened to i32.

use crate::ast::{AddOp, Expression, MulOp, Number, RelOp, TypeSpecifier, Var};
use crate::ir::{BinaryOp, CmpPredicate, FunctionId, IrBuilder, IrError, TypeId, Value};
use super::{emit_default_return, CodegenError, Scope};

/// Expression generator context
pub struct ExpressionGenerator<'a> {
    pub builder: &'a mut IrBuilder,
    pub scope: &'a Scope,
    pub trap: FunctionId,
}

impl<'a> ExpressionGenerator<'a> {
    /// Generate IR for an expression in value context
    pub fn generate(&mut self, expr: &Expression) -> Result<Value, CodegenError> {
        match expr {
            Expression::Num(number) => self.generate_number(number),

            Expression::Var(var) => self.generate_var(var, false),

            Expression::Assign { var, value } => self.generate_assign(var, value),

            Expression::Relational { op, lhs, rhs } => self.generate_relational(*op, lhs, rhs),

            Expression::Additive { op, lhs, rhs } => {
                let ops = match op {
                    AddOp::Plus => (BinaryOp::Add, BinaryOp::FAdd),
                    AddOp::Minus => (BinaryOp::Sub, BinaryOp::FSub),
                };
                self.generate_arithmetic(ops, lhs, rhs)
            }

            Expression::Multiplicative { op, lhs, rhs } => {
                let ops = match op {
                    MulOp::Mul => (BinaryOp::Mul, BinaryOp::FMul),
                    MulOp::Div => (BinaryOp::SDiv, BinaryOp::FDiv),
                };
                self.generate_arithmetic(ops, lhs, rhs)
            }

            Expression::Call { callee, args } => self.generate_call(callee, args),
        }
    }

    fn generate_number(&mut self, number: &Number) -> Result<Value, CodegenError> {
        match number.ty {
            TypeSpecifier::Int => Ok(Value::ConstInt(number.int_value)),
            TypeSpecifier::Float => Ok(Value::ConstFloat(number.float_value)),
            ty => Err(CodegenError::UnsupportedLiteral { ty }),
        }
    }

    /// Resolve a variable to its storage location
    fn lookup_variable(&self, name: &str) -> Result<Value, CodegenError> {
        match self.scope.find(name) {
            Some(Value::Function(_)) => Err(CodegenError::NotAVariable {
                name: name.to_string(),
            }),
            Some(slot) => Ok(slot),
            None => Err(CodegenError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    /// Lower a variable reference
    ///
    /// With `as_address` the storage address is returned instead of the
    /// loaded value (assignment targets).
    pub fn generate_var(&mut self, var: &Var, as_address: bool) -> Result<Value, CodegenError> {
        let slot = self.lookup_variable(&var.id)?;
        let slot_ty = self.builder.type_of(slot)?;
        let types = &self.builder.module().types;
        let content = types.pointee(slot_ty).ok_or_else(|| IrError::NotAPointer {
            instruction: "variable access",
            found: types.display(slot_ty).to_string(),
        })?;
        let is_array = types.is_array(content);
        let is_pointer = types.is_pointer(content);

        let Some(index) = &var.index else {
            if (is_array || is_pointer) && as_address {
                return Err(CodegenError::InvalidAssignment {
                    name: var.id.clone(),
                });
            }
            return if is_array {
                // Arrays decay to the address of their first element
                Ok(self
                    .builder
                    .create_gep(slot, vec![Value::ConstInt(0), Value::ConstInt(0)])?)
            } else if as_address {
                Ok(slot)
            } else {
                Ok(self.builder.create_load(slot)?)
            };
        };

        if !is_array && !is_pointer {
            return Err(CodegenError::NotIndexable {
                name: var.id.clone(),
            });
        }

        let index = self.generate(index)?;
        let index = self.coerce(index, TypeId::INT32, "array index")?;
        self.generate_bounds_check(index)?;

        let address = if is_pointer {
            let base = self.builder.create_load(slot)?;
            self.builder.create_gep(base, vec![index])?
        } else {
            self.builder
                .create_gep(slot, vec![Value::ConstInt(0), index])?
        };

        if as_address {
            Ok(address)
        } else {
            Ok(self.builder.create_load(address)?)
        }
    }

    /// Branch to a trap block when `index` is negative
    ///
    /// The trap block calls the runtime handler and returns the default
    /// value; the insertion point is left in the non-negative block.
    fn generate_bounds_check(&mut self, index: Value) -> Result<(), CodegenError> {
        let non_negative = self
            .builder
            .create_icmp(CmpPredicate::Ge, index, Value::ConstInt(0))?;
        let ok_block = self.builder.create_block("idx.ok")?;
        let trap_block = self.builder.create_block("idx.neg")?;
        self.builder.create_cond_br(non_negative, ok_block, trap_block)?;

        self.builder.set_insert_point(trap_block);
        self.builder.create_call(self.trap, Vec::new())?;
        emit_default_return(self.builder)?;

        self.builder.set_insert_point(ok_block);
        Ok(())
    }

    fn generate_assign(&mut self, var: &Var, value: &Expression) -> Result<Value, CodegenError> {
        let address = self.generate_var(var, true)?;
        let value = self.generate(value)?;

        // The stored type wins
        let address_ty = self.builder.type_of(address)?;
        let target = self
            .builder
            .module()
            .types
            .pointee(address_ty)
            .ok_or(IrError::InvalidOperand(address))?;
        let value = self.coerce(value, target, "assignment")?;

        self.builder.create_store(value, address)?;
        Ok(value)
    }

    /// Lower both operands of a binary expression, promoting the int side
    /// to float when the other side is float
    fn generate_operands(&mut self, lhs: &Expression, rhs: &Expression) -> Result<(Value, Value, bool), CodegenError> {
        let lhs = self.generate(lhs)?;
        let rhs = self.generate(rhs)?;
        let lhs_ty = self.arithmetic_type(lhs)?;
        let rhs_ty = self.arithmetic_type(rhs)?;

        if lhs_ty == rhs_ty {
            return Ok((lhs, rhs, lhs_ty == TypeId::FLOAT32));
        }
        if lhs_ty == TypeId::INT32 {
            let lhs = self.builder.create_sitofp(lhs)?;
            Ok((lhs, rhs, true))
        } else {
            let rhs = self.builder.create_sitofp(rhs)?;
            Ok((lhs, rhs, true))
        }
    }

    fn arithmetic_type(&self, value: Value) -> Result<TypeId, CodegenError> {
        let ty = self.builder.type_of(value)?;
        if ty == TypeId::INT32 || ty == TypeId::FLOAT32 {
            Ok(ty)
        } else {
            Err(CodegenError::TypeMismatch {
                context: "arithmetic operand".to_string(),
                expected: "int or float".to_string(),
                found: self.builder.module().types.display(ty).to_string(),
            })
        }
    }

    fn generate_arithmetic(
        &mut self,
        (int_op, float_op): (BinaryOp, BinaryOp),
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Value, CodegenError> {
        let (lhs, rhs, is_float) = self.generate_operands(lhs, rhs)?;
        let op = if is_float { float_op } else { int_op };
        Ok(self.builder.create_binary(op, lhs, rhs)?)
    }

    fn generate_relational(&mut self, op: RelOp, lhs: &Expression, rhs: &Expression) -> Result<Value, CodegenError> {
        let pred = match op {
            RelOp::Lt => CmpPredicate::Lt,
            RelOp::Le => CmpPredicate::Le,
            RelOp::Gt => CmpPredicate::Gt,
            RelOp::Ge => CmpPredicate::Ge,
            RelOp::Eq => CmpPredicate::Eq,
            RelOp::Ne => CmpPredicate::Ne,
        };

        let (lhs, rhs, is_float) = self.generate_operands(lhs, rhs)?;
        let cmp = if is_float {
            self.builder.create_fcmp(pred, lhs, rhs)?
        } else {
            self.builder.create_icmp(pred, lhs, rhs)?
        };
        Ok(self.builder.create_zext(cmp, TypeId::INT32)?)
    }

    fn generate_call(&mut self, name: &str, args: &[Expression]) -> Result<Value, CodegenError> {
        let callee = match self.scope.find(name) {
            Some(Value::Function(id)) => id,
            Some(_) => {
                return Err(CodegenError::NotAFunction {
                    name: name.to_string(),
                })
            }
            None => {
                return Err(CodegenError::UndefinedFunction {
                    name: name.to_string(),
                })
            }
        };

        let module = self.builder.module();
        let params: Vec<TypeId> = module
            .function(callee)
            .and_then(|f| module.types.signature(f.ty))
            .map(|(_, params)| params.to_vec())
            .ok_or(IrError::UnknownFunction(callee))?;

        if params.len() != args.len() {
            return Err(CodegenError::ArgumentCount {
                name: name.to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, &param) in args.iter().zip(&params) {
            let value = self.generate(arg)?;
            values.push(self.coerce(value, param, "call argument")?);
        }

        Ok(self.builder.create_call(callee, values)?)
    }

    /// Convert `value` to `target` with the int/float casts, or fail
    pub fn coerce(&mut self, value: Value, target: TypeId, context: &str) -> Result<Value, CodegenError> {
        let ty = self.builder.type_of(value)?;
        if ty == target {
            return Ok(value);
        }

        match (ty, target) {
            (TypeId::INT32, TypeId::FLOAT32) => Ok(self.builder.create_sitofp(value)?),
            (TypeId::FLOAT32, TypeId::INT32) => Ok(self.builder.create_fptosi(value)?),
            (TypeId::INT1, TypeId::INT32) => Ok(self.builder.create_zext(value, target)?),
            _ => {
                let types = &self.builder.module().types;
                Err(CodegenError::TypeMismatch {
                    context: context.to_string(),
                    expected: types.display(target).to_string(),
                    found: types.display(ty).to_string(),
                })
            }
        }
    }
}
