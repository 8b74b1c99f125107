//! Textual IR output
//!
//! Renders a module in an LLVM-like syntax. Instruction results are named
//! `%N` after their handle, arguments `%argN`, and globals and functions
//! `@name`.

use std::fmt;
use crate::ir::{Function, Instruction, IrType, Module, Opcode, TypeId, Value};

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;

        for (_, global) in self.globals() {
            writeln!(
                f,
                "@{} = global {} {}",
                global.name,
                self.types.display(global.content_type),
                self.value_name(None, global.initializer)
            )?;
        }

        for (_, function) in self.functions() {
            writeln!(f)?;
            self.write_function(f, function)?;
        }
        Ok(())
    }
}

impl Module {
    fn write_function(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        let keyword = if function.is_declaration() { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.types.display(function.return_type), function.name)?;
        for (i, arg) in function.args().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} %arg{i}", self.types.display(arg.ty))?;
        }
        write!(f, ")")?;

        if function.is_declaration() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for block in function.blocks() {
            writeln!(f, "{}:", block.name)?;
            for &id in block.instructions() {
                if let Some(inst) = function.instruction(id) {
                    write!(f, "  ")?;
                    if inst.ty != TypeId::VOID {
                        write!(f, "%{} = ", id.0)?;
                    }
                    self.write_instruction(f, function, inst)?;
                    writeln!(f)?;
                }
            }
        }
        writeln!(f, "}}")
    }

    fn write_instruction(&self, f: &mut fmt::Formatter<'_>, function: &Function, inst: &Instruction) -> fmt::Result {
        let operand = |i: usize| -> String {
            inst.operand(i)
                .map(|v| self.typed_value(Some(function), v))
                .unwrap_or_default()
        };
        let block_name = |b| function.block(b).map(|bb| bb.name.as_str()).unwrap_or("?");

        match inst.opcode {
            Opcode::Alloca(ty) => write!(f, "alloca {}", self.types.display(ty)),
            Opcode::Load => write!(f, "load {}, {}", self.types.display(inst.ty), operand(0)),
            Opcode::Store => write!(f, "store {}, {}", operand(0), operand(1)),
            Opcode::GetElementPtr => {
                write!(f, "getelementptr {}", operand(0))?;
                for i in 1..inst.operands().len() {
                    write!(f, ", {}", operand(i))?;
                }
                Ok(())
            }
            Opcode::Binary(op) => write!(f, "{op} {}, {}", operand(0), self.bare_operand(function, inst, 1)),
            Opcode::ICmp(pred) => write!(f, "icmp {pred} {}, {}", operand(0), self.bare_operand(function, inst, 1)),
            Opcode::FCmp(pred) => write!(f, "fcmp {pred} {}, {}", operand(0), self.bare_operand(function, inst, 1)),
            Opcode::Cast(op) => write!(f, "{op} {} to {}", operand(0), self.types.display(inst.ty)),
            Opcode::Br(target) => write!(f, "br label %{}", block_name(target)),
            Opcode::CondBr { then_block, else_block } => write!(
                f,
                "br {}, label %{}, label %{}",
                operand(0),
                block_name(then_block),
                block_name(else_block)
            ),
            Opcode::Call => {
                let callee = inst.callee().unwrap_or(Value::ConstInt(0));
                write!(
                    f,
                    "call {} {}(",
                    self.types.display(inst.ty),
                    self.value_name(Some(function), callee)
                )?;
                for i in 1..inst.operands().len() {
                    if i > 1 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", operand(i))?;
                }
                write!(f, ")")
            }
            Opcode::Ret => write!(f, "ret {}", operand(0)),
            Opcode::RetVoid => write!(f, "ret void"),
        }
    }

    fn bare_operand(&self, function: &Function, inst: &Instruction, index: usize) -> String {
        inst.operand(index)
            .map(|v| self.value_name(Some(function), v))
            .unwrap_or_default()
    }

    fn typed_value(&self, function: Option<&Function>, value: Value) -> String {
        let ty = match value {
            Value::Argument(i) => function.and_then(|f| f.args().get(i as usize)).map(|a| a.ty),
            Value::Instruction(id) => function.and_then(|f| f.instruction(id)).map(|i| i.ty),
            Value::Global(id) => self.global(id).map(|g| g.ty),
            Value::Function(id) => self.function(id).map(|callee| callee.ty),
            Value::ConstInt(_) => Some(TypeId::INT32),
            Value::ConstFloat(_) => Some(TypeId::FLOAT32),
            Value::ConstZero(ty) => Some(ty),
        };
        match ty {
            Some(ty) => format!("{} {}", self.types.display(ty), self.value_name(function, value)),
            None => self.value_name(function, value),
        }
    }

    fn value_name(&self, function: Option<&Function>, value: Value) -> String {
        match value {
            Value::ConstInt(v) => v.to_string(),
            Value::ConstFloat(v) => format!("{v:e}"),
            Value::ConstZero(ty) => match self.types.get(ty) {
                IrType::Array { .. } => "zeroinitializer".to_string(),
                IrType::Float32 => format!("{:e}", 0.0f32),
                _ => "0".to_string(),
            },
            Value::Global(id) => self
                .global(id)
                .map(|g| format!("@{}", g.name))
                .unwrap_or_else(|| "@?".to_string()),
            Value::Function(id) => self
                .function(id)
                .map(|callee| format!("@{}", callee.name))
                .unwrap_or_else(|| "@?".to_string()),
            Value::Argument(i) => format!("%arg{i}"),
            Value::Instruction(id) => match function {
                Some(_) => format!("%{}", id.0),
                None => "%?".to_string(),
            },
        }
    }
}
