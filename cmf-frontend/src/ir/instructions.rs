//! IR Instructions
//!
//! An instruction is an [`Opcode`] plus an ordered operand list. Operand
//! layout per opcode:
//!
//! | opcode          | operands                 |
//! |-----------------|--------------------------|
//! | `Load`          | `[ptr]`                  |
//! | `Store`         | `[value, ptr]`           |
//! | `GetElementPtr` | `[base, index...]`       |
//! | `Binary`, `*Cmp`| `[lhs, rhs]`             |
//! | `Cast`          | `[value]`                |
//! | `CondBr`        | `[condition]`            |
//! | `Call`          | `[callee, arg...]`       |
//! | `Ret`           | `[value]`                |
//!
//! Operands are only reachable through [`Instruction::operands`]; all
//! mutation goes through [`crate::ir::Module`] so use lists stay in sync.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{BlockId, TypeId, Use, Value};

/// Arithmetic operations, integer and float variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

/// Comparison predicates shared by `icmp` and `fcmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpPredicate {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    /// int32 -> float32
    SiToFp,
    /// float32 -> int32
    FpToSi,
    /// int1 -> int32
    ZExt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// Stack slot holding a value of the given type
    Alloca(TypeId),
    Load,
    Store,
    GetElementPtr,
    Binary(BinaryOp),
    ICmp(CmpPredicate),
    FCmp(CmpPredicate),
    Cast(CastOp),
    Br(BlockId),
    CondBr { then_block: BlockId, else_block: BlockId },
    Call,
    Ret,
    RetVoid,
}

impl Opcode {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Br(_) | Opcode::CondBr { .. } | Opcode::Ret | Opcode::RetVoid)
    }

    /// Blocks this terminator may transfer control to
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Opcode::Br(target) => vec![*target],
            Opcode::CondBr { then_block, else_block } => vec![*then_block, *else_block],
            _ => Vec::new(),
        }
    }
}

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Result type; `void` for instructions that produce no value
    pub ty: TypeId,
    /// Owning block
    pub parent: BlockId,
    pub(crate) operands: Vec<Value>,
    pub(crate) uses: Vec<Use>,
}

impl Instruction {
    pub(crate) fn new(opcode: Opcode, ty: TypeId, parent: BlockId) -> Self {
        Self {
            opcode,
            ty,
            parent,
            operands: Vec::new(),
            uses: Vec::new(),
        }
    }

    pub fn operands(&self) -> &[Value] {
        &self.operands
    }

    pub fn operand(&self, index: usize) -> Option<Value> {
        self.operands.get(index).copied()
    }

    /// Sites that use this instruction's result
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }

    pub fn is_store(&self) -> bool {
        matches!(self.opcode, Opcode::Store)
    }

    pub fn is_call(&self) -> bool {
        matches!(self.opcode, Opcode::Call)
    }

    pub fn is_alloca(&self) -> bool {
        matches!(self.opcode, Opcode::Alloca(_))
    }

    /// Address operand of a load, store or GEP
    pub fn pointer_operand(&self) -> Option<Value> {
        match self.opcode {
            Opcode::Load => self.operand(0),
            Opcode::Store => self.operand(1),
            Opcode::GetElementPtr => self.operand(0),
            _ => None,
        }
    }

    /// Callee of a call instruction
    pub fn callee(&self) -> Option<Value> {
        match self.opcode {
            Opcode::Call => self.operand(0),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::SDiv => "sdiv",
            BinaryOp::FAdd => "fadd",
            BinaryOp::FSub => "fsub",
            BinaryOp::FMul => "fmul",
            BinaryOp::FDiv => "fdiv",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpPredicate::Lt => "lt",
            CmpPredicate::Le => "le",
            CmpPredicate::Gt => "gt",
            CmpPredicate::Ge => "ge",
            CmpPredicate::Eq => "eq",
            CmpPredicate::Ne => "ne",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastOp::SiToFp => write!(f, "sitofp"),
            CastOp::FpToSi => write!(f, "fptosi"),
            CastOp::ZExt => write!(f, "zext"),
        }
    }
}
