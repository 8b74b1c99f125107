//! IR Builder
//!
//! Provides utilities for constructing IR programmatically. The builder
//! owns the module under construction and an insertion point; every
//! `create_*` method appends at the insertion point, computes the result
//! type from the operand types, and returns the produced [`Value`].

use crate::ir::{
    BinaryOp, BlockId, CastOp, CmpPredicate, FunctionId, GlobalId, IrError, IrType, Module,
    Opcode, TypeId, Value,
};

/// Builder for constructing IR
pub struct IrBuilder {
    module: Module,
    current_function: Option<FunctionId>,
    current_block: Option<BlockId>,
}

impl IrBuilder {
    pub fn new(module_name: String) -> Self {
        Self {
            module: Module::new(module_name),
            current_function: None,
            current_block: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub fn finish(self) -> Module {
        self.module
    }

    pub fn types(&mut self) -> &mut crate::ir::TypeTable {
        &mut self.module.types
    }

    pub fn add_function(&mut self, name: &str, return_type: TypeId, param_types: Vec<TypeId>) -> FunctionId {
        self.module.add_function(name, return_type, param_types)
    }

    pub fn add_global(&mut self, name: &str, content_type: TypeId) -> GlobalId {
        self.module.add_global(name, content_type)
    }

    pub fn current_function(&self) -> Result<FunctionId, IrError> {
        self.current_function.ok_or(IrError::NoInsertPoint)
    }

    pub fn insert_block(&self) -> Result<BlockId, IrError> {
        self.current_block.ok_or(IrError::NoInsertPoint)
    }

    /// Make `function` current and append its entry block
    pub fn start_function(&mut self, function: FunctionId) -> Result<BlockId, IrError> {
        self.current_function = Some(function);
        let entry = self.module.append_block(function, "entry")?;
        self.current_block = Some(entry);
        Ok(entry)
    }

    pub fn finish_function(&mut self) {
        self.current_function = None;
        self.current_block = None;
    }

    /// Append a block to the current function without moving the insertion point
    pub fn create_block(&mut self, name: &str) -> Result<BlockId, IrError> {
        let function = self.current_function()?;
        self.module.append_block(function, name)
    }

    pub fn set_insert_point(&mut self, block: BlockId) {
        self.current_block = Some(block);
    }

    /// Whether the block at the insertion point already ends in a terminator
    pub fn is_terminated(&self) -> bool {
        match (self.current_function, self.current_block) {
            (Some(f), Some(b)) => self.module.function(f).is_some_and(|f| f.is_terminated(b)),
            _ => false,
        }
    }

    /// Type of `value` in the current function
    pub fn type_of(&self, value: Value) -> Result<TypeId, IrError> {
        let function = self.current_function()?;
        self.module
            .value_type(function, value)
            .ok_or(IrError::InvalidOperand(value))
    }

    pub fn return_type(&self) -> Result<TypeId, IrError> {
        let function = self.current_function()?;
        self.module
            .function(function)
            .map(|f| f.return_type)
            .ok_or(IrError::UnknownFunction(function))
    }

    fn append(&mut self, opcode: Opcode, ty: TypeId, operands: Vec<Value>) -> Result<Value, IrError> {
        let function = self.current_function()?;
        let block = self.insert_block()?;
        let id = self.module.append_instruction(function, block, opcode, ty, operands)?;
        Ok(Value::Instruction(id))
    }

    /// Allocate a stack slot at the top of the entry block
    ///
    /// Slots are kept in creation order ahead of all other instructions, so
    /// every slot dominates every use regardless of where it is declared.
    pub fn create_alloca(&mut self, ty: TypeId) -> Result<Value, IrError> {
        let function = self.current_function()?;
        let (entry, index) = {
            let f = self.module.function(function).ok_or(IrError::UnknownFunction(function))?;
            let entry = f.entry_block().ok_or(IrError::NoInsertPoint)?;
            let index = f
                .block(entry)
                .map(|bb| {
                    bb.instructions()
                        .iter()
                        .take_while(|&&i| f.instruction(i).is_some_and(|inst| inst.is_alloca()))
                        .count()
                })
                .unwrap_or(0);
            (entry, index)
        };
        let ptr_ty = self.module.types.pointer_to(ty);
        let id = self
            .module
            .insert_instruction(function, entry, index, Opcode::Alloca(ty), ptr_ty, Vec::new())?;
        Ok(Value::Instruction(id))
    }

    pub fn create_load(&mut self, ptr: Value) -> Result<Value, IrError> {
        let ptr_ty = self.type_of(ptr)?;
        let ty = self.module.types.pointee(ptr_ty).ok_or_else(|| IrError::NotAPointer {
            instruction: "load",
            found: self.module.types.display(ptr_ty).to_string(),
        })?;
        self.append(Opcode::Load, ty, vec![ptr])
    }

    pub fn create_store(&mut self, value: Value, ptr: Value) -> Result<Value, IrError> {
        let ptr_ty = self.type_of(ptr)?;
        if !self.module.types.is_pointer(ptr_ty) {
            return Err(IrError::NotAPointer {
                instruction: "store",
                found: self.module.types.display(ptr_ty).to_string(),
            });
        }
        self.append(Opcode::Store, TypeId::VOID, vec![value, ptr])
    }

    /// Address arithmetic: the first index steps over the base pointer,
    /// every following index steps into an array element
    pub fn create_gep(&mut self, base: Value, indices: Vec<Value>) -> Result<Value, IrError> {
        let base_ty = self.type_of(base)?;
        let types = &self.module.types;
        let mut elem = types.pointee(base_ty).ok_or_else(|| IrError::NotAPointer {
            instruction: "getelementptr",
            found: types.display(base_ty).to_string(),
        })?;
        for _ in indices.iter().skip(1) {
            elem = types.element(elem).ok_or_else(|| IrError::NotAggregate {
                found: types.display(elem).to_string(),
            })?;
        }
        let result_ty = self.module.types.pointer_to(elem);

        let mut operands = Vec::with_capacity(indices.len() + 1);
        operands.push(base);
        operands.extend(indices);
        self.append(Opcode::GetElementPtr, result_ty, operands)
    }

    pub fn create_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let ty = self.type_of(lhs)?;
        self.append(Opcode::Binary(op), ty, vec![lhs, rhs])
    }

    pub fn create_icmp(&mut self, pred: CmpPredicate, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        self.append(Opcode::ICmp(pred), TypeId::INT1, vec![lhs, rhs])
    }

    pub fn create_fcmp(&mut self, pred: CmpPredicate, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        self.append(Opcode::FCmp(pred), TypeId::INT1, vec![lhs, rhs])
    }

    pub fn create_sitofp(&mut self, value: Value) -> Result<Value, IrError> {
        self.append(Opcode::Cast(CastOp::SiToFp), TypeId::FLOAT32, vec![value])
    }

    pub fn create_fptosi(&mut self, value: Value) -> Result<Value, IrError> {
        self.append(Opcode::Cast(CastOp::FpToSi), TypeId::INT32, vec![value])
    }

    pub fn create_zext(&mut self, value: Value, ty: TypeId) -> Result<Value, IrError> {
        self.append(Opcode::Cast(CastOp::ZExt), ty, vec![value])
    }

    pub fn create_br(&mut self, target: BlockId) -> Result<Value, IrError> {
        self.append(Opcode::Br(target), TypeId::VOID, Vec::new())
    }

    pub fn create_cond_br(&mut self, condition: Value, then_block: BlockId, else_block: BlockId) -> Result<Value, IrError> {
        self.append(
            Opcode::CondBr { then_block, else_block },
            TypeId::VOID,
            vec![condition],
        )
    }

    pub fn create_call(&mut self, callee: FunctionId, args: Vec<Value>) -> Result<Value, IrError> {
        let callee_ty = self.type_of(Value::Function(callee))?;
        let return_type = match self.module.types.get(callee_ty) {
            IrType::Function { return_type, .. } => *return_type,
            _ => {
                return Err(IrError::NotCallable {
                    found: self.module.types.display(callee_ty).to_string(),
                })
            }
        };

        let mut operands = Vec::with_capacity(args.len() + 1);
        operands.push(Value::Function(callee));
        operands.extend(args);
        self.append(Opcode::Call, return_type, operands)
    }

    pub fn create_ret(&mut self, value: Value) -> Result<Value, IrError> {
        self.append(Opcode::Ret, TypeId::VOID, vec![value])
    }

    pub fn create_void_ret(&mut self) -> Result<Value, IrError> {
        self.append(Opcode::RetVoid, TypeId::VOID, Vec::new())
    }
}
