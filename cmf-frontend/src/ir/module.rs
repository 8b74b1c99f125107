//! Module and Global Variables
//!
//! The module is the root of the IR graph. It owns every function and
//! global variable, and it is the only place where operands are attached
//! to or detached from instructions: each change to an operand slot updates
//! the use list of the referenced value in the same call.

use serde::Serialize;
use crate::ir::{
    BasicBlock, BlockId, Function, FunctionId, GlobalId, InstId, Instruction, IrError, Opcode,
    TypeId, TypeTable, Use, Value,
};

/// Global variable definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalVariable {
    pub name: String,
    /// Type of the global as a value: a pointer to `content_type`
    pub ty: TypeId,
    pub content_type: TypeId,
    pub initializer: Value,
    pub(crate) uses: Vec<Use>,
}

impl GlobalVariable {
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }
}

/// IR Module - represents a complete compilation unit
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub name: String,
    pub types: TypeTable,
    functions: Vec<Option<Function>>,
    globals: Vec<Option<GlobalVariable>>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            types: TypeTable::new(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Create a function (declaration until a block is appended)
    pub fn add_function(&mut self, name: &str, return_type: TypeId, param_types: Vec<TypeId>) -> FunctionId {
        let ty = self.types.function(return_type, param_types.clone());
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Some(Function::new(name.to_string(), ty, return_type, &param_types)));
        id
    }

    /// Create a zero-initialized global holding a `content_type`
    pub fn add_global(&mut self, name: &str, content_type: TypeId) -> GlobalId {
        let ty = self.types.pointer_to(content_type);
        let id = GlobalId(self.globals.len() as u32);
        self.globals.push(Some(GlobalVariable {
            name: name.to_string(),
            ty,
            content_type,
            initializer: Value::ConstZero(content_type),
            uses: Vec::new(),
        }));
        id
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn function_mut(&mut self, id: FunctionId) -> Result<&mut Function, IrError> {
        self.functions
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(IrError::UnknownFunction(id))
    }

    fn function_ref(&self, id: FunctionId) -> Result<&Function, IrError> {
        self.function(id).ok_or(IrError::UnknownFunction(id))
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> + '_ {
        self.functions
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|f| (FunctionId(i as u32), f)))
    }

    pub fn function_ids(&self) -> Vec<FunctionId> {
        self.functions().map(|(id, _)| id).collect()
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.functions().find(|(_, f)| f.name == name).map(|(id, _)| id)
    }

    pub fn global(&self, id: GlobalId) -> Option<&GlobalVariable> {
        self.globals.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalVariable)> + '_ {
        self.globals
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.as_ref().map(|g| (GlobalId(i as u32), g)))
    }

    pub fn global_ids(&self) -> Vec<GlobalId> {
        self.globals().map(|(id, _)| id).collect()
    }

    pub fn find_global(&self, name: &str) -> Option<GlobalId> {
        self.globals().find(|(_, g)| g.name == name).map(|(id, _)| id)
    }

    /// Total number of live instructions across all functions
    pub fn instruction_count(&self) -> usize {
        self.functions().map(|(_, f)| f.instruction_count()).sum()
    }

    /// Type of `value` as seen from inside `function`
    pub fn value_type(&self, function: FunctionId, value: Value) -> Option<TypeId> {
        match value {
            Value::ConstInt(_) => Some(TypeId::INT32),
            Value::ConstFloat(_) => Some(TypeId::FLOAT32),
            Value::ConstZero(ty) => Some(ty),
            Value::Global(id) => self.global(id).map(|g| g.ty),
            Value::Function(id) => self.function(id).map(|f| f.ty),
            Value::Argument(index) => self
                .function(function)
                .and_then(|f| f.args.get(index as usize))
                .map(|arg| arg.ty),
            Value::Instruction(id) => self
                .function(function)
                .and_then(|f| f.instruction(id))
                .map(|inst| inst.ty),
        }
    }

    /// Use list of `value` as seen from inside `function`
    ///
    /// Constants have no use list and yield an empty slice.
    pub fn uses_of(&self, function: FunctionId, value: Value) -> &[Use] {
        let uses = match value {
            Value::Global(id) => self.global(id).map(GlobalVariable::uses),
            Value::Function(id) => self.function(id).map(Function::uses),
            Value::Argument(index) => self
                .function(function)
                .and_then(|f| f.args.get(index as usize))
                .map(|arg| arg.uses()),
            Value::Instruction(id) => self
                .function(function)
                .and_then(|f| f.instruction(id))
                .map(Instruction::uses),
            Value::ConstInt(_) | Value::ConstFloat(_) | Value::ConstZero(_) => None,
        };
        uses.unwrap_or(&[])
    }

    /// Append a new, empty block to `function`
    pub fn append_block(&mut self, function: FunctionId, name: &str) -> Result<BlockId, IrError> {
        Ok(self.function_mut(function)?.push_block(name))
    }

    /// Append an instruction at the end of `block`
    pub fn append_instruction(
        &mut self,
        function: FunctionId,
        block: BlockId,
        opcode: Opcode,
        ty: TypeId,
        operands: Vec<Value>,
    ) -> Result<InstId, IrError> {
        let len = self.block_ref(function, block)?.len();
        self.insert_instruction(function, block, len, opcode, ty, operands)
    }

    /// Insert an instruction at `index` within `block`
    ///
    /// Nothing may be placed after a terminator, and a terminator may only
    /// be placed at the end of a block that has none yet.
    pub fn insert_instruction(
        &mut self,
        function: FunctionId,
        block: BlockId,
        index: usize,
        opcode: Opcode,
        ty: TypeId,
        operands: Vec<Value>,
    ) -> Result<InstId, IrError> {
        let (len, terminated) = {
            let f = self.function_ref(function)?;
            (self.block_ref(function, block)?.len(), f.is_terminated(block))
        };
        if index > len {
            return Err(IrError::InvalidPosition { block, index });
        }
        if (terminated && index == len) || (opcode.is_terminator() && index != len) {
            return Err(IrError::BlockTerminated {
                function: self.function_ref(function)?.name.clone(),
                block,
            });
        }
        for operand in &operands {
            if self.value_type(function, *operand).is_none() {
                return Err(IrError::InvalidOperand(*operand));
            }
        }
        for successor in opcode.successors() {
            self.block_ref(function, successor)?;
        }

        let f = self.function_mut(function)?;
        let id = f.push_instruction(Instruction::new(opcode, ty, block));
        if let Some(bb) = f.block_mut(block) {
            bb.instructions.insert(index, id);
        }
        for successor in opcode.successors() {
            self.link(function, block, successor);
        }

        for (slot, value) in operands.into_iter().enumerate() {
            self.attach_operand(function, id, slot, value);
        }
        Ok(id)
    }

    /// Replace operand `index` of `inst`, moving the use between lists
    pub fn set_operand(&mut self, function: FunctionId, inst: InstId, index: usize, value: Value) -> Result<(), IrError> {
        if self.value_type(function, value).is_none() {
            return Err(IrError::InvalidOperand(value));
        }
        let old = self
            .function_ref(function)?
            .instruction(inst)
            .ok_or(IrError::UnknownInstruction(inst))?
            .operand(index)
            .ok_or(IrError::InvalidOperandIndex { inst, index })?;

        let site = Use { function, inst, operand: index };
        self.remove_use(old, site);
        if let Some(i) = self.function_mut(function)?.instruction_mut(inst) {
            i.operands[index] = value;
        }
        self.add_use(value, site);
        Ok(())
    }

    /// Detach every operand of `inst` from the use lists it appears in
    pub fn remove_all_operands(&mut self, function: FunctionId, inst: InstId) {
        let operands = match self.function_mut(function).ok().and_then(|f| f.instruction_mut(inst)) {
            Some(i) => std::mem::take(&mut i.operands),
            None => return,
        };
        for (slot, value) in operands.into_iter().enumerate() {
            self.remove_use(value, Use { function, inst, operand: slot });
        }
    }

    /// Remove `inst` from its block and free it
    ///
    /// Its operands are detached first. The instruction's own result must
    /// no longer be used anywhere.
    pub fn erase_instruction(&mut self, function: FunctionId, inst: InstId) {
        self.remove_all_operands(function, inst);

        let (opcode, parent) = match self.function(function).and_then(|f| f.instruction(inst)) {
            Some(i) => {
                debug_assert!(i.uses.is_empty(), "erasing {inst} which still has uses");
                (i.opcode, i.parent)
            }
            None => return,
        };
        for successor in opcode.successors() {
            self.unlink(function, parent, successor);
        }

        if let Ok(f) = self.function_mut(function) {
            if let Some(bb) = f.block_mut(parent) {
                bb.instructions.retain(|&id| id != inst);
            }
            f.instructions[inst.0 as usize] = None;
        }
    }

    /// Erase a set of blocks together with their instructions
    ///
    /// All instructions in the set are detached before any is freed, so
    /// values defined in one erased block may be used in another. Blocks
    /// outside the set must not branch into it. The entry block is never
    /// erased. Returns the number of instructions removed.
    pub fn erase_blocks(&mut self, function: FunctionId, blocks: &[BlockId]) -> usize {
        let entry = self.function(function).and_then(Function::entry_block);
        let blocks: Vec<BlockId> = blocks.iter().copied().filter(|b| Some(*b) != entry).collect();

        let doomed: Vec<InstId> = match self.function(function) {
            Some(f) => blocks
                .iter()
                .filter_map(|&b| f.block(b))
                .flat_map(|bb| bb.instructions.iter().copied())
                .collect(),
            None => return 0,
        };
        for &inst in &doomed {
            self.remove_all_operands(function, inst);
        }
        for &inst in &doomed {
            self.erase_instruction(function, inst);
        }

        if let Ok(f) = self.function_mut(function) {
            for &block in &blocks {
                debug_assert!(
                    f.block(block).map_or(true, |bb| bb.predecessors.is_empty()),
                    "erasing {block} which is still a branch target"
                );
                if let Some(slot) = f.blocks.get_mut(block.0 as usize) {
                    *slot = None;
                }
            }
            f.layout.retain(|b| !blocks.contains(b));
        }
        doomed.len()
    }

    /// Remove a function and its body from the module
    ///
    /// Callers are expected to have checked that nothing calls it.
    pub fn remove_function(&mut self, id: FunctionId) {
        let insts: Vec<InstId> = match self.function(id) {
            Some(f) => {
                debug_assert!(f.uses.is_empty(), "removing function '{}' which is still called", f.name);
                f.instructions().map(|(inst, _)| inst).collect()
            }
            None => return,
        };
        // Break edges into globals and callees before dropping the body
        for inst in insts {
            self.remove_all_operands(id, inst);
        }
        self.functions[id.0 as usize] = None;
    }

    /// Remove an unused global variable from the module
    pub fn remove_global(&mut self, id: GlobalId) {
        if let Some(slot) = self.globals.get_mut(id.0 as usize) {
            debug_assert!(
                slot.as_ref().map_or(true, |g| g.uses.is_empty()),
                "removing a global which is still used"
            );
            *slot = None;
        }
    }

    fn block_ref(&self, function: FunctionId, block: BlockId) -> Result<&BasicBlock, IrError> {
        self.function_ref(function)?
            .block(block)
            .ok_or(IrError::UnknownBlock(block))
    }

    fn attach_operand(&mut self, function: FunctionId, inst: InstId, slot: usize, value: Value) {
        if let Some(i) = self.function_mut(function).ok().and_then(|f| f.instruction_mut(inst)) {
            debug_assert_eq!(i.operands.len(), slot);
            i.operands.push(value);
        }
        self.add_use(value, Use { function, inst, operand: slot });
    }

    fn use_list_mut(&mut self, value: Value, function: FunctionId) -> Option<&mut Vec<Use>> {
        match value {
            Value::Global(id) => self
                .globals
                .get_mut(id.0 as usize)
                .and_then(Option::as_mut)
                .map(|g| &mut g.uses),
            Value::Function(id) => self.function_mut(id).ok().map(|f| &mut f.uses),
            Value::Argument(index) => self
                .function_mut(function)
                .ok()
                .and_then(|f| f.args.get_mut(index as usize))
                .map(|arg| &mut arg.uses),
            Value::Instruction(id) => self
                .function_mut(function)
                .ok()
                .and_then(|f| f.instruction_mut(id))
                .map(|inst| &mut inst.uses),
            Value::ConstInt(_) | Value::ConstFloat(_) | Value::ConstZero(_) => None,
        }
    }

    fn add_use(&mut self, value: Value, site: Use) {
        if let Some(uses) = self.use_list_mut(value, site.function) {
            uses.push(site);
        }
    }

    fn remove_use(&mut self, value: Value, site: Use) {
        if let Some(uses) = self.use_list_mut(value, site.function) {
            if let Some(pos) = uses.iter().position(|u| *u == site) {
                uses.swap_remove(pos);
            }
        }
    }

    fn link(&mut self, function: FunctionId, from: BlockId, to: BlockId) {
        if let Ok(f) = self.function_mut(function) {
            if let Some(bb) = f.block_mut(from) {
                bb.successors.push(to);
            }
            if let Some(bb) = f.block_mut(to) {
                bb.predecessors.push(from);
            }
        }
    }

    fn unlink(&mut self, function: FunctionId, from: BlockId, to: BlockId) {
        if let Ok(f) = self.function_mut(function) {
            if let Some(bb) = f.block_mut(from) {
                if let Some(pos) = bb.successors.iter().position(|&b| b == to) {
                    bb.successors.remove(pos);
                }
            }
            if let Some(bb) = f.block_mut(to) {
                if let Some(pos) = bb.predecessors.iter().position(|&b| b == from) {
                    bb.predecessors.remove(pos);
                }
            }
        }
    }
}
