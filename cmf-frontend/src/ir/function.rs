//! Function Definitions
//!
//! A function owns its blocks and instructions in two arenas indexed by
//! [`BlockId`] and [`InstId`]. Erased entries leave a hole so handles held
//! elsewhere never alias a different entity. Block order (the layout) is
//! kept separately; the first block in the layout is the entry.

use serde::Serialize;
use crate::ir::{BasicBlock, BlockId, InstId, Instruction, TypeId, Use};

/// Formal argument of a function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub ty: TypeId,
    pub(crate) uses: Vec<Use>,
}

impl Argument {
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }
}

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    /// Function type
    pub ty: TypeId,
    pub return_type: TypeId,
    pub(crate) args: Vec<Argument>,
    pub(crate) blocks: Vec<Option<BasicBlock>>,
    pub(crate) layout: Vec<BlockId>,
    pub(crate) instructions: Vec<Option<Instruction>>,
    /// Call sites referencing this function
    pub(crate) uses: Vec<Use>,
}

impl Function {
    pub(crate) fn new(name: String, ty: TypeId, return_type: TypeId, param_types: &[TypeId]) -> Self {
        Self {
            name,
            ty,
            return_type,
            args: param_types
                .iter()
                .map(|&ty| Argument { ty, uses: Vec::new() })
                .collect(),
            blocks: Vec::new(),
            layout: Vec::new(),
            instructions: Vec::new(),
            uses: Vec::new(),
        }
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    /// A function without a body is an external declaration
    pub fn is_declaration(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.layout.first().copied()
    }

    /// Live blocks in layout order
    pub fn block_ids(&self) -> &[BlockId] {
        &self.layout
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.layout.iter().filter_map(move |&id| self.block(id))
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.instructions.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub(crate) fn instruction_mut(&mut self, id: InstId) -> Option<&mut Instruction> {
        self.instructions.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// All live instructions, block by block in layout order
    pub fn instructions(&self) -> impl Iterator<Item = (InstId, &Instruction)> + '_ {
        self.blocks().flat_map(move |block| {
            block
                .instructions
                .iter()
                .filter_map(move |&id| self.instruction(id).map(|inst| (id, inst)))
        })
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks().map(BasicBlock::len).sum()
    }

    /// Whether the block's last instruction is a terminator
    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.block(block)
            .and_then(BasicBlock::last_instruction)
            .and_then(|id| self.instruction(id))
            .is_some_and(Instruction::is_terminator)
    }

    /// Blocks reachable from the entry block
    pub fn reachable_blocks(&self) -> Vec<BlockId> {
        let mut seen = vec![false; self.blocks.len()];
        let mut order = Vec::new();
        let mut stack: Vec<BlockId> = self.entry_block().into_iter().collect();

        while let Some(id) = stack.pop() {
            if seen[id.0 as usize] {
                continue;
            }
            seen[id.0 as usize] = true;
            order.push(id);
            if let Some(block) = self.block(id) {
                stack.extend(block.successors.iter().rev().copied());
            }
        }
        order
    }

    pub(crate) fn push_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        // Names are made unique by the block number
        let name = if self.layout.is_empty() && name == "entry" {
            name.to_string()
        } else {
            format!("{name}{}", id.0)
        };
        self.blocks.push(Some(BasicBlock::new(id, name)));
        self.layout.push(id);
        id
    }

    pub(crate) fn push_instruction(&mut self, inst: Instruction) -> InstId {
        let id = InstId(self.instructions.len() as u32);
        self.instructions.push(Some(inst));
        id
    }
}
