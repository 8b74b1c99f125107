//! Basic blocks
//!
//! A block keeps its instruction order and its predecessor and successor
//! lists, which follow the terminator it ends with.

use serde::Serialize;
use crate::ir::{BlockId, InstId};

/// Basic Block - an ordered list of instructions owned by one function
///
/// Predecessor and successor lists are derived from the branch
/// instructions and maintained by the module whenever a terminator is
/// appended or erased. A block branching twice to the same target is
/// listed twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub name: String,
    pub(crate) instructions: Vec<InstId>,
    pub(crate) predecessors: Vec<BlockId>,
    pub(crate) successors: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, name: String) -> Self {
        Self {
            id,
            name,
            instructions: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    pub fn instructions(&self) -> &[InstId] {
        &self.instructions
    }

    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn last_instruction(&self) -> Option<InstId> {
        self.instructions.last().copied()
    }
}
