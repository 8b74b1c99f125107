//! IR verifier
//!
//! Checks the structural invariants every producer and pass must keep:
//! operand slots and use lists mirror each other exactly, every block of a
//! defined function ends in exactly one terminator, and predecessor lists
//! agree with the branches in the function.

use crate::ir::{BlockId, Function, FunctionId, Module, Use, Value, VerifyError};

impl Module {
    /// Verify the whole module, stopping at the first inconsistency
    pub fn verify(&self) -> Result<(), VerifyError> {
        for (id, function) in self.functions() {
            self.verify_function(id, function)?;
        }
        self.verify_module_use_lists()
    }

    fn verify_function(&self, id: FunctionId, function: &Function) -> Result<(), VerifyError> {
        let name = || function.name.clone();

        for block in function.blocks() {
            let count = block.instructions().len();
            for (pos, &inst_id) in block.instructions().iter().enumerate() {
                let inst = match function.instruction(inst_id) {
                    Some(inst) if inst.parent == block.id => inst,
                    _ => {
                        return Err(VerifyError::WrongParent {
                            function: name(),
                            inst: inst_id,
                            block: block.name.clone(),
                        })
                    }
                };
                if inst.is_terminator() && pos + 1 != count {
                    return Err(VerifyError::TerminatorNotLast {
                        function: name(),
                        block: block.name.clone(),
                    });
                }

                // Every operand slot must be recorded by the value it names
                for (slot, &value) in inst.operands().iter().enumerate() {
                    if value.is_constant() {
                        continue;
                    }
                    let site = Use { function: id, inst: inst_id, operand: slot };
                    if !self.uses_of(id, value).contains(&site) {
                        return Err(VerifyError::MissingUse {
                            function: name(),
                            inst: inst_id,
                            operand: slot,
                            value: format!("{value:?}"),
                        });
                    }
                }
            }
            if !function.is_terminated(block.id) {
                return Err(VerifyError::Unterminated {
                    function: name(),
                    block: block.name.clone(),
                });
            }
        }

        // Function-local use lists must only name live operand slots
        for (index, arg) in function.args().iter().enumerate() {
            self.check_uses(Value::Argument(index as u32), arg.uses())?;
        }
        for (inst_id, inst) in function.instructions() {
            self.check_uses(Value::Instruction(inst_id), inst.uses())?;
        }

        self.verify_predecessors(function)
    }

    fn verify_predecessors(&self, function: &Function) -> Result<(), VerifyError> {
        for block in function.blocks() {
            let mut expected: Vec<BlockId> = Vec::new();
            for pred in function.blocks() {
                let terminator = pred.last_instruction().and_then(|i| function.instruction(i));
                if let Some(terminator) = terminator {
                    for succ in terminator.opcode.successors() {
                        if succ == block.id {
                            expected.push(pred.id);
                        }
                    }
                }
            }
            let mut actual = block.predecessors().to_vec();
            expected.sort();
            actual.sort();
            if expected != actual {
                return Err(VerifyError::PredecessorMismatch {
                    function: function.name.clone(),
                    block: block.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn verify_module_use_lists(&self) -> Result<(), VerifyError> {
        for (id, global) in self.globals() {
            self.check_uses(Value::Global(id), global.uses())?;
        }
        for (id, function) in self.functions() {
            self.check_uses(Value::Function(id), function.uses())?;
        }
        Ok(())
    }

    /// Every recorded use must point at a live slot holding `value`
    fn check_uses(&self, value: Value, uses: &[Use]) -> Result<(), VerifyError> {
        for site in uses {
            let user = self.function(site.function);
            let holds = user
                .and_then(|f| f.instruction(site.inst))
                .and_then(|inst| inst.operand(site.operand))
                .is_some_and(|v| v == value);
            if !holds {
                return Err(VerifyError::StaleUse {
                    function: user.map(|f| f.name.clone()).unwrap_or_default(),
                    inst: site.inst,
                    operand: site.operand,
                    value: format!("{value:?}"),
                });
            }
        }
        Ok(())
    }
}
