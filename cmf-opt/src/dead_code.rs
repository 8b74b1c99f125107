//! Dead code elimination
//!
//! Each round clears blocks unreachable from the entry, then marks every
//! instruction some critical instruction depends on and sweeps the rest.
//! Rounds repeat until one removes nothing. Finally unused functions and
//! globals are dropped from the module.
//!
//! Critical instructions are terminators, calls to impure functions and
//! stores. A store into a stack slot that is never read and never escapes
//! is not critical.

use std::collections::HashSet;
use cmf_frontend::ir::{Function, FunctionId, InstId, Instruction, Module, Opcode, Value};
use log::{debug, info, trace};
use crate::func_info::{address_root, FuncInfo, ENTRY_POINT};
use crate::Pass;

#[derive(Debug, Default)]
pub struct DeadCode {
    erased: usize,
    removed_functions: usize,
    removed_globals: usize,
}

impl DeadCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of instructions removed by this pass so far
    pub fn erased_count(&self) -> usize {
        self.erased
    }

    pub fn removed_functions(&self) -> usize {
        self.removed_functions
    }

    pub fn removed_globals(&self) -> usize {
        self.removed_globals
    }

    /// Remove every block that cannot be reached from its function's entry
    ///
    /// Returns the number of instructions removed with them.
    pub fn clear_basic_blocks(&mut self, module: &mut Module) -> usize {
        let mut removed = 0;
        for id in module.function_ids() {
            let dead: Vec<_> = match module.function(id) {
                Some(function) if !function.is_declaration() => {
                    let reachable: HashSet<_> = function.reachable_blocks().into_iter().collect();
                    function
                        .block_ids()
                        .iter()
                        .copied()
                        .filter(|block| !reachable.contains(block))
                        .collect()
                }
                _ => continue,
            };
            if !dead.is_empty() {
                trace!("Clearing {} unreachable blocks", dead.len());
                removed += module.erase_blocks(id, &dead);
            }
        }
        removed
    }

    /// Mark every instruction of `function` that a critical instruction
    /// transitively depends on
    pub fn mark(&self, module: &Module, function: FunctionId, info: &FuncInfo) -> HashSet<InstId> {
        let mut marked = HashSet::new();
        let Some(func) = module.function(function) else {
            return marked;
        };
        let dead_slots = unread_slots(func);

        let mut worklist: Vec<InstId> = func
            .instructions()
            .filter(|(_, inst)| self.is_critical(func, inst, info, &dead_slots))
            .map(|(id, _)| id)
            .collect();
        marked.extend(worklist.iter().copied());

        while let Some(id) = worklist.pop() {
            let Some(inst) = func.instruction(id) else {
                continue;
            };
            // Operands naming other functions or globals are not followed
            for operand in inst.operands() {
                if let Value::Instruction(dep) = *operand {
                    if marked.insert(dep) {
                        worklist.push(dep);
                    }
                }
            }
        }
        marked
    }

    /// Erase every instruction of `function` outside `marked`
    ///
    /// All victims are detached from their operands before any is erased.
    pub fn sweep(&mut self, module: &mut Module, function: FunctionId, marked: &HashSet<InstId>) -> usize {
        let victims: Vec<InstId> = match module.function(function) {
            Some(func) => func
                .instructions()
                .map(|(id, _)| id)
                .filter(|id| !marked.contains(id))
                .collect(),
            None => return 0,
        };

        for &inst in &victims {
            module.remove_all_operands(function, inst);
        }
        for &inst in &victims {
            trace!("Erasing {inst} in {function}");
            module.erase_instruction(function, inst);
        }
        victims.len()
    }

    pub fn is_critical(&self, function: &Function, inst: &Instruction, info: &FuncInfo, dead_slots: &HashSet<InstId>) -> bool {
        match inst.opcode {
            Opcode::Br(_) | Opcode::CondBr { .. } | Opcode::Ret | Opcode::RetVoid => true,
            Opcode::Call => match inst.callee() {
                Some(Value::Function(callee)) => !info.is_pure_function(callee),
                _ => true,
            },
            Opcode::Store => match inst.pointer_operand().map(|address| address_root(function, address)) {
                Some(Value::Instruction(slot)) => !dead_slots.contains(&slot),
                _ => true,
            },
            _ => false,
        }
    }

    /// Remove functions nobody calls (except the entry point) and unused
    /// globals; returns how many entities were removed
    ///
    /// Removing a function drops its calls, so sweeping repeats until a
    /// round finds nothing left to remove.
    pub fn sweep_globally(&mut self, module: &mut Module) -> usize {
        let mut removed = 0;
        loop {
            let dead_functions: Vec<FunctionId> = module
                .functions()
                .filter(|(_, f)| f.uses().is_empty() && f.name != ENTRY_POINT)
                .map(|(id, _)| id)
                .collect();
            for &id in &dead_functions {
                if let Some(f) = module.function(id) {
                    debug!("Removing unused function '{}'", f.name);
                }
                module.remove_function(id);
            }

            // Globals referenced only from removed functions are unused by now
            let dead_globals: Vec<_> = module
                .globals()
                .filter(|(_, g)| g.uses().is_empty())
                .map(|(id, _)| id)
                .collect();
            for &id in &dead_globals {
                if let Some(g) = module.global(id) {
                    debug!("Removing unused global '{}'", g.name);
                }
                module.remove_global(id);
            }

            self.removed_functions += dead_functions.len();
            self.removed_globals += dead_globals.len();
            if dead_functions.is_empty() && dead_globals.is_empty() {
                return removed;
            }
            removed += dead_functions.len() + dead_globals.len();
        }
    }
}

impl Pass for DeadCode {
    fn name(&self) -> &'static str {
        "dead-code"
    }

    fn run(&mut self, module: &mut Module) -> bool {
        let info = FuncInfo::analyze(module);
        let before = self.erased;

        let mut round = 0;
        loop {
            round += 1;
            let mut removed = self.clear_basic_blocks(module);
            for id in module.function_ids() {
                let marked = self.mark(module, id, &info);
                removed += self.sweep(module, id, &marked);
            }
            debug!("Dead code round {round}: erased {removed} instructions");

            self.erased += removed;
            if removed == 0 {
                break;
            }
        }

        let globals = self.sweep_globally(module);
        let erased = self.erased - before;
        info!("dead code pass erased {erased} instructions");

        debug_assert!(module.verify().is_ok(), "dead code left the module inconsistent");
        erased > 0 || globals > 0
    }
}

/// Stack slots whose every use is a store address, directly or through
/// address arithmetic
fn unread_slots(function: &Function) -> HashSet<InstId> {
    function
        .instructions()
        .filter(|(id, inst)| inst.is_alloca() && only_stored_through(function, *id))
        .map(|(id, _)| id)
        .collect()
}

fn only_stored_through(function: &Function, address: InstId) -> bool {
    let Some(inst) = function.instruction(address) else {
        return false;
    };
    inst.uses().iter().all(|site| {
        let Some(user) = function.instruction(site.inst) else {
            return false;
        };
        match user.opcode {
            Opcode::Store => site.operand == 1,
            Opcode::GetElementPtr => site.operand == 0 && only_stored_through(function, site.inst),
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmf_frontend::ir::{BinaryOp, IrBuilder, TypeId};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unread_slot_detection() {
        let mut builder = IrBuilder::new("m".to_string());
        let f = builder.add_function("f", TypeId::INT32, vec![]);
        builder.start_function(f).unwrap();
        let arr = builder.types().array_of(TypeId::INT32, 4);
        let written = builder.create_alloca(arr).unwrap();
        let read = builder.create_alloca(TypeId::INT32).unwrap();
        let elem = builder.create_gep(written, vec![Value::ConstInt(0), Value::ConstInt(1)]).unwrap();
        builder.create_store(Value::ConstInt(1), elem).unwrap();
        builder.create_store(Value::ConstInt(2), read).unwrap();
        let v = builder.create_load(read).unwrap();
        builder.create_ret(v).unwrap();

        let module = builder.finish();
        let slots = unread_slots(module.function(f).unwrap());
        assert_eq!(slots.into_iter().collect::<Vec<_>>(), vec![written.as_instruction().unwrap()]);
    }

    #[test]
    fn test_mark_follows_operands() {
        let mut builder = IrBuilder::new("m".to_string());
        let f = builder.add_function("main", TypeId::INT32, vec![]);
        builder.start_function(f).unwrap();
        let unused = builder.create_binary(BinaryOp::Add, Value::ConstInt(1), Value::ConstInt(2)).unwrap();
        let used = builder.create_binary(BinaryOp::Mul, Value::ConstInt(3), Value::ConstInt(4)).unwrap();
        let ret = builder.create_ret(used).unwrap();
        let module = builder.finish();

        let info = FuncInfo::analyze(&module);
        let marked = DeadCode::new().mark(&module, f, &info);
        assert!(marked.contains(&used.as_instruction().unwrap()));
        assert!(marked.contains(&ret.as_instruction().unwrap()));
        assert!(!marked.contains(&unused.as_instruction().unwrap()));
    }
}
