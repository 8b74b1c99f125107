//! Function purity analysis
//!
//! A function is impure when it
//! - has no body (runtime routines are assumed to have effects),
//! - is the program entry point `main`,
//! - stores through an address that is not one of its own stack slots, or
//! - calls an impure function.
//!
//! The last rule is propagated from callees to callers over the callee's
//! use list until nothing changes.

use std::collections::{HashMap, VecDeque};
use cmf_frontend::ir::{Function, FunctionId, Module, Opcode, Value};
use log::trace;

pub const ENTRY_POINT: &str = "main";

#[derive(Debug, Clone, Default)]
pub struct FuncInfo {
    pure: HashMap<FunctionId, bool>,
}

impl FuncInfo {
    pub fn analyze(module: &Module) -> Self {
        let mut pure: HashMap<FunctionId, bool> = HashMap::new();
        let mut worklist = VecDeque::new();

        for (id, function) in module.functions() {
            let is_pure = !function.is_declaration()
                && function.name != ENTRY_POINT
                && !has_external_store(function);
            pure.insert(id, is_pure);
            if !is_pure {
                worklist.push_back(id);
            }
        }

        while let Some(id) = worklist.pop_front() {
            let Some(function) = module.function(id) else {
                continue;
            };
            for site in function.uses() {
                if let Some(caller) = pure.get_mut(&site.function) {
                    if *caller {
                        trace!("'{}' is impure: calls '{}'", site.function, function.name);
                        *caller = false;
                        worklist.push_back(site.function);
                    }
                }
            }
        }

        Self { pure }
    }

    /// Whether calls to `function` may be removed when their result is unused
    pub fn is_pure_function(&self, function: FunctionId) -> bool {
        self.pure.get(&function).copied().unwrap_or(false)
    }
}

/// Follow address arithmetic back to the value it is based on
pub fn address_root(function: &Function, mut address: Value) -> Value {
    while let Value::Instruction(id) = address {
        match function.instruction(id) {
            Some(inst) if inst.opcode == Opcode::GetElementPtr => match inst.operand(0) {
                Some(base) => address = base,
                None => break,
            },
            _ => break,
        }
    }
    address
}

/// Whether `value` is a stack slot of `function`
pub fn is_local_slot(function: &Function, value: Value) -> bool {
    value
        .as_instruction()
        .and_then(|id| function.instruction(id))
        .is_some_and(|inst| inst.is_alloca())
}

fn has_external_store(function: &Function) -> bool {
    function.instructions().any(|(_, inst)| {
        inst.is_store()
            && inst
                .pointer_operand()
                .map_or(true, |address| !is_local_slot(function, address_root(function, address)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmf_frontend::ir::{IrBuilder, TypeId};

    #[test]
    fn test_purity_classification() {
        let mut builder = IrBuilder::new("m".to_string());
        let output = builder.add_function("output", TypeId::VOID, vec![TypeId::INT32]);
        let g = builder.add_global("g", TypeId::INT32);

        // int square(int x) { int t; t = x * x; return t; }
        let square = builder.add_function("square", TypeId::INT32, vec![TypeId::INT32]);
        builder.start_function(square).unwrap();
        let t = builder.create_alloca(TypeId::INT32).unwrap();
        let x = builder
            .create_binary(cmf_frontend::ir::BinaryOp::Mul, Value::Argument(0), Value::Argument(0))
            .unwrap();
        builder.create_store(x, t).unwrap();
        let v = builder.create_load(t).unwrap();
        builder.create_ret(v).unwrap();

        // void set(void) { g = 1; }
        let set = builder.add_function("set", TypeId::VOID, vec![]);
        builder.start_function(set).unwrap();
        builder.create_store(Value::ConstInt(1), Value::Global(g)).unwrap();
        builder.create_void_ret().unwrap();

        // void wrapper(void) { set(); }
        let wrapper = builder.add_function("wrapper", TypeId::VOID, vec![]);
        builder.start_function(wrapper).unwrap();
        builder.create_call(set, vec![]).unwrap();
        builder.create_void_ret().unwrap();

        // void print(void) { output(1); }
        let print = builder.add_function("print", TypeId::VOID, vec![]);
        builder.start_function(print).unwrap();
        builder.create_call(output, vec![Value::ConstInt(1)]).unwrap();
        builder.create_void_ret().unwrap();

        let main = builder.add_function("main", TypeId::INT32, vec![]);
        builder.start_function(main).unwrap();
        builder.create_ret(Value::ConstInt(0)).unwrap();

        let info = FuncInfo::analyze(&builder.finish());
        assert!(info.is_pure_function(square));
        assert!(!info.is_pure_function(output));
        assert!(!info.is_pure_function(set));
        assert!(!info.is_pure_function(wrapper));
        assert!(!info.is_pure_function(print));
        assert!(!info.is_pure_function(main));
        assert!(!info.is_pure_function(FunctionId(99)));
    }

    #[test]
    fn test_store_through_pointer_parameter_is_impure() {
        let mut builder = IrBuilder::new("m".to_string());
        let int_ptr = builder.types().pointer_to(TypeId::INT32);

        // void fill(int a[]) { a[0] = 1; }
        let fill = builder.add_function("fill", TypeId::VOID, vec![int_ptr]);
        builder.start_function(fill).unwrap();
        let slot = builder.create_alloca(int_ptr).unwrap();
        builder.create_store(Value::Argument(0), slot).unwrap();
        let base = builder.create_load(slot).unwrap();
        let elem = builder.create_gep(base, vec![Value::ConstInt(0)]).unwrap();
        builder.create_store(Value::ConstInt(1), elem).unwrap();
        builder.create_void_ret().unwrap();

        let module = builder.finish();
        let info = FuncInfo::analyze(&module);
        assert!(!info.is_pure_function(fill));

        let function = module.function(fill).unwrap();
        assert_eq!(address_root(function, elem), base);
        assert!(is_local_slot(function, address_root(function, slot)));
    }
}
