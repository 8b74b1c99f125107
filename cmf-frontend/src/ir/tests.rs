//! Unit tests for the IR module

use super::*;
use pretty_assertions::assert_eq;

fn builder_with_function(ret: TypeId, params: Vec<TypeId>) -> (IrBuilder, FunctionId) {
    let mut builder = IrBuilder::new("test".to_string());
    let f = builder.add_function("f", ret, params);
    builder.start_function(f).unwrap();
    (builder, f)
}

fn inst(value: Value) -> InstId {
    value.as_instruction().unwrap()
}

#[test]
fn test_type_interning() {
    let mut types = TypeTable::new();
    let a = types.array_of(TypeId::INT32, 10);
    let b = types.array_of(TypeId::INT32, 10);
    assert_eq!(a, b);

    let p = types.pointer_to(a);
    assert_eq!(types.display(p).to_string(), "[10 x i32]*");
    assert_eq!(types.pointee(p), Some(a));
    assert_eq!(types.element(a), Some(TypeId::INT32));
    assert!(types.is_integer(TypeId::INT1));
    assert!(!types.is_integer(TypeId::FLOAT32));

    let sig = types.function(TypeId::VOID, vec![TypeId::INT32, p]);
    assert_eq!(types.display(sig).to_string(), "void (i32, [10 x i32]*)");
}

#[test]
fn test_alloca_goes_to_entry_top() {
    let (mut builder, f) = builder_with_function(TypeId::INT32, vec![]);
    let x = builder.create_alloca(TypeId::INT32).unwrap();
    let store = builder.create_store(Value::ConstInt(1), x).unwrap();
    let y = builder.create_alloca(TypeId::FLOAT32).unwrap();

    let func = builder.module().function(f).unwrap();
    let entry = func.block(func.entry_block().unwrap()).unwrap();
    assert_eq!(entry.instructions(), &[inst(x), inst(y), inst(store)]);
}

#[test]
fn test_use_lists_follow_operands() {
    let (mut builder, f) = builder_with_function(TypeId::INT32, vec![]);
    let x = builder.create_alloca(TypeId::INT32).unwrap();
    let store = builder.create_store(Value::ConstInt(1), x).unwrap();
    let load = builder.create_load(x).unwrap();
    let add = builder.create_binary(BinaryOp::Add, load, Value::ConstInt(2)).unwrap();
    builder.create_ret(add).unwrap();

    let module = builder.module_mut();
    let mut x_uses = module.uses_of(f, x).to_vec();
    x_uses.sort_by_key(|u| u.inst);
    assert_eq!(
        x_uses,
        vec![
            Use { function: f, inst: inst(store), operand: 1 },
            Use { function: f, inst: inst(load), operand: 0 },
        ]
    );
    assert_eq!(module.uses_of(f, load), &[Use { function: f, inst: inst(add), operand: 0 }]);
    assert!(module.uses_of(f, Value::ConstInt(2)).is_empty());

    module.set_operand(f, inst(add), 0, Value::ConstInt(5)).unwrap();
    assert!(module.uses_of(f, load).is_empty());
    assert_eq!(
        module.function(f).unwrap().instruction(inst(add)).unwrap().operands(),
        &[Value::ConstInt(5), Value::ConstInt(2)]
    );

    module.erase_instruction(f, inst(load));
    assert_eq!(module.uses_of(f, x), &[Use { function: f, inst: inst(store), operand: 1 }]);
    assert!(module.verify().is_ok());
}

#[test]
fn test_nothing_after_terminator() {
    let (mut builder, f) = builder_with_function(TypeId::VOID, vec![]);
    builder.create_void_ret().unwrap();
    assert!(builder.is_terminated());

    let err = builder.create_binary(BinaryOp::Add, Value::ConstInt(1), Value::ConstInt(2));
    assert!(matches!(err, Err(IrError::BlockTerminated { .. })));

    // Slots are still placed ahead of the terminator
    let slot = builder.create_alloca(TypeId::INT32).unwrap();
    let func = builder.module().function(f).unwrap();
    assert_eq!(func.block(func.entry_block().unwrap()).unwrap().instructions()[0], inst(slot));
    assert!(func.is_terminated(func.entry_block().unwrap()));
}

#[test]
fn test_invalid_operand_rejected() {
    let (mut builder, _) = builder_with_function(TypeId::VOID, vec![]);
    let err = builder.create_load(Value::Instruction(InstId(42)));
    assert_eq!(err, Err(IrError::InvalidOperand(Value::Instruction(InstId(42)))));

    let err = builder.create_load(Value::ConstInt(3));
    assert!(matches!(err, Err(IrError::NotAPointer { instruction: "load", .. })));
}

#[test]
fn test_cfg_edges_and_block_erasure() {
    let (mut builder, f) = builder_with_function(TypeId::VOID, vec![]);
    let entry = builder.insert_block().unwrap();
    let then_bb = builder.create_block("then").unwrap();
    let else_bb = builder.create_block("else").unwrap();
    let dead_bb = builder.create_block("dead").unwrap();

    let cond = builder.create_icmp(CmpPredicate::Lt, Value::ConstInt(1), Value::ConstInt(2)).unwrap();
    builder.create_cond_br(cond, then_bb, else_bb).unwrap();
    builder.set_insert_point(then_bb);
    builder.create_void_ret().unwrap();
    builder.set_insert_point(else_bb);
    builder.create_br(then_bb).unwrap();
    builder.set_insert_point(dead_bb);
    builder.create_br(then_bb).unwrap();

    let module = builder.module_mut();
    {
        let func = module.function(f).unwrap();
        assert_eq!(func.block(entry).unwrap().successors(), &[then_bb, else_bb]);
        assert_eq!(func.block(then_bb).unwrap().predecessors(), &[entry, else_bb, dead_bb]);
        assert_eq!(func.reachable_blocks().len(), 3);
        assert_eq!(func.block(dead_bb).unwrap().name, "dead3");
    }
    assert!(module.verify().is_ok());

    assert_eq!(module.erase_blocks(f, &[dead_bb]), 1);
    let func = module.function(f).unwrap();
    assert_eq!(func.block_ids(), &[entry, then_bb, else_bb]);
    assert!(func.block(dead_bb).is_none());
    assert_eq!(func.block(then_bb).unwrap().predecessors(), &[entry, else_bb]);
    assert!(module.verify().is_ok());
}

#[test]
fn test_gep_result_types() {
    let mut builder = IrBuilder::new("test".to_string());
    let arr = builder.types().array_of(TypeId::INT32, 10);
    let g = builder.add_global("a", arr);
    let int_ptr = builder.types().pointer_to(TypeId::INT32);
    let f = builder.add_function("f", TypeId::VOID, vec![int_ptr]);
    builder.start_function(f).unwrap();

    let elem = builder.create_gep(Value::Global(g), vec![Value::ConstInt(0), Value::ConstInt(3)]).unwrap();
    assert_eq!(builder.type_of(elem).unwrap(), int_ptr);

    let elem = builder.create_gep(Value::Argument(0), vec![Value::ConstInt(1)]).unwrap();
    assert_eq!(builder.type_of(elem).unwrap(), int_ptr);

    let err = builder.create_gep(Value::Argument(0), vec![Value::ConstInt(0), Value::ConstInt(1)]);
    assert!(matches!(err, Err(IrError::NotAggregate { .. })));
}

#[test]
fn test_call_records_callee_use() {
    let mut builder = IrBuilder::new("test".to_string());
    let callee = builder.add_function("g", TypeId::FLOAT32, vec![TypeId::INT32]);
    let f = builder.add_function("f", TypeId::VOID, vec![]);
    builder.start_function(f).unwrap();

    let call = builder.create_call(callee, vec![Value::ConstInt(7)]).unwrap();
    assert_eq!(builder.type_of(call).unwrap(), TypeId::FLOAT32);
    builder.create_void_ret().unwrap();

    let module = builder.finish();
    assert!(module.function(callee).unwrap().is_declaration());
    assert_eq!(
        module.function(callee).unwrap().uses(),
        &[Use { function: f, inst: inst(call), operand: 0 }]
    );
    assert!(module.verify().is_ok());
}

#[test]
fn test_verify_reports_unterminated_block() {
    let (mut builder, _) = builder_with_function(TypeId::INT32, vec![]);
    builder.create_alloca(TypeId::INT32).unwrap();
    let err = builder.module().verify().unwrap_err();
    assert!(matches!(err, VerifyError::Unterminated { ref block, .. } if block == "entry"));
}

#[test]
fn test_remove_function_releases_callees() {
    let mut builder = IrBuilder::new("test".to_string());
    let callee = builder.add_function("g", TypeId::VOID, vec![]);
    let f = builder.add_function("f", TypeId::VOID, vec![]);
    builder.start_function(f).unwrap();
    builder.create_call(callee, vec![]).unwrap();
    builder.create_void_ret().unwrap();

    let mut module = builder.finish();
    module.remove_function(f);
    assert!(module.function(f).is_none());
    assert!(module.function(callee).unwrap().uses().is_empty());
    assert_eq!(module.find_function("f"), None);
    assert_eq!(module.find_function("g"), Some(callee));
}

#[test]
fn test_print_module() {
    let mut builder = IrBuilder::new("demo".to_string());
    builder.add_global("n", TypeId::INT32);
    let output = builder.add_function("output", TypeId::VOID, vec![TypeId::INT32]);
    let f = builder.add_function("main", TypeId::INT32, vec![]);
    builder.start_function(f).unwrap();
    let x = builder.create_alloca(TypeId::INT32).unwrap();
    builder.create_store(Value::ConstInt(3), x).unwrap();
    let v = builder.create_load(x).unwrap();
    builder.create_call(output, vec![v]).unwrap();
    builder.create_ret(Value::ConstInt(0)).unwrap();

    let text = builder.finish().to_string();
    let expected = "\
; ModuleID = 'demo'
@n = global i32 0

declare void @output(i32 %arg0)

define i32 @main() {
entry:
  %0 = alloca i32
  store i32 3, i32* %0
  %2 = load i32, i32* %0
  call void @output(i32 %2)
  ret i32 0
}
";
    assert_eq!(text, expected);
}
