//! End-to-end lowering of complete programs

use cmf_frontend::ast::*;
use cmf_frontend::ir::{CmpPredicate, Module, Opcode, Value};
use cmf_frontend::Frontend;
use pretty_assertions::assert_eq;

fn fun(ty: TypeSpecifier, id: &str, params: Vec<Param>, locals: Vec<VarDeclaration>, statements: Vec<Statement>) -> Declaration {
    Declaration::Fun(FunDeclaration {
        ty,
        id: id.to_string(),
        params,
        body: CompoundStmt {
            local_declarations: locals,
            statements,
        },
    })
}

/// int gcd(int u, int v) { if (v == 0) return u; else return gcd(v, u - u / v * v); }
fn gcd() -> Declaration {
    fun(
        TypeSpecifier::Int,
        "gcd",
        vec![Param::scalar(TypeSpecifier::Int, "u"), Param::scalar(TypeSpecifier::Int, "v")],
        vec![],
        vec![Statement::if_else(
            Expression::relational(RelOp::Eq, Expression::var("v"), Expression::int(0)),
            Statement::ret(Expression::var("u")),
            Statement::ret(Expression::call(
                "gcd",
                vec![
                    Expression::var("v"),
                    Expression::additive(
                        AddOp::Minus,
                        Expression::var("u"),
                        Expression::multiplicative(
                            MulOp::Mul,
                            Expression::multiplicative(MulOp::Div, Expression::var("u"), Expression::var("v")),
                            Expression::var("v"),
                        ),
                    ),
                ],
            )),
        )],
    )
}

/// float avg(float a[], int n) { int i; float s; i = 0; s = 0; while (i < n) { s = s + a[i]; i = i + 1; } return s / n; }
fn avg() -> Declaration {
    fun(
        TypeSpecifier::Float,
        "avg",
        vec![Param::array(TypeSpecifier::Float, "a"), Param::scalar(TypeSpecifier::Int, "n")],
        vec![
            VarDeclaration::scalar(TypeSpecifier::Int, "i"),
            VarDeclaration::scalar(TypeSpecifier::Float, "s"),
        ],
        vec![
            Statement::expr(Expression::assign(Var::scalar("i"), Expression::int(0))),
            Statement::expr(Expression::assign(Var::scalar("s"), Expression::int(0))),
            Statement::while_loop(
                Expression::relational(RelOp::Lt, Expression::var("i"), Expression::var("n")),
                Statement::Compound(CompoundStmt {
                    local_declarations: vec![],
                    statements: vec![
                        Statement::expr(Expression::assign(
                            Var::scalar("s"),
                            Expression::additive(
                                AddOp::Plus,
                                Expression::var("s"),
                                Expression::index("a", Expression::var("i")),
                            ),
                        )),
                        Statement::expr(Expression::assign(
                            Var::scalar("i"),
                            Expression::additive(AddOp::Plus, Expression::var("i"), Expression::int(1)),
                        )),
                    ],
                }),
            ),
            Statement::ret(Expression::multiplicative(MulOp::Div, Expression::var("s"), Expression::var("n"))),
        ],
    )
}

/// float data[4];
/// void main(void) { int x; x = input(); output(gcd(x, 12)); data[x] = x; outputFloat(avg(data, 4)); }
fn main_fn() -> Declaration {
    fun(
        TypeSpecifier::Void,
        "main",
        vec![],
        vec![VarDeclaration::scalar(TypeSpecifier::Int, "x")],
        vec![
            Statement::expr(Expression::assign(Var::scalar("x"), Expression::call("input", vec![]))),
            Statement::expr(Expression::call(
                "output",
                vec![Expression::call("gcd", vec![Expression::var("x"), Expression::int(12)])],
            )),
            Statement::expr(Expression::assign(
                Var::indexed("data", Expression::var("x")),
                Expression::var("x"),
            )),
            Statement::expr(Expression::call(
                "outputFloat",
                vec![Expression::call("avg", vec![Expression::var("data"), Expression::int(4)])],
            )),
        ],
    )
}

fn program() -> Program {
    Program {
        declarations: vec![
            Declaration::Var(VarDeclaration::array(TypeSpecifier::Float, "data", 4)),
            gcd(),
            avg(),
            main_fn(),
        ],
    }
}

fn lower() -> Module {
    Frontend::compile_to_ir(&program(), "suite").unwrap()
}

#[test]
fn test_every_block_ends_in_one_terminator() {
    let module = lower();
    for (_, function) in module.functions() {
        for block in function.blocks() {
            let ops: Vec<Opcode> = block
                .instructions()
                .iter()
                .map(|&id| function.instruction(id).unwrap().opcode)
                .collect();
            let terminators = ops.iter().filter(|op| op.is_terminator()).count();
            assert_eq!(terminators, 1, "block {} of {}", block.name, function.name);
            assert!(ops.last().unwrap().is_terminator());
        }
    }
}

#[test]
fn test_bounds_checks_guard_every_access() {
    let module = lower();
    for name in ["avg", "main"] {
        let function = module.function(module.find_function(name).unwrap()).unwrap();
        let checks = function
            .instructions()
            .filter(|(_, inst)| inst.opcode == Opcode::ICmp(CmpPredicate::Ge))
            .count();
        let trap = module.find_function("neg_idx_except").unwrap();
        let traps = function
            .instructions()
            .filter(|(_, inst)| inst.callee() == Some(Value::Function(trap)))
            .count();
        assert_eq!(checks, 1, "{name}");
        assert_eq!(traps, 1, "{name}");
    }

    // The trap path of a float function returns a float zero
    let avg = module.function(module.find_function("avg").unwrap()).unwrap();
    let trap_block = avg.blocks().find(|bb| bb.name.starts_with("idx.neg")).unwrap();
    let ret = avg.instruction(*trap_block.instructions().last().unwrap()).unwrap();
    assert_eq!(ret.operands(), &[Value::ConstFloat(0.0)]);
}

#[test]
fn test_use_lists_are_consistent() {
    let module = lower();
    module.verify().unwrap();

    // gcd is called once from main and once from itself
    let gcd = module.find_function("gcd").unwrap();
    let mut callers: Vec<String> = module
        .function(gcd)
        .unwrap()
        .uses()
        .iter()
        .map(|site| module.function(site.function).unwrap().name.clone())
        .collect();
    callers.sort();
    assert_eq!(callers, vec!["gcd".to_string(), "main".to_string()]);

    let data = module.find_global("data").unwrap();
    assert_eq!(module.global(data).unwrap().uses().len(), 2);
}

#[test]
fn test_program_survives_json_transport() {
    let json = serde_json::to_string(&program()).unwrap();
    let module = Frontend::compile_to_ir(&Frontend::load_ast(&json).unwrap(), "suite").unwrap();
    assert_eq!(module.to_string(), lower().to_string());
}
