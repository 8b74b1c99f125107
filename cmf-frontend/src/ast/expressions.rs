//! Expression nodes
//!
//! Operator precedence is already encoded in the tree shape by the parser:
//! relational nodes hold additive operands, additive nodes hold terms, and
//! so on. The builder never re-associates.

use super::ops::{AddOp, MulOp, RelOp};
use super::TypeSpecifier;
use serde::{Deserialize, Serialize};

/// Numeric literal as handed over by the parser
///
/// The parser records the literal's own type together with both payloads;
/// only the one selected by `ty` is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Number {
    pub ty: TypeSpecifier,
    pub int_value: i32,
    pub float_value: f32,
}

impl Number {
    pub fn int(value: i32) -> Self {
        Self { ty: TypeSpecifier::Int, int_value: value, float_value: 0.0 }
    }

    pub fn float(value: f32) -> Self {
        Self { ty: TypeSpecifier::Float, int_value: 0, float_value: value }
    }
}

/// Variable reference, optionally indexed (`a` or `a[expr]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub id: String,
    pub index: Option<Box<Expression>>,
}

impl Var {
    pub fn scalar(id: &str) -> Self {
        Self { id: id.to_string(), index: None }
    }

    pub fn indexed(id: &str, index: Expression) -> Self {
        Self { id: id.to_string(), index: Some(Box::new(index)) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer or float literal
    Num(Number),

    /// Variable or array element reference
    Var(Var),

    /// Assignment: var = value
    Assign {
        var: Var,
        value: Box<Expression>,
    },

    /// Relational comparison, evaluates to an int (0 or 1)
    Relational {
        op: RelOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    Additive {
        op: AddOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    Multiplicative {
        op: MulOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Function call
    Call {
        callee: String,
        args: Vec<Expression>,
    },
}

// Shorthand constructors, mostly used when building trees by hand
impl Expression {
    pub fn int(value: i32) -> Self {
        Expression::Num(Number::int(value))
    }

    pub fn float(value: f32) -> Self {
        Expression::Num(Number::float(value))
    }

    pub fn var(id: &str) -> Self {
        Expression::Var(Var::scalar(id))
    }

    pub fn index(id: &str, index: Expression) -> Self {
        Expression::Var(Var::indexed(id, index))
    }

    pub fn assign(var: Var, value: Expression) -> Self {
        Expression::Assign { var, value: Box::new(value) }
    }

    pub fn relational(op: RelOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Relational { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn additive(op: AddOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Additive { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn multiplicative(op: MulOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Multiplicative { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn call(callee: &str, args: Vec<Expression>) -> Self {
        Expression::Call { callee: callee.to_string(), args }
    }
}
