//! Statement and declaration nodes

use super::expressions::Expression;
use super::TypeSpecifier;
use serde::{Deserialize, Serialize};

/// Whole translation unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Var(VarDeclaration),
    Fun(FunDeclaration),
}

/// `int a;` or `float b[10];`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclaration {
    pub ty: TypeSpecifier,
    pub id: String,
    /// Element count for array declarations
    pub array_len: Option<u32>,
}

impl VarDeclaration {
    pub fn scalar(ty: TypeSpecifier, id: &str) -> Self {
        Self { ty, id: id.to_string(), array_len: None }
    }

    pub fn array(ty: TypeSpecifier, id: &str, len: u32) -> Self {
        Self { ty, id: id.to_string(), array_len: Some(len) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunDeclaration {
    pub ty: TypeSpecifier,
    pub id: String,
    pub params: Vec<Param>,
    pub body: CompoundStmt,
}

/// Function parameter; `is_array` marks `int a[]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub ty: TypeSpecifier,
    pub id: String,
    pub is_array: bool,
}

impl Param {
    pub fn scalar(ty: TypeSpecifier, id: &str) -> Self {
        Self { ty, id: id.to_string(), is_array: false }
    }

    pub fn array(ty: TypeSpecifier, id: &str) -> Self {
        Self { ty, id: id.to_string(), is_array: true }
    }
}

/// `{ local-declarations statement-list }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompoundStmt {
    pub local_declarations: Vec<VarDeclaration>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Compound(CompoundStmt),

    /// Expression statement; `None` for the empty statement `;`
    Expression(Option<Expression>),

    /// if / if-else
    Selection {
        condition: Expression,
        then_stmt: Box<Statement>,
        else_stmt: Option<Box<Statement>>,
    },

    /// while loop
    Iteration {
        condition: Expression,
        body: Box<Statement>,
    },

    Return(Option<Expression>),
}

impl Statement {
    pub fn expr(expr: Expression) -> Self {
        Statement::Expression(Some(expr))
    }

    pub fn if_then(condition: Expression, then_stmt: Statement) -> Self {
        Statement::Selection { condition, then_stmt: Box::new(then_stmt), else_stmt: None }
    }

    pub fn if_else(condition: Expression, then_stmt: Statement, else_stmt: Statement) -> Self {
        Statement::Selection {
            condition,
            then_stmt: Box::new(then_stmt),
            else_stmt: Some(Box::new(else_stmt)),
        }
    }

    pub fn while_loop(condition: Expression, body: Statement) -> Self {
        Statement::Iteration { condition, body: Box::new(body) }
    }

    pub fn ret(expr: Expression) -> Self {
        Statement::Return(Some(expr))
    }
}

