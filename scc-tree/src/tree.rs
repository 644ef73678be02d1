//! Tree node definitions
//!
//! One closed enum per syntactic category; every emission rule in the
//! backend matches exhaustively over these, so adding a node kind is a
//! compile-time event for every component that must handle it.

use scc_common::Ty;
use serde::{Deserialize, Serialize};

/// Identity of an expression node, unique within a translation unit
pub type NodeId = u32;

/// Index into the translation unit's symbol table
pub type SymbolId = u32;

/// A declared name: a global, a parameter, a local, or a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
}

/// Flat symbol table owned by the translation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, ty: Ty) -> SymbolId {
        let id = self.symbols.len() as SymbolId;
        self.symbols.push(Symbol {
            name: name.into(),
            ty,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A type-checked expression
///
/// `has_call` is precomputed by the front end: true when this node or
/// any node beneath it is a function call. The call sequencer uses it
/// to decide argument evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub ty: Ty,
    pub has_call: bool,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Number(i64),
    Str(String),
    Identifier(SymbolId),
    Call {
        callee: SymbolId,
        args: Vec<Expr>,
    },

    Not(Box<Expr>),
    Negate(Box<Expr>),
    Address(Box<Expr>),
    Dereference(Box<Expr>),
    Cast(Box<Expr>),

    Multiply(Box<Expr>, Box<Expr>),
    Divide(Box<Expr>, Box<Expr>),
    Remainder(Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Subtract(Box<Expr>, Box<Expr>),

    LessThan(Box<Expr>, Box<Expr>),
    GreaterThan(Box<Expr>, Box<Expr>),
    LessOrEqual(Box<Expr>, Box<Expr>),
    GreaterOrEqual(Box<Expr>, Box<Expr>),
    Equal(Box<Expr>, Box<Expr>),
    NotEqual(Box<Expr>, Box<Expr>),

    LogicalAnd(Box<Expr>, Box<Expr>),
    LogicalOr(Box<Expr>, Box<Expr>),
}

impl ExprKind {
    /// Short name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Number(_) => "number",
            ExprKind::Str(_) => "string literal",
            ExprKind::Identifier(_) => "identifier",
            ExprKind::Call { .. } => "call",
            ExprKind::Not(_) => "logical not",
            ExprKind::Negate(_) => "negation",
            ExprKind::Address(_) => "address-of",
            ExprKind::Dereference(_) => "dereference",
            ExprKind::Cast(_) => "cast",
            ExprKind::Multiply(..) => "multiplication",
            ExprKind::Divide(..) => "division",
            ExprKind::Remainder(..) => "remainder",
            ExprKind::Add(..) => "addition",
            ExprKind::Subtract(..) => "subtraction",
            ExprKind::LessThan(..) => "less-than",
            ExprKind::GreaterThan(..) => "greater-than",
            ExprKind::LessOrEqual(..) => "less-or-equal",
            ExprKind::GreaterOrEqual(..) => "greater-or-equal",
            ExprKind::Equal(..) => "equality",
            ExprKind::NotEqual(..) => "inequality",
            ExprKind::LogicalAnd(..) => "logical and",
            ExprKind::LogicalOr(..) => "logical or",
        }
    }
}

/// A type-checked statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Block(Vec<Stmt>),
    /// Expression evaluated for its side effects only
    Simple(Expr),
    Assignment {
        target: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Return(Expr),
}

/// A defined function: its symbol, parameters and locals in declaration
/// order, and a body already flattened into a statement list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub symbol: SymbolId,
    pub params: Vec<SymbolId>,
    pub locals: Vec<SymbolId>,
    pub body: Vec<Stmt>,
    /// True when any statement in the body contains a call; decides
    /// which register pool the generator uses when callee-saved
    /// allocation is enabled.
    pub has_call: bool,
}

/// Everything the front end produced for one source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub symbols: SymbolTable,
    /// Non-function globals, in declaration order
    pub globals: Vec<SymbolId>,
    pub functions: Vec<Function>,
}
