//! Tree construction helper
//!
//! The real front end assigns node identities and nested-call flags as
//! it parses. [`TreeBuilder`] does the same bookkeeping for trees built
//! by hand, which is how the backend's tests produce their input.

use crate::tree::{Expr, ExprKind, Function, NodeId, Stmt, SymbolId, TranslationUnit};
use scc_common::{Ty, TypeSpec};

#[derive(Debug, Default)]
pub struct TreeBuilder {
    unit: TranslationUnit,
    next_id: NodeId,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn node(&mut self, ty: Ty, has_call: bool, kind: ExprKind) -> Expr {
        Expr {
            id: self.fresh(),
            ty,
            has_call,
            kind,
        }
    }

    // ===== Symbols =====

    /// Declare a name without making it a global definition (functions,
    /// parameters, locals).
    pub fn declare(&mut self, name: impl Into<String>, ty: Ty) -> SymbolId {
        self.unit.symbols.add(name, ty)
    }

    /// Declare a global variable; it will be flushed as a `.comm` at the
    /// end of translation.
    pub fn global(&mut self, name: impl Into<String>, ty: Ty) -> SymbolId {
        let id = self.unit.symbols.add(name, ty);
        self.unit.globals.push(id);
        id
    }

    // ===== Leaf expressions =====

    pub fn number(&mut self, value: i64) -> Expr {
        self.node(Ty::int(), false, ExprKind::Number(value))
    }

    pub fn long_number(&mut self, value: i64) -> Expr {
        self.node(Ty::long(), false, ExprKind::Number(value))
    }

    pub fn string(&mut self, text: impl Into<String>) -> Expr {
        self.node(
            Ty::scalar(TypeSpec::Char, 1),
            false,
            ExprKind::Str(text.into()),
        )
    }

    pub fn ident(&mut self, symbol: SymbolId) -> Expr {
        let ty = self.unit.symbols.get(symbol).ty.clone();
        self.node(ty, false, ExprKind::Identifier(symbol))
    }

    pub fn call(&mut self, callee: SymbolId, args: Vec<Expr>) -> Expr {
        let ret = match &self.unit.symbols.get(callee).ty {
            Ty::Function { ret, .. } => (**ret).clone(),
            other => other.clone(),
        };
        self.node(ret, true, ExprKind::Call { callee, args })
    }

    // ===== Unary expressions =====

    pub fn not(&mut self, e: Expr) -> Expr {
        let hc = e.has_call;
        self.node(Ty::int(), hc, ExprKind::Not(Box::new(e)))
    }

    pub fn negate(&mut self, e: Expr) -> Expr {
        let (ty, hc) = (e.ty.clone(), e.has_call);
        self.node(ty, hc, ExprKind::Negate(Box::new(e)))
    }

    pub fn address(&mut self, e: Expr) -> Expr {
        let hc = e.has_call;
        let ty = match &e.ty {
            Ty::Scalar { spec, indirection } => Ty::scalar(*spec, indirection + 1),
            other => other.clone(),
        };
        self.node(ty, hc, ExprKind::Address(Box::new(e)))
    }

    pub fn deref(&mut self, e: Expr) -> Expr {
        let (ty, hc) = (e.ty.deref(), e.has_call);
        self.node(ty, hc, ExprKind::Dereference(Box::new(e)))
    }

    pub fn cast(&mut self, ty: Ty, e: Expr) -> Expr {
        let hc = e.has_call;
        self.node(ty, hc, ExprKind::Cast(Box::new(e)))
    }

    // ===== Binary expressions =====

    fn binary(
        &mut self,
        ty: Ty,
        l: Expr,
        r: Expr,
        make: fn(Box<Expr>, Box<Expr>) -> ExprKind,
    ) -> Expr {
        let hc = l.has_call || r.has_call;
        self.node(ty, hc, make(Box::new(l), Box::new(r)))
    }

    pub fn add(&mut self, l: Expr, r: Expr) -> Expr {
        let ty = l.ty.clone();
        self.binary(ty, l, r, ExprKind::Add)
    }

    pub fn subtract(&mut self, l: Expr, r: Expr) -> Expr {
        let ty = l.ty.clone();
        self.binary(ty, l, r, ExprKind::Subtract)
    }

    pub fn multiply(&mut self, l: Expr, r: Expr) -> Expr {
        let ty = l.ty.clone();
        self.binary(ty, l, r, ExprKind::Multiply)
    }

    pub fn divide(&mut self, l: Expr, r: Expr) -> Expr {
        let ty = l.ty.clone();
        self.binary(ty, l, r, ExprKind::Divide)
    }

    pub fn remainder(&mut self, l: Expr, r: Expr) -> Expr {
        let ty = l.ty.clone();
        self.binary(ty, l, r, ExprKind::Remainder)
    }

    pub fn less_than(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::LessThan)
    }

    pub fn greater_than(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::GreaterThan)
    }

    pub fn less_or_equal(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::LessOrEqual)
    }

    pub fn greater_or_equal(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::GreaterOrEqual)
    }

    pub fn equal(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::Equal)
    }

    pub fn not_equal(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::NotEqual)
    }

    pub fn and(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::LogicalAnd)
    }

    pub fn or(&mut self, l: Expr, r: Expr) -> Expr {
        self.binary(Ty::int(), l, r, ExprKind::LogicalOr)
    }

    // ===== Functions and the finished unit =====

    pub fn function(
        &mut self,
        symbol: SymbolId,
        params: Vec<SymbolId>,
        locals: Vec<SymbolId>,
        body: Vec<Stmt>,
    ) {
        let has_call = body.iter().any(stmt_has_call);
        self.unit.functions.push(Function {
            symbol,
            params,
            locals,
            body,
            has_call,
        });
    }

    pub fn finish(self) -> TranslationUnit {
        self.unit
    }
}

fn stmt_has_call(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Block(stmts) => stmts.iter().any(stmt_has_call),
        Stmt::Simple(e) | Stmt::Return(e) => e.has_call,
        Stmt::Assignment { target, value } => target.has_call || value.has_call,
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            cond.has_call
                || stmt_has_call(then_branch)
                || else_branch.as_deref().is_some_and(stmt_has_call)
        }
        Stmt::While { cond, body } => cond.has_call || stmt_has_call(body),
    }
}
