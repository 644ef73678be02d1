//! Short-circuit test protocol
//!
//! `test_expr` evaluates a node for control purposes only: it branches
//! to `target` when the node's boolean value equals `on_true`, and for
//! the logical connectives it skips evaluating operands whose value
//! cannot change the outcome. Relationals compare and branch directly;
//! nothing here materializes a boolean.

use log::trace;
use scc_codegen::{AsmInst, Cond, Label, Operand};
use scc_common::CodegenError;
use scc_tree::{Expr, ExprKind};

use crate::emit::Codegen;

impl Codegen<'_> {
    pub(crate) fn test_expr(
        &mut self,
        e: &Expr,
        target: Label,
        on_true: bool,
    ) -> Result<(), CodegenError> {
        trace!("test {} -> {} (on_true={})", e.kind.describe(), target, on_true);
        match &e.kind {
            ExprKind::LessThan(l, r) => self.compare(l, r, Cond::L, target, on_true),
            ExprKind::GreaterThan(l, r) => self.compare(l, r, Cond::G, target, on_true),
            ExprKind::LessOrEqual(l, r) => self.compare(l, r, Cond::Le, target, on_true),
            ExprKind::GreaterOrEqual(l, r) => self.compare(l, r, Cond::Ge, target, on_true),
            ExprKind::Equal(l, r) => self.compare(l, r, Cond::E, target, on_true),
            ExprKind::NotEqual(l, r) => self.compare(l, r, Cond::Ne, target, on_true),

            // Either operand being false decides the conjunction:
            // under polarity=false both share the failure target;
            // under polarity=true a false left operand falls past the
            // jump the right operand takes.
            ExprKind::LogicalAnd(l, r) => {
                if on_true {
                    let skip = self.fresh_label();
                    self.test_expr(l, skip, false)?;
                    self.test_expr(r, target, true)?;
                    self.emit(AsmInst::Label(skip.to_string()));
                    Ok(())
                } else {
                    self.test_expr(l, target, false)?;
                    self.test_expr(r, target, false)
                }
            }

            // A true left operand decides the disjunction: under
            // polarity=false the right operand is skipped entirely;
            // under polarity=true both operands jump to the same
            // target.
            ExprKind::LogicalOr(l, r) => {
                if on_true {
                    self.test_expr(l, target, true)?;
                    self.test_expr(r, target, true)
                } else {
                    let skip = self.fresh_label();
                    self.test_expr(l, skip, true)?;
                    self.test_expr(r, target, false)?;
                    self.emit(AsmInst::Label(skip.to_string()));
                    Ok(())
                }
            }

            // Everything else: materialize and compare against zero
            _ => {
                self.gen_expr(e)?;
                let reg = self.ensure_reg(e)?;
                let width = self.width_of(e)?;
                self.emit(AsmInst::Cmp(width, Operand::Imm(0), Operand::Reg(reg, width)));
                let cond = if on_true { Cond::Ne } else { Cond::E };
                self.emit(AsmInst::Jcc(cond, target.to_string()));
                self.regs.release(e.id);
                Ok(())
            }
        }
    }

    /// Compare-and-branch without materializing the boolean. `cond` is
    /// the condition under which the relation holds; it is negated
    /// when the caller wants the branch taken on falsehood.
    fn compare(
        &mut self,
        l: &Expr,
        r: &Expr,
        cond: Cond,
        target: Label,
        on_true: bool,
    ) -> Result<(), CodegenError> {
        self.gen_expr(l)?;
        self.gen_expr(r)?;

        let reg = self.ensure_reg(l)?;
        let width = self.width_of(l)?;
        let rhs = self.operand_of(r)?;
        self.emit(AsmInst::Cmp(width, rhs, Operand::Reg(reg, width)));

        let cc = if on_true { cond } else { cond.negate() };
        self.emit(AsmInst::Jcc(cc, target.to_string()));

        self.regs.release(l.id);
        self.regs.release(r.id);
        Ok(())
    }
}
