//! Value-producing expression emission
//!
//! One rule per node kind. A rule ends with the node materialized: in
//! a register for anything computed, or left at its home for leaves
//! (numbers, identifiers, string literals), which the operand model
//! renders on demand. Binary arithmetic accumulates in place: the
//! result takes over the left operand's register, so no rule ever
//! allocates a register for its own result.

use scc_codegen::{AsmInst, Operand, Reg, Width};
use scc_common::CodegenError;
use scc_tree::{Expr, ExprKind};

use crate::emit::Codegen;

impl Codegen<'_> {
    pub(crate) fn gen_expr(&mut self, e: &Expr) -> Result<(), CodegenError> {
        match &e.kind {
            // Leaves materialize lazily through the operand model
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Identifier(_) => Ok(()),

            ExprKind::Call { .. } => self.gen_call(e),

            ExprKind::Add(l, r) => self.accumulate(e, l, r, AsmInst::Add),
            ExprKind::Subtract(l, r) => self.accumulate(e, l, r, AsmInst::Sub),
            ExprKind::Multiply(l, r) => self.accumulate(e, l, r, AsmInst::Imul),
            ExprKind::Divide(l, r) => self.divide(e, l, r, Reg::Rax),
            ExprKind::Remainder(l, r) => self.divide(e, l, r, Reg::Rdx),

            ExprKind::Negate(inner) => {
                self.gen_expr(inner)?;
                let reg = self.ensure_reg(inner)?;
                let width = self.width_of(inner)?;
                self.emit(AsmInst::Neg(width, Operand::Reg(reg, width)));
                self.regs.bind(e.id, width, reg);
                Ok(())
            }

            ExprKind::Not(inner) => {
                self.gen_expr(inner)?;
                let reg = self.ensure_reg(inner)?;
                let width = self.width_of(inner)?;
                self.emit(AsmInst::Cmp(width, Operand::Imm(0), Operand::Reg(reg, width)));
                self.emit(AsmInst::Sete(Operand::Reg(reg, Width::Byte)));
                self.emit(AsmInst::Movzbl(Operand::Reg(reg, Width::Byte), reg));
                self.regs.bind(e.id, Width::Long, reg);
                Ok(())
            }

            ExprKind::Address(inner) => {
                self.gen_expr(inner)?;
                match self.regs.reg_of(inner.id) {
                    None => {
                        let src = self.operand_of(inner)?;
                        let reg = self.acquire()?;
                        self.emit(AsmInst::Lea(src, reg));
                        self.regs.bind(e.id, Width::Quad, reg);
                    }
                    Some(reg) => {
                        self.emit(AsmInst::Lea(Operand::Indirect(reg), reg));
                        self.regs.bind(e.id, Width::Quad, reg);
                    }
                }
                Ok(())
            }

            ExprKind::Dereference(inner) => {
                self.gen_expr(inner)?;
                let reg = self.ensure_reg(inner)?;
                let width = self.width_of(e)?;
                self.emit(AsmInst::Mov(
                    width,
                    Operand::Indirect(reg),
                    Operand::Reg(reg, width),
                ));
                self.regs.bind(e.id, width, reg);
                Ok(())
            }

            ExprKind::Cast(inner) => {
                self.gen_expr(inner)?;
                let source = self.width_of(inner)?;
                let targetw = self.width_of(e)?;
                let reg = self.ensure_reg(inner)?;
                if targetw.size() <= source.size() {
                    // Narrowing and same-width casts reinterpret in place
                    self.regs.bind(e.id, targetw, reg);
                } else {
                    self.emit(AsmInst::Movsx(
                        source,
                        targetw,
                        Operand::Reg(reg, source),
                        reg,
                    ));
                    self.regs.bind(e.id, targetw, reg);
                }
                Ok(())
            }

            // Relationals and logical connectives produce a branch, not
            // a value; when one is used as a value the front end wraps
            // it, so reaching here is a tree inconsistency.
            ExprKind::LessThan(..)
            | ExprKind::GreaterThan(..)
            | ExprKind::LessOrEqual(..)
            | ExprKind::GreaterOrEqual(..)
            | ExprKind::Equal(..)
            | ExprKind::NotEqual(..)
            | ExprKind::LogicalAnd(..)
            | ExprKind::LogicalOr(..) => Err(CodegenError::internal(format!(
                "{} generated as a value",
                e.kind.describe()
            ))),
        }
    }

    /// Shared rule for add/sub/imul: evaluate left then right, force
    /// the left into a register, fold the right in, release the right,
    /// and hand the register over to the result.
    fn accumulate(
        &mut self,
        e: &Expr,
        l: &Expr,
        r: &Expr,
        make: fn(Width, Operand, Operand) -> AsmInst,
    ) -> Result<(), CodegenError> {
        self.gen_expr(l)?;
        self.gen_expr(r)?;

        let reg = self.ensure_reg(l)?;
        let width = self.width_of(l)?;
        let rhs = self.operand_of(r)?;
        self.emit(make(width, rhs, Operand::Reg(reg, width)));

        self.regs.release(r.id);
        self.regs.bind(e.id, width, reg);
        Ok(())
    }

    /// Division and remainder run through `idiv`: the dividend is
    /// forced into `%rax`, `%rdx` is freed and filled by the
    /// width-matched sign extension (`cltd` or `cqto`), and the result
    /// register picks quotient or remainder.
    fn divide(&mut self, e: &Expr, l: &Expr, r: &Expr, result: Reg) -> Result<(), CodegenError> {
        self.gen_expr(l)?;
        self.gen_expr(r)?;

        // idiv takes no immediate operand
        if matches!(r.kind, ExprKind::Number(_)) && self.regs.reg_of(r.id).is_none() {
            self.ensure_reg(r)?;
        }

        self.load(l, Reg::Rax)?;
        self.spill(Reg::Rdx)?;

        let width = self.width_of(r)?;
        let rhs = self.operand_of(r)?;
        self.emit(if width == Width::Quad {
            AsmInst::Cqto
        } else {
            AsmInst::Cltd
        });
        self.emit(AsmInst::Idiv(width, rhs));

        self.regs.release(l.id);
        self.regs.release(r.id);
        self.regs.bind(e.id, self.width_of(e)?, result);
        Ok(())
    }

    /// Evaluate `e` as an assignment target. Returns true when the
    /// result is an address held in a register (assignment must store
    /// through it), false when `e` renders as a plain operand.
    pub(crate) fn gen_addr(&mut self, e: &Expr) -> Result<bool, CodegenError> {
        match &e.kind {
            ExprKind::Dereference(inner) => {
                self.gen_expr(inner)?;
                let reg = self.ensure_reg(inner)?;
                self.regs.bind(e.id, Width::Quad, reg);
                Ok(true)
            }
            _ => {
                self.gen_expr(e)?;
                Ok(false)
            }
        }
    }
}
