//! Statement emission
//!
//! Statements come out in textual order; blocks recurse without
//! opening a new frame. Conditions are evaluated through the test
//! protocol with polarity=false, jumping away when the condition does
//! not hold.

use scc_codegen::{AsmInst, Operand};
use scc_common::CodegenError;
use scc_tree::Stmt;

use crate::emit::Codegen;

impl Codegen<'_> {
    pub(crate) fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.gen_stmt(s)?;
                }
                Ok(())
            }

            Stmt::Simple(e) => {
                self.gen_expr(e)?;
                self.regs.release(e.id);
                Ok(())
            }

            Stmt::Assignment { target, value } => {
                let indirect = self.gen_addr(target)?;
                self.gen_expr(value)?;

                let reg = self.ensure_reg(value)?;
                let width = self.width_of(value)?;

                if indirect {
                    // The target's address is register-resident; store
                    // through it.
                    let addr = self.ensure_reg(target)?;
                    self.emit(AsmInst::Mov(
                        width,
                        Operand::Reg(reg, width),
                        Operand::Indirect(addr),
                    ));
                } else {
                    let dst = self.operand_of(target)?;
                    self.emit(AsmInst::Mov(width, Operand::Reg(reg, width), dst));
                }

                self.regs.release(target.id);
                self.regs.release(value.id);
                Ok(())
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let skip = self.fresh_label();
                self.test_expr(cond, skip, false)?;
                self.gen_stmt(then_branch)?;

                match else_branch {
                    Some(els) => {
                        let exit = self.fresh_label();
                        self.emit(AsmInst::Jmp(exit.to_string()));
                        self.emit(AsmInst::Label(skip.to_string()));
                        self.gen_stmt(els)?;
                        self.emit(AsmInst::Label(exit.to_string()));
                    }
                    None => {
                        self.emit(AsmInst::Label(skip.to_string()));
                    }
                }
                Ok(())
            }

            Stmt::While { cond, body } => {
                let head = self.fresh_label();
                let exit = self.fresh_label();

                self.emit(AsmInst::Label(head.to_string()));
                self.test_expr(cond, exit, false)?;
                self.gen_stmt(body)?;
                self.emit(AsmInst::Jmp(head.to_string()));
                self.emit(AsmInst::Label(exit.to_string()));
                Ok(())
            }

            Stmt::Return(e) => {
                self.gen_expr(e)?;
                let width = self.width_of(e)?;
                let src = self.operand_of(e)?;
                let ret = self.target.return_reg;
                self.emit(AsmInst::Mov(width, src, Operand::Reg(ret, width)));
                self.regs.release(e.id);
                self.emit(AsmInst::Jmp(self.frame.return_label.to_string()));
                Ok(())
            }
        }
    }
}
