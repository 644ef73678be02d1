//! Call sequencer
//!
//! Drives a call site from argument evaluation to result binding:
//! arguments containing nested calls are evaluated first (right to
//! left, so inner calls cannot clobber outer arguments already
//! placed), stack space for excess arguments is reserved up front with
//! alignment padding, every caller-saved register still occupied is
//! flushed before the call, and the stack is reclaimed afterwards.

use log::{debug, trace};
use scc_codegen::{AsmInst, Operand, Reg, Width};
use scc_common::{CodegenError, Ty};
use scc_tree::{Expr, ExprKind};

use crate::emit::Codegen;

impl Codegen<'_> {
    pub(crate) fn gen_call(&mut self, e: &Expr) -> Result<(), CodegenError> {
        let (callee, args) = match &e.kind {
            ExprKind::Call { callee, args } => (*callee, args),
            other => {
                return Err(CodegenError::internal(format!(
                    "call sequencer invoked on {}",
                    other.describe()
                )))
            }
        };

        let symbols = self.symbols;
        let sym = symbols.get(callee);
        let variadic = match &sym.ty {
            Ty::Function { params, .. } => params.is_none(),
            _ => {
                return Err(CodegenError::BadCallShape {
                    callee: sym.name.clone(),
                    detail: "callee is not a function".into(),
                })
            }
        };
        let name = self.target.decorate(&sym.name);
        debug!("call to '{}' with {} arguments", name, args.len());

        let k = self.target.max_register_args();
        let slot = self.target.param_slot_size;

        // Arguments with nested calls go first so the inner call
        // sequences cannot disturb values placed for this one.
        for arg in args.iter().rev().filter(|a| a.has_call) {
            trace!("pre-evaluating nested-call argument");
            self.gen_expr(arg)?;
        }

        // Reserve the alignment padding for stack-passed arguments up
        // front; the pushes below supply the rest.
        let mut bytes_pushed: i32 = 0;
        if args.len() > k {
            let padding = self.target.alignment_padding((args.len() - k) as i32 * slot);
            if padding > 0 {
                self.emit(AsmInst::Sub(
                    Width::Quad,
                    Operand::Imm(padding as i64),
                    Operand::Reg(Reg::Rsp, Width::Quad),
                ));
                bytes_pushed = padding;
            }
        }

        // Marshal right to left: the first k into their argument
        // registers, the rest pushed. A placed argument is released
        // immediately so the caller-saved flush below cannot evict it.
        for (i, arg) in args.iter().enumerate().rev() {
            if !arg.has_call {
                self.gen_expr(arg)?;
            }

            if i < k {
                let dst = self.target.argument_regs[i];
                self.load(arg, dst)?;
            } else {
                bytes_pushed += slot;

                if let Some(reg) = self.regs.reg_of(arg.id) {
                    self.emit(AsmInst::Push(Operand::Reg(reg, Width::Quad)));
                } else if matches!(arg.kind, ExprKind::Number(_)) || arg.ty.size() == slot as u32 {
                    let src = self.operand_of(arg)?;
                    self.emit(AsmInst::Push(src));
                } else {
                    // Narrow memory operands stage through a scratch
                    // register; pushq cannot take them directly.
                    self.load(arg, Reg::Rax)?;
                    self.emit(AsmInst::Push(Operand::Reg(Reg::Rax, Width::Quad)));
                }
            }

            self.regs.release(arg.id);
        }

        // Flush every caller-saved register still holding a value,
        // whether or not the callee actually clobbers it.
        for reg in self.target.caller_saved.clone() {
            self.spill(reg)?;
        }

        // Unprototyped callees may be variadic: signal zero
        // floating-point arguments.
        if variadic {
            self.emit(AsmInst::Mov(
                Width::Long,
                Operand::Imm(0),
                Operand::Reg(Reg::Rax, Width::Long),
            ));
        }

        self.emit(AsmInst::Call(name));

        if bytes_pushed > 0 {
            self.emit(AsmInst::Add(
                Width::Quad,
                Operand::Imm(bytes_pushed as i64),
                Operand::Reg(Reg::Rsp, Width::Quad),
            ));
        }

        let ret = self.target.return_reg;
        self.regs.bind(e.id, self.width_of(e)?, ret);
        Ok(())
    }
}
