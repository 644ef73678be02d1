//! Function lowering: frame open, prologue, body, epilogue, close
//!
//! The prologue reserves stack space through the deferred `<fn>.size`
//! constant because the spill count is unknown until the body has been
//! walked; the constant is defined once, after the epilogue. Register
//! parameters are stored to their frame slots eagerly at entry, so the
//! body can treat every parameter as frame-resident.

use log::{debug, info};
use scc_codegen::{AsmInst, Operand, Reg, Width};
use scc_common::CodegenError;
use scc_tree::Function;

use crate::emit::Codegen;
use crate::frame::Frame;

impl Codegen<'_> {
    /// Generate one function, returning its buffered instructions.
    /// On error the buffer is abandoned with the function half
    /// emitted; the caller must not flush it.
    pub(crate) fn gen_function(&mut self, f: &Function) -> Result<Vec<AsmInst>, CodegenError> {
        let symbols = self.symbols;
        let sym = symbols.get(f.symbol);
        let name = self.target.decorate(&sym.name);
        info!("generating function '{}'", sym.name);

        // Reset per-function state
        self.out.clear();
        self.offsets.clear();
        self.sym_offsets.clear();
        let return_label = self.labels.fresh();
        self.frame = Frame::open(sym.name.clone(), return_label);
        self.regs.reset(self.target.pool(f.has_call));

        let k = self.target.max_register_args();
        let saved: Vec<Reg> = self.target.saved_regs().to_vec();
        let param_base =
            self.target.param_offset + self.target.param_slot_size * saved.len() as i32;

        // Register-passed parameters and locals get descending slots;
        // excess parameters already live above the frame base where
        // the caller pushed them.
        for (i, &p) in f.params.iter().enumerate() {
            let offset = if i < k {
                let size = symbols.get(p).ty.size();
                self.frame.reserve(size)
            } else {
                param_base + self.target.param_slot_size * (i - k) as i32
            };
            debug!("parameter '{}' at {}", symbols.get(p).name, offset);
            self.sym_offsets.insert(p, offset);
        }
        for &l in &f.locals {
            let size = symbols.get(l).ty.size();
            let offset = self.frame.reserve(size);
            debug!("local '{}' at {}", symbols.get(l).name, offset);
            self.sym_offsets.insert(l, offset);
        }

        // Prologue
        self.emit(AsmInst::Label(name.clone()));
        self.emit(AsmInst::Push(Operand::Reg(Reg::Rbp, Width::Quad)));
        for &r in &saved {
            self.emit(AsmInst::Push(Operand::Reg(r, Width::Quad)));
        }
        self.emit(AsmInst::Mov(
            Width::Quad,
            Operand::Reg(Reg::Rsp, Width::Quad),
            Operand::Reg(Reg::Rbp, Width::Quad),
        ));
        self.emit(AsmInst::Mov(
            Width::Long,
            Operand::SymImm(self.frame.size_symbol()),
            Operand::Reg(Reg::Rax, Width::Long),
        ));
        self.emit(AsmInst::Sub(
            Width::Quad,
            Operand::Reg(Reg::Rax, Width::Quad),
            Operand::Reg(Reg::Rsp, Width::Quad),
        ));

        // Spill register-passed parameters into their slots
        for (i, &p) in f.params.iter().take(k).enumerate() {
            let width = Width::from_size(symbols.get(p).ty.size())?;
            let offset = self.sym_offsets[&p];
            self.emit(AsmInst::Mov(
                width,
                Operand::Reg(self.target.argument_regs[i], width),
                Operand::Frame(offset),
            ));
        }

        // Body
        for s in &f.body {
            self.gen_stmt(s)?;
        }

        // Epilogue
        self.emit(AsmInst::Label(return_label.to_string()));
        self.emit(AsmInst::Label(format!("{}.exit", name)));
        self.emit(AsmInst::Mov(
            Width::Quad,
            Operand::Reg(Reg::Rbp, Width::Quad),
            Operand::Reg(Reg::Rsp, Width::Quad),
        ));
        for &r in saved.iter().rev() {
            self.emit(AsmInst::Pop(Operand::Reg(r, Width::Quad)));
        }
        self.emit(AsmInst::Pop(Operand::Reg(Reg::Rbp, Width::Quad)));
        self.emit(AsmInst::Ret);

        // Close: define the deferred size, now that every spill slot
        // has been assigned.
        let set_size = self.frame.close(self.target)?;
        self.emit(set_size);
        self.emit(AsmInst::Globl(name.clone()));
        self.emit(AsmInst::TypeFunction(name));
        self.emit(AsmInst::Blank);

        Ok(std::mem::take(&mut self.out))
    }
}
