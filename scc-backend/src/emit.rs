//! Generator context
//!
//! One [`Codegen`] lives for a translation unit; its per-function parts
//! (register file, frame, spill offsets) are reset by the function
//! lowering in [`crate::function`]. Everything an emission rule needs
//! is reached through `self`, so there is no global mutable state.
//!
//! The operand model lives here too: [`Codegen::operand_of`] renders a
//! node's current materialization, which is what keeps every emission
//! rule width- and register-agnostic.

use log::{debug, trace};
use scc_codegen::{AsmInst, Label, LabelAllocator, Operand, Reg, Target, Width};
use scc_common::CodegenError;
use scc_tree::{Expr, ExprKind, NodeId, SymbolId, SymbolTable};
use std::collections::HashMap;

use crate::frame::Frame;
use crate::globals::GlobalManager;
use crate::regmgmt::RegisterFile;

pub struct Codegen<'a> {
    pub(crate) target: &'a Target,
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) labels: LabelAllocator,
    pub(crate) globals: GlobalManager,

    // Per-function state, reset by `function::lower_function`
    pub(crate) regs: RegisterFile,
    pub(crate) frame: Frame,
    /// Spill slots of temporaries, keyed by node
    pub(crate) offsets: HashMap<NodeId, i32>,
    /// Frame offsets of the current function's parameters and locals
    pub(crate) sym_offsets: HashMap<SymbolId, i32>,
    /// Buffered output for the function being generated; flushed only
    /// when the whole function succeeded
    pub(crate) out: Vec<AsmInst>,
}

impl<'a> Codegen<'a> {
    pub fn new(target: &'a Target, symbols: &'a SymbolTable) -> Self {
        Self {
            target,
            symbols,
            labels: LabelAllocator::new(),
            globals: GlobalManager::new(),
            regs: RegisterFile::new(),
            frame: Frame::unopened(),
            offsets: HashMap::new(),
            sym_offsets: HashMap::new(),
            out: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, inst: AsmInst) {
        self.out.push(inst);
    }

    pub(crate) fn fresh_label(&mut self) -> Label {
        self.labels.fresh()
    }

    pub(crate) fn width_of(&self, e: &Expr) -> Result<Width, CodegenError> {
        Width::from_size(e.ty.size())
    }

    /// Render a node's current materialization: its register when it
    /// has one, otherwise its home (immediate, global, frame slot, or
    /// the spill slot a temporary was evicted to).
    pub(crate) fn operand_of(&mut self, e: &Expr) -> Result<Operand, CodegenError> {
        if let Some(reg) = self.regs.reg_of(e.id) {
            return Ok(Operand::Reg(reg, self.width_of(e)?));
        }

        match &e.kind {
            ExprKind::Number(value) => Ok(Operand::Imm(*value)),
            ExprKind::Str(text) => {
                let label = self.globals.intern(text, &mut self.labels);
                Ok(Operand::Sym(format!(
                    "{}{}",
                    label, self.target.global_suffix
                )))
            }
            ExprKind::Identifier(sym) => match self.sym_offsets.get(sym) {
                Some(offset) => Ok(Operand::Frame(*offset)),
                None => {
                    let name = &self.symbols.get(*sym).name;
                    Ok(Operand::Sym(self.target.decorate(name)))
                }
            },
            _ => match self.offsets.get(&e.id) {
                Some(offset) => Ok(Operand::Frame(*offset)),
                None => Err(CodegenError::internal(format!(
                    "operand requested for unmaterialized {}",
                    e.kind.describe()
                ))),
            },
        }
    }

    /// A free register, evicting the fixed-priority victim if the pool
    /// is full. Never fails: register pressure is recovered locally at
    /// the cost of one spill store.
    pub(crate) fn acquire(&mut self) -> Result<Reg, CodegenError> {
        if let Some(reg) = self.regs.find_free() {
            return Ok(reg);
        }
        let victim = self.regs.eviction_victim();
        debug!("no free registers, evicting {:?}", victim);
        self.spill(victim)?;
        Ok(victim)
    }

    /// Move the occupant of `reg`, if any, to a fresh frame slot and
    /// unbind it. Its later uses reload from the slot through the
    /// operand model.
    pub(crate) fn spill(&mut self, reg: Reg) -> Result<(), CodegenError> {
        if let Some(binding) = self.regs.occupant(reg) {
            let offset = self.frame.reserve(binding.width.size());
            trace!("spilling node {} from {:?} to {}", binding.node, reg, offset);
            self.offsets.insert(binding.node, offset);
            self.emit(AsmInst::Mov(
                binding.width,
                Operand::Reg(reg, binding.width),
                Operand::Frame(offset),
            ));
            self.regs.release(binding.node);
        }
        Ok(())
    }

    /// Force `e` into a specific register, spilling whatever held it.
    pub(crate) fn load(&mut self, e: &Expr, reg: Reg) -> Result<(), CodegenError> {
        if self.regs.reg_of(e.id) == Some(reg) {
            return Ok(());
        }
        self.spill(reg)?;
        let width = self.width_of(e)?;
        let src = self.operand_of(e)?;
        self.emit(AsmInst::Mov(width, src, Operand::Reg(reg, width)));
        self.regs.bind(e.id, width, reg);
        Ok(())
    }

    /// The register `e` lives in, loading it into a fresh one if it is
    /// not register-resident yet.
    pub(crate) fn ensure_reg(&mut self, e: &Expr) -> Result<Reg, CodegenError> {
        if let Some(reg) = self.regs.reg_of(e.id) {
            return Ok(reg);
        }
        let reg = self.acquire()?;
        self.load(e, reg)?;
        Ok(reg)
    }
}
