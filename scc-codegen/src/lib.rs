//! Simple C Compiler - Target Model
//!
//! This crate defines everything the generator knows about the machine:
//! the x86-64 register set with its width-dependent names, the textual
//! AT&T instruction model, operand rendering with size suffixes, labels,
//! and the calling-convention configuration.

pub mod asm;
pub mod label;
pub mod reg;
pub mod target;

pub use asm::{AsmInst, Cond, Operand, Width};
pub use label::{Label, LabelAllocator};
pub use reg::Reg;
pub use target::Target;
