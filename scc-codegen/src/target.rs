//! Calling-convention and target configuration
//!
//! Everything externally variable about the target lives here: the
//! argument registers, the caller/callee-saved split, stack alignment,
//! and the global symbol decoration. The generator's algorithms are
//! parametric over these knobs; the default is the System V AMD64
//! convention.

use crate::reg::Reg;

#[derive(Debug, Clone)]
pub struct Target {
    /// Registers carrying the first arguments, in argument order
    pub argument_regs: Vec<Reg>,
    /// Allocation pool when the function may clobber freely, in the
    /// fixed priority order the allocator scans
    pub caller_saved: Vec<Reg>,
    /// Pool used instead for functions containing calls, when enabled
    pub callee_saved: Vec<Reg>,
    /// Whether the callee-saved pool is used at all
    pub use_callee_saved: bool,
    /// Required stack alignment at call boundaries, in bytes
    pub stack_alignment: i32,
    /// Size of one stack-passed parameter slot
    pub param_slot_size: i32,
    /// Frame offset of the first stack-passed parameter, just above the
    /// saved base pointer and return address
    pub param_offset: i32,
    /// Register holding a function's return value
    pub return_reg: Reg,
    /// Decoration applied to every global symbol reference
    pub global_prefix: String,
    pub global_suffix: String,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            argument_regs: vec![Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9],
            caller_saved: vec![
                Reg::R11,
                Reg::R10,
                Reg::R9,
                Reg::R8,
                Reg::Rcx,
                Reg::Rdx,
                Reg::Rsi,
                Reg::Rdi,
                Reg::Rax,
            ],
            callee_saved: vec![Reg::Rbx, Reg::R12, Reg::R13, Reg::R14, Reg::R15],
            use_callee_saved: false,
            stack_alignment: 16,
            param_slot_size: 8,
            param_offset: 16,
            return_reg: Reg::Rax,
            global_prefix: String::new(),
            global_suffix: String::new(),
        }
    }
}

impl Target {
    /// Number of arguments passed in registers
    pub fn max_register_args(&self) -> usize {
        self.argument_regs.len()
    }

    /// A global symbol as it appears in the output
    pub fn decorate(&self, name: &str) -> String {
        format!("{}{}{}", self.global_prefix, name, self.global_suffix)
    }

    /// Callee-saved registers the prologue must push, if any
    pub fn saved_regs(&self) -> &[Reg] {
        if self.use_callee_saved {
            &self.callee_saved
        } else {
            &[]
        }
    }

    /// The allocation pool for a function. Functions that contain
    /// calls allocate from the callee-saved set when that is enabled,
    /// so values survive calls without spilling.
    pub fn pool(&self, has_call: bool) -> &[Reg] {
        if has_call && self.use_callee_saved && !self.callee_saved.is_empty() {
            &self.callee_saved
        } else {
            &self.caller_saved
        }
    }

    /// Bytes needed on top of `n` to reach the stack alignment
    pub fn alignment_padding(&self, n: i32) -> i32 {
        if n % self.stack_alignment == 0 {
            0
        } else {
            self.stack_alignment - (n.abs() % self.stack_alignment)
        }
    }
}
