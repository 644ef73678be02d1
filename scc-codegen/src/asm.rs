//! AT&T assembly text model
//!
//! Instructions carry already-rendered operands and a width; `Display`
//! produces exactly one line of GNU assembler text per instruction
//! (string definitions take two). The generator buffers these per
//! function and flushes them in emission order.

use crate::reg::Reg;
use scc_common::CodegenError;
use std::fmt;

/// Operand width, derived from a value's type size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    Byte,
    Long,
    Quad,
}

impl Width {
    /// Map a type size in bytes to a width. Any size other than 1, 4
    /// or 8 is a tree inconsistency and fatal.
    pub fn from_size(size: u32) -> Result<Width, CodegenError> {
        match size {
            1 => Ok(Width::Byte),
            4 => Ok(Width::Long),
            8 => Ok(Width::Quad),
            _ => Err(CodegenError::UnsupportedOperandSize { size }),
        }
    }

    pub fn suffix(&self) -> char {
        match self {
            Width::Byte => 'b',
            Width::Long => 'l',
            Width::Quad => 'q',
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Long => 4,
            Width::Quad => 8,
        }
    }
}

/// Branch conditions for `j<cc>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    E,
    Ne,
    L,
    Le,
    G,
    Ge,
}

impl Cond {
    /// The condition taken when this one is not
    pub fn negate(&self) -> Cond {
        match self {
            Cond::E => Cond::Ne,
            Cond::Ne => Cond::E,
            Cond::L => Cond::Ge,
            Cond::Ge => Cond::L,
            Cond::G => Cond::Le,
            Cond::Le => Cond::G,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::E => write!(f, "e"),
            Cond::Ne => write!(f, "ne"),
            Cond::L => write!(f, "l"),
            Cond::Le => write!(f, "le"),
            Cond::G => write!(f, "g"),
            Cond::Ge => write!(f, "ge"),
        }
    }
}

/// A rendered operand: how a value is currently materialized
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Register-resident, rendered at the value's width
    Reg(Reg, Width),
    /// Frame-resident at a byte offset from `%rbp`
    Frame(i32),
    /// Compile-time constant
    Imm(i64),
    /// Global symbol reference, already decorated for the target
    Sym(String),
    /// Symbolic immediate (`$f.size`), resolved by the assembler
    SymImm(String),
    /// Memory addressed through a register holding a pointer
    Indirect(Reg),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg, width) => f.write_str(reg.name(*width)),
            Operand::Frame(offset) => write!(f, "{}(%rbp)", offset),
            Operand::Imm(value) => write!(f, "${}", value),
            Operand::Sym(name) => f.write_str(name),
            Operand::SymImm(name) => write!(f, "${}", name),
            Operand::Indirect(reg) => write!(f, "({})", reg.as_quad()),
        }
    }
}

/// One line of generated assembly
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    Label(String),
    Mov(Width, Operand, Operand),
    /// Sign extension; mnemonic is chosen from the source and
    /// destination widths (`movsbl`, `movsbq`, `movslq`)
    Movsx(Width, Width, Operand, Reg),
    Movzbl(Operand, Reg),
    Lea(Operand, Reg),
    Add(Width, Operand, Operand),
    Sub(Width, Operand, Operand),
    Imul(Width, Operand, Operand),
    Cltd,
    Cqto,
    Idiv(Width, Operand),
    Neg(Width, Operand),
    Cmp(Width, Operand, Operand),
    Sete(Operand),
    Jmp(String),
    Jcc(Cond, String),
    Call(String),
    Push(Operand),
    Pop(Operand),
    Ret,

    // Directives
    SetConst { symbol: String, value: i64 },
    Globl(String),
    TypeFunction(String),
    Comm { name: String, size: u32 },
    Asciz { label: String, text: String },

    Comment(String),
    Blank,
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Label(name) => write!(f, "{}:", name),
            AsmInst::Mov(w, src, dst) => write!(f, "\tmov{}\t{}, {}", w.suffix(), src, dst),
            AsmInst::Movsx(from, to, src, dst) => write!(
                f,
                "\tmovs{}{}\t{}, {}",
                from.suffix(),
                to.suffix(),
                src,
                dst.name(*to)
            ),
            AsmInst::Movzbl(src, dst) => write!(f, "\tmovzbl\t{}, {}", src, dst.as_long()),
            AsmInst::Lea(src, dst) => write!(f, "\tleaq\t{}, {}", src, dst.as_quad()),
            AsmInst::Add(w, src, dst) => write!(f, "\tadd{}\t{}, {}", w.suffix(), src, dst),
            AsmInst::Sub(w, src, dst) => write!(f, "\tsub{}\t{}, {}", w.suffix(), src, dst),
            AsmInst::Imul(w, src, dst) => write!(f, "\timul{}\t{}, {}", w.suffix(), src, dst),
            AsmInst::Cltd => write!(f, "\tcltd"),
            AsmInst::Cqto => write!(f, "\tcqto"),
            AsmInst::Idiv(w, src) => write!(f, "\tidiv{}\t{}", w.suffix(), src),
            AsmInst::Neg(w, dst) => write!(f, "\tneg{}\t{}", w.suffix(), dst),
            AsmInst::Cmp(w, src, dst) => write!(f, "\tcmp{}\t{}, {}", w.suffix(), src, dst),
            AsmInst::Sete(dst) => write!(f, "\tsete\t{}", dst),
            AsmInst::Jmp(label) => write!(f, "\tjmp\t{}", label),
            AsmInst::Jcc(cond, label) => write!(f, "\tj{}\t{}", cond, label),
            AsmInst::Call(name) => write!(f, "\tcall\t{}", name),
            AsmInst::Push(src) => write!(f, "\tpushq\t{}", src),
            AsmInst::Pop(dst) => write!(f, "\tpopq\t{}", dst),
            AsmInst::Ret => write!(f, "\tret"),
            AsmInst::SetConst { symbol, value } => write!(f, "\t.set\t{}, {}", symbol, value),
            AsmInst::Globl(name) => write!(f, "\t.globl\t{}", name),
            AsmInst::TypeFunction(name) => write!(f, "\t.type\t{}, @function", name),
            AsmInst::Comm { name, size } => write!(f, "\t.comm\t{}, {}", name, size),
            AsmInst::Asciz { label, text } => write!(f, "{}:\n\t.string \"{}\"", label, text),
            AsmInst::Comment(text) => write!(f, "# {}", text),
            AsmInst::Blank => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_width_from_size() {
        assert_eq!(Width::from_size(1).unwrap(), Width::Byte);
        assert_eq!(Width::from_size(4).unwrap(), Width::Long);
        assert_eq!(Width::from_size(8).unwrap(), Width::Quad);
        assert!(matches!(
            Width::from_size(2),
            Err(CodegenError::UnsupportedOperandSize { size: 2 })
        ));
    }

    #[test]
    fn test_cond_negation() {
        assert_eq!(Cond::L.negate(), Cond::Ge);
        assert_eq!(Cond::E.negate(), Cond::Ne);
        assert_eq!(Cond::Le.negate(), Cond::G);
    }

    #[test]
    fn test_operand_display() {
        assert_eq!(Operand::Reg(Reg::Rax, Width::Long).to_string(), "%eax");
        assert_eq!(Operand::Frame(-8).to_string(), "-8(%rbp)");
        assert_eq!(Operand::Imm(5).to_string(), "$5");
        assert_eq!(Operand::Indirect(Reg::Rcx).to_string(), "(%rcx)");
        assert_eq!(Operand::SymImm("main.size".into()).to_string(), "$main.size");
    }

    #[test]
    fn test_instruction_display() {
        assert_eq!(
            AsmInst::Mov(
                Width::Long,
                Operand::Imm(1),
                Operand::Reg(Reg::Rax, Width::Long)
            )
            .to_string(),
            "\tmovl\t$1, %eax"
        );
        assert_eq!(
            AsmInst::Imul(
                Width::Long,
                Operand::Imm(4),
                Operand::Reg(Reg::R11, Width::Long)
            )
            .to_string(),
            "\timull\t$4, %r11d"
        );
        assert_eq!(
            AsmInst::Jcc(Cond::Ge, ".L1".into()).to_string(),
            "\tjge\t.L1"
        );
        assert_eq!(AsmInst::Cqto.to_string(), "\tcqto");
        assert_eq!(
            AsmInst::Movsx(
                Width::Long,
                Width::Quad,
                Operand::Reg(Reg::Rcx, Width::Long),
                Reg::Rcx
            )
            .to_string(),
            "\tmovslq\t%ecx, %rcx"
        );
        assert_eq!(
            AsmInst::SetConst {
                symbol: "main.size".into(),
                value: 16
            }
            .to_string(),
            "\t.set\tmain.size, 16"
        );
        assert_eq!(
            AsmInst::Asciz {
                label: ".L3".into(),
                text: "hello".into()
            }
            .to_string(),
            ".L3:\n\t.string \"hello\""
        );
    }
}
