//! Simple C Compiler - Code Generator
//!
//! Lowers a fully type-checked [`scc_tree::TranslationUnit`] to
//! textual x86-64 AT&T assembly in a single pass. Functions are
//! generated one at a time, prologue through epilogue, each into a
//! buffer that is flushed to the writer only when the whole function
//! succeeded; string literals and global declarations accumulate in a
//! pool and come out once, after the last function body.

pub mod branch;
pub mod call;
pub mod emit;
pub mod expr;
pub mod frame;
pub mod function;
pub mod globals;
pub mod regmgmt;
pub mod stmt;

pub use emit::Codegen;

use scc_codegen::Target;
use scc_common::CodegenError;
use scc_tree::TranslationUnit;
use std::io::Write;

/// Generate assembly for a whole translation unit.
///
/// Output is line-oriented and written in strict emission order;
/// rerunning on the same tree and target produces identical text.
pub fn generate_unit<W: Write>(
    unit: &TranslationUnit,
    target: &Target,
    out: &mut W,
) -> Result<(), CodegenError> {
    let mut cg = Codegen::new(target, &unit.symbols);

    for f in &unit.functions {
        let insts = cg.gen_function(f)?;
        for inst in &insts {
            writeln!(out, "{}", inst)?;
        }
    }

    for &g in &unit.globals {
        let sym = unit.symbols.get(g);
        if !sym.ty.is_function() {
            cg.globals
                .add_symbol(target.decorate(&sym.name), sym.ty.size());
        }
    }
    for inst in cg.globals.flush() {
        writeln!(out, "{}", inst)?;
    }

    Ok(())
}

/// Convenience wrapper rendering straight to a string, used by tests
/// and callers that post-process the text.
pub fn generate_to_string(
    unit: &TranslationUnit,
    target: &Target,
) -> Result<String, CodegenError> {
    let mut buf = Vec::new();
    generate_unit(unit, target, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CodegenError::internal(e.to_string()))
}
