//! Per-function stack frame
//!
//! The frame hands out slots from a strictly decreasing offset counter
//! (spills, locals, register-passed parameters all draw from it) and
//! owns the deferred total-size constant: the prologue's stack
//! reservation names `<fn>.size` before the body has been generated,
//! and the value is defined exactly once at close time, after the last
//! spill slot is known. The assembler resolves the forward reference;
//! no emitted text is ever revisited.

use log::{debug, trace};
use scc_codegen::{AsmInst, Label, Target};
use scc_common::CodegenError;

/// Write-once handle for the frame-size constant
#[derive(Debug)]
pub struct DeferredSize {
    symbol: String,
    defined: bool,
}

impl DeferredSize {
    fn new(symbol: String) -> Self {
        Self {
            symbol,
            defined: false,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Produce the defining directive. Defining twice is a generator
    /// bug and fatal.
    pub fn define(&mut self, value: i64) -> Result<AsmInst, CodegenError> {
        if self.defined {
            return Err(CodegenError::internal(format!(
                "frame size {} defined twice",
                self.symbol
            )));
        }
        self.defined = true;
        Ok(AsmInst::SetConst {
            symbol: self.symbol.clone(),
            value,
        })
    }
}

#[derive(Debug)]
pub struct Frame {
    /// Undecorated function name
    pub name: String,
    /// Target of `return` statements; the epilogue sits here
    pub return_label: Label,
    size: DeferredSize,
    /// Next slot boundary; strictly decreases as slots are assigned
    offset: i32,
}

impl Frame {
    pub fn open(name: String, return_label: Label) -> Self {
        let size = DeferredSize::new(format!("{}.size", name));
        debug!("opening frame for '{}'", name);
        Self {
            name,
            return_label,
            size,
            offset: 0,
        }
    }

    /// Placeholder used before the first function is generated
    pub fn unopened() -> Self {
        Self::open(String::new(), Label(0))
    }

    /// Assign a fresh slot of `size` bytes below everything assigned
    /// so far, returning its offset from the frame base.
    pub fn reserve(&mut self, size: u32) -> i32 {
        self.offset -= size as i32;
        trace!("frame slot {} ({} bytes)", self.offset, size);
        self.offset
    }

    pub fn size_symbol(&self) -> String {
        self.size.symbol().to_string()
    }

    /// Total frame magnitude so far, before alignment
    pub fn bytes_used(&self) -> i32 {
        -self.offset
    }

    /// Define the deferred size constant, rounded up to the target's
    /// stack alignment.
    pub fn close(&mut self, target: &Target) -> Result<AsmInst, CodegenError> {
        let total = self.bytes_used() + target.alignment_padding(self.offset);
        debug!("closing frame for '{}': {} bytes", self.name, total);
        self.size.define(total as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offsets_descend_monotonically() {
        let mut frame = Frame::open("f".into(), Label(0));
        let mut last = 0;
        for size in [4, 8, 1, 4, 8] {
            let off = frame.reserve(size);
            assert!(off < last, "offset {} not below {}", off, last);
            last = off;
        }
        assert_eq!(last, -25);
    }

    #[test]
    fn test_closed_size_is_aligned() {
        let target = Target::default();
        for n in 1..40u32 {
            let mut frame = Frame::open("f".into(), Label(0));
            frame.reserve(n);
            match frame.close(&target).unwrap() {
                AsmInst::SetConst { value, .. } => {
                    assert_eq!(value % 16, 0, "size {} not 16-aligned", value);
                    assert!(value >= n as i64);
                }
                other => panic!("unexpected instruction {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_frame_has_zero_size() {
        let target = Target::default();
        let mut frame = Frame::open("f".into(), Label(0));
        assert_eq!(
            frame.close(&target).unwrap(),
            AsmInst::SetConst {
                symbol: "f.size".into(),
                value: 0
            }
        );
    }

    #[test]
    fn test_size_defined_once() {
        let target = Target::default();
        let mut frame = Frame::open("f".into(), Label(0));
        frame.close(&target).unwrap();
        assert!(frame.close(&target).is_err());
    }
}
