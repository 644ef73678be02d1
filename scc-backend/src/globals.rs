//! String-literal and global-variable pool
//!
//! Function bodies must come out textually contiguous, so string
//! definitions and global declarations encountered during emission are
//! parked here and flushed exactly once after the last function.

use log::debug;
use scc_codegen::{AsmInst, Label, LabelAllocator};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct GlobalManager {
    /// Literal definitions in first-occurrence order
    strings: Vec<(Label, String)>,
    by_text: HashMap<String, Label>,
    /// Decorated global symbol names and their sizes
    symbols: Vec<(String, u32)>,
}

impl GlobalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The label naming `text`'s definition, allocating one on first
    /// encounter. One label per distinct literal text.
    pub fn intern(&mut self, text: &str, labels: &mut LabelAllocator) -> Label {
        if let Some(&label) = self.by_text.get(text) {
            return label;
        }
        let label = labels.fresh();
        debug!("interned string literal at {}", label);
        self.by_text.insert(text.to_string(), label);
        self.strings.push((label, text.to_string()));
        label
    }

    pub fn add_symbol(&mut self, name: String, size: u32) {
        debug!("global symbol {} ({} bytes)", name, size);
        self.symbols.push((name, size));
    }

    /// Render everything accumulated. Called once, after all function
    /// bodies.
    pub fn flush(&self) -> Vec<AsmInst> {
        let mut out = Vec::new();
        for (label, text) in &self.strings {
            out.push(AsmInst::Asciz {
                label: label.to_string(),
                text: text.clone(),
            });
        }
        for (name, size) in &self.symbols {
            out.push(AsmInst::Comm {
                name: name.clone(),
                size: *size,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_interning_is_per_text() {
        let mut labels = LabelAllocator::new();
        let mut pool = GlobalManager::new();

        let a = pool.intern("hello", &mut labels);
        let b = pool.intern("world", &mut labels);
        let c = pool.intern("hello", &mut labels);

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.flush().len(), 2);
    }

    #[test]
    fn test_flush_order_and_text() {
        let mut labels = LabelAllocator::new();
        let mut pool = GlobalManager::new();

        pool.intern("first", &mut labels);
        pool.add_symbol("counter".into(), 4);
        pool.intern("second", &mut labels);

        let out = pool.flush();
        assert_eq!(
            out,
            vec![
                AsmInst::Asciz {
                    label: ".L0".into(),
                    text: "first".into()
                },
                AsmInst::Asciz {
                    label: ".L1".into(),
                    text: "second".into()
                },
                AsmInst::Comm {
                    name: "counter".into(),
                    size: 4
                },
            ]
        );
    }
}
