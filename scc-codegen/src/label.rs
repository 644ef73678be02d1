//! Branch and data labels
//!
//! Labels are allocated from a per-translation-unit counter and never
//! reused; each renders exactly once as a definition.

use std::fmt;

/// A unique symbolic position in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".L{}", self.0)
    }
}

/// Hands out fresh labels for one translation unit
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Label {
        let label = Label(self.next);
        self.next += 1;
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labels_are_sequential_and_unique() {
        let mut labels = LabelAllocator::new();
        let a = labels.fresh();
        let b = labels.fresh();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), ".L0");
        assert_eq!(b.to_string(), ".L1");
    }
}
