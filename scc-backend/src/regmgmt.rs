//! Register file: the node/register bijection
//!
//! Bookkeeping only; no instructions are emitted here. At any point
//! during generation a register holds at most one node and a node is
//! bound to at most one register, and both directions are updated
//! together on every change. Spill code is emitted by the generator
//! ([`crate::emit::Codegen`]), which owns the frame the victim's value
//! moves to.

use log::trace;
use scc_codegen::{Reg, Width};
use scc_tree::NodeId;
use std::collections::HashMap;

/// What a register currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub node: NodeId,
    pub width: Width,
}

/// The active allocation pool and its occupancy
#[derive(Debug, Default)]
pub struct RegisterFile {
    /// Pool in the fixed priority order the free scan follows
    pool: Vec<Reg>,
    contents: HashMap<Reg, Binding>,
    by_node: HashMap<NodeId, Reg>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the pool for a new function, dropping all bindings
    pub fn reset(&mut self, pool: &[Reg]) {
        trace!("register file reset, pool: {:?}", pool);
        self.pool = pool.to_vec();
        self.contents.clear();
        self.by_node.clear();
    }

    /// Record that `reg` now holds `node`. Pure bookkeeping: any prior
    /// occupant of the register and any prior register of the node are
    /// unbound first so the bijection never breaks.
    pub fn bind(&mut self, node: NodeId, width: Width, reg: Reg) {
        if let Some(old_reg) = self.by_node.remove(&node) {
            self.contents.remove(&old_reg);
        }
        if let Some(old) = self.contents.remove(&reg) {
            self.by_node.remove(&old.node);
        }
        trace!("bind node {} -> {:?}", node, reg);
        self.contents.insert(reg, Binding { node, width });
        self.by_node.insert(node, reg);
    }

    /// Unbind a node, leaving its register free
    pub fn release(&mut self, node: NodeId) {
        if let Some(reg) = self.by_node.remove(&node) {
            trace!("release node {} from {:?}", node, reg);
            self.contents.remove(&reg);
        }
    }

    pub fn reg_of(&self, node: NodeId) -> Option<Reg> {
        self.by_node.get(&node).copied()
    }

    pub fn occupant(&self, reg: Reg) -> Option<Binding> {
        self.contents.get(&reg).copied()
    }

    /// First free register in pool order, if any
    pub fn find_free(&self) -> Option<Reg> {
        self.pool
            .iter()
            .find(|r| !self.contents.contains_key(r))
            .copied()
    }

    /// The fixed eviction victim: the first register in pool order.
    /// Not recency-based; allocation pressure may evict an arbitrary
    /// live value, which the caller recovers with a spill/reload pair.
    pub fn eviction_victim(&self) -> Reg {
        self.pool[0]
    }

    pub fn bound_count(&self) -> usize {
        self.contents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool() -> Vec<Reg> {
        vec![Reg::R11, Reg::R10, Reg::R9]
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());

        rf.bind(1, Width::Long, Reg::R11);
        assert_eq!(rf.reg_of(1), Some(Reg::R11));
        assert_eq!(rf.occupant(Reg::R11).unwrap().node, 1);
        assert_eq!(rf.find_free(), Some(Reg::R10));
    }

    #[test]
    fn test_rebinding_register_evicts_old_node() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());

        rf.bind(1, Width::Long, Reg::R11);
        rf.bind(2, Width::Long, Reg::R11);

        assert_eq!(rf.reg_of(2), Some(Reg::R11));
        assert_eq!(rf.reg_of(1), None);
        assert_eq!(rf.bound_count(), 1);
    }

    #[test]
    fn test_rebinding_node_frees_old_register() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());

        rf.bind(1, Width::Long, Reg::R11);
        rf.bind(1, Width::Quad, Reg::R10);

        assert_eq!(rf.reg_of(1), Some(Reg::R10));
        assert_eq!(rf.occupant(Reg::R11), None);
        assert_eq!(rf.bound_count(), 1);
    }

    #[test]
    fn test_bijection_under_churn() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());

        for node in 0..20u32 {
            let reg = rf.find_free().unwrap_or_else(|| rf.eviction_victim());
            if let Some(binding) = rf.occupant(reg) {
                rf.release(binding.node);
            }
            rf.bind(node, Width::Long, reg);

            // No register holds two nodes and no node holds two registers
            assert!(rf.bound_count() <= 3);
            let mut seen = std::collections::HashSet::new();
            for probe in 0..=node {
                if let Some(r) = rf.reg_of(probe) {
                    assert!(seen.insert(r), "register {:?} bound twice", r);
                    assert_eq!(rf.occupant(r).unwrap().node, probe);
                }
            }
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());

        rf.bind(7, Width::Byte, Reg::R9);
        rf.release(7);
        rf.release(7);
        assert_eq!(rf.find_free(), Some(Reg::R11));
        assert_eq!(rf.bound_count(), 0);
    }

    #[test]
    fn test_eviction_victim_is_first_in_pool_order() {
        let mut rf = RegisterFile::new();
        rf.reset(&pool());
        assert_eq!(rf.eviction_victim(), Reg::R11);
    }
}
