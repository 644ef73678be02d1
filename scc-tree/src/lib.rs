//! Simple C Compiler - Typed Tree
//!
//! This crate defines the fully type-checked expression/statement tree
//! that the front end hands to the code generator, together with the
//! symbol table it references. The generator never mutates the tree;
//! all transient generation state is kept in side tables keyed by
//! [`NodeId`] and [`SymbolId`].

pub mod builder;
pub mod tree;

pub use builder::TreeBuilder;
pub use tree::*;
