//! Simple C Compiler - Common Types and Errors
//!
//! This crate contains the semantic type model and error definitions
//! shared between the front end contract and the code generator.

pub mod error;
pub mod types;

pub use error::CodegenError;
pub use types::*;
