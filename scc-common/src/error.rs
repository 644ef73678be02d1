//! Error handling for the Simple C code generator
//!
//! Every error produced by the backend is an internal shape error: the
//! front end hands over a fully type-checked tree, so a malformed operand
//! width or an untestable node indicates a tree inconsistency and aborts
//! translation of the current function. Register pressure is never an
//! error; the allocator always recovers by spilling.

use thiserror::Error;

/// Fatal inconsistencies detected while generating code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("unsupported operand size: {size} bytes (legal sizes are 1, 4 and 8)")]
    UnsupportedOperandSize { size: u32 },

    #[error("cannot branch on {construct}")]
    UnsupportedTest { construct: String },

    #[error("cannot marshal arguments for call to '{callee}': {detail}")]
    BadCallShape { callee: String, detail: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CodegenError {
    pub fn internal(message: impl Into<String>) -> Self {
        CodegenError::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CodegenError {
    fn from(err: std::io::Error) -> Self {
        CodegenError::Internal {
            message: err.to_string(),
        }
    }
}
