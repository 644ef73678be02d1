//! Semantic types for Simple C
//!
//! The generator only cares about three facts per type: its size in
//! bytes, its indirection depth, and whether it names a function. The
//! front end guarantees that every expression carries one of these.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar type specifiers and their storage sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeSpec {
    /// char (1 byte)
    Char,
    /// int (4 bytes)
    Int,
    /// long (8 bytes)
    Long,
}

impl TypeSpec {
    pub fn size(&self) -> u32 {
        match self {
            TypeSpec::Char => 1,
            TypeSpec::Int => 4,
            TypeSpec::Long => 8,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Char => write!(f, "char"),
            TypeSpec::Int => write!(f, "int"),
            TypeSpec::Long => write!(f, "long"),
        }
    }
}

/// A checked Simple C type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ty {
    Scalar {
        spec: TypeSpec,
        indirection: u32,
    },
    Array {
        spec: TypeSpec,
        indirection: u32,
        length: u32,
    },
    /// `params` is None for an unprototyped (old-style) declaration,
    /// which the call sequencer treats as variadic.
    Function {
        ret: Box<Ty>,
        params: Option<Vec<Ty>>,
    },
}

impl Ty {
    pub fn scalar(spec: TypeSpec, indirection: u32) -> Self {
        Ty::Scalar { spec, indirection }
    }

    pub fn int() -> Self {
        Ty::scalar(TypeSpec::Int, 0)
    }

    pub fn long() -> Self {
        Ty::scalar(TypeSpec::Long, 0)
    }

    pub fn char_() -> Self {
        Ty::scalar(TypeSpec::Char, 0)
    }

    pub fn pointer_to(spec: TypeSpec, indirection: u32) -> Self {
        Ty::scalar(spec, indirection)
    }

    /// Size in bytes. Pointers are always 8; arrays are the full
    /// element count times the element size.
    pub fn size(&self) -> u32 {
        match self {
            Ty::Scalar { spec, indirection } => {
                if *indirection > 0 {
                    8
                } else {
                    spec.size()
                }
            }
            Ty::Array {
                spec,
                indirection,
                length,
            } => {
                let elem = if *indirection > 0 { 8 } else { spec.size() };
                elem * length
            }
            Ty::Function { .. } => 0,
        }
    }

    pub fn indirection(&self) -> u32 {
        match self {
            Ty::Scalar { indirection, .. } | Ty::Array { indirection, .. } => *indirection,
            Ty::Function { .. } => 0,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Ty::Function { .. })
    }

    /// The type obtained by dereferencing this one. Only meaningful for
    /// pointer types; the front end never builds a dereference of a
    /// non-pointer.
    pub fn deref(&self) -> Ty {
        match self {
            Ty::Scalar { spec, indirection } if *indirection > 0 => Ty::Scalar {
                spec: *spec,
                indirection: indirection - 1,
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Scalar { spec, indirection } => {
                write!(f, "{}{}", spec, "*".repeat(*indirection as usize))
            }
            Ty::Array {
                spec,
                indirection,
                length,
            } => write!(f, "{}{}[{}]", spec, "*".repeat(*indirection as usize), length),
            Ty::Function { ret, .. } => write!(f, "{}()", ret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(Ty::char_().size(), 1);
        assert_eq!(Ty::int().size(), 4);
        assert_eq!(Ty::long().size(), 8);
    }

    #[test]
    fn test_pointer_size() {
        assert_eq!(Ty::scalar(TypeSpec::Char, 1).size(), 8);
        assert_eq!(Ty::scalar(TypeSpec::Int, 2).size(), 8);
    }

    #[test]
    fn test_array_size() {
        let arr = Ty::Array {
            spec: TypeSpec::Int,
            indirection: 0,
            length: 10,
        };
        assert_eq!(arr.size(), 40);
    }

    #[test]
    fn test_deref() {
        let ptr = Ty::scalar(TypeSpec::Int, 1);
        assert_eq!(ptr.deref(), Ty::int());
        assert_eq!(ptr.deref().size(), 4);
    }

    #[test]
    fn test_function_type() {
        let f = Ty::Function {
            ret: Box::new(Ty::int()),
            params: None,
        };
        assert!(f.is_function());
    }
}
