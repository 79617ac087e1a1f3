//! Literal values in the plan

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use squall_types::StaticType;
use std::fmt;

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// The NULL marker
    Null,
    /// The MISSING marker
    Missing,
    /// Boolean literal
    Bool(bool),
    /// 32-bit integer literal
    Int32(i32),
    /// 64-bit integer literal
    Int64(i64),
    /// Exact numeric literal
    Numeric(Decimal),
    /// Floating point literal
    Float64(f64),
    /// Text literal
    Text(String),
}

impl Literal {
    /// The natural type of this literal
    pub fn ty(&self) -> StaticType {
        match self {
            Literal::Null => StaticType::Null,
            Literal::Missing => StaticType::Missing,
            Literal::Bool(_) => StaticType::Bool,
            Literal::Int32(_) => StaticType::Int32,
            Literal::Int64(_) => StaticType::Int64,
            Literal::Numeric(_) => StaticType::Decimal(None),
            Literal::Float64(_) => StaticType::Float64,
            Literal::Text(_) => StaticType::String,
        }
    }

    /// Check if this is the NULL marker
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Check if this is the MISSING marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Literal::Missing)
    }

    /// The text payload, if this is a text literal
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean literal
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Missing => write!(f, "missing"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int32(v) => write!(f, "{v}"),
            Literal::Int64(v) => write!(f, "{v}"),
            Literal::Numeric(v) => write!(f, "{v}"),
            Literal::Float64(v) => write!(f, "{v}"),
            Literal::Text(s) => write!(f, "'{s}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_types() {
        assert_eq!(Literal::Null.ty(), StaticType::Null);
        assert_eq!(Literal::Missing.ty(), StaticType::Missing);
        assert_eq!(Literal::Int32(1).ty(), StaticType::Int32);
        assert_eq!(Literal::Text("x".into()).ty(), StaticType::String);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Literal::Bool(true).as_bool(), Some(true));
        assert_eq!(Literal::Text("a".into()).as_text(), Some("a"));
        assert!(Literal::Null.is_null());
        assert!(!Literal::Null.is_missing());
    }
}
