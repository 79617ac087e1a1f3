//! Function and aggregate signatures
//!
//! Signatures are immutable and drawn from the built-in registry plus
//! catalog-provided extensions, looked up by normalized lowercase name.

use crate::StaticType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A function, operator, or aggregate signature
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FnSignature {
    /// Normalized lowercase name
    pub name: String,
    /// Ordered parameters
    pub params: Vec<FnParam>,
    /// Declared return type
    pub returns: StaticType,
    /// Propagates NULL: any NULL argument produces a NULL result
    pub is_null_call: bool,
    /// Propagates MISSING: any MISSING argument produces a MISSING result
    pub is_missing_call: bool,
    /// May return NULL even for known arguments
    pub is_nullable: bool,
    /// May return MISSING even for known arguments
    pub is_missable: bool,
}

impl FnSignature {
    /// Create a signature with the common defaults (null- and
    /// missing-propagating, never unknown on known arguments)
    pub fn new(name: impl Into<String>, params: Vec<FnParam>, returns: StaticType) -> Self {
        Self {
            name: name.into().to_lowercase(),
            params,
            returns,
            is_null_call: true,
            is_missing_call: true,
            is_nullable: false,
            is_missable: false,
        }
    }

    /// Disable NULL propagation
    pub fn not_null_call(mut self) -> Self {
        self.is_null_call = false;
        self
    }

    /// Disable MISSING propagation
    pub fn not_missing_call(mut self) -> Self {
        self.is_missing_call = false;
        self
    }

    /// Mark the return as possibly NULL on known arguments
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Mark the return as possibly MISSING on known arguments
    pub fn missable(mut self) -> Self {
        self.is_missable = true;
        self
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for FnSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// A named, typed parameter of a signature
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FnParam {
    /// Parameter name
    pub name: String,
    /// Parameter type; DYNAMIC is the universal ANY parameter
    pub ty: StaticType,
}

impl FnParam {
    /// Create a parameter
    pub fn new(name: impl Into<String>, ty: StaticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
