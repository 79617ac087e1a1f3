//! Scalar expression algebra
//!
//! A [`Rex`] is one scalar node: a tagged operation variant plus its
//! inferred type. Unresolved nodes (`VarUnresolved`, `CallUnresolved`,
//! `CastUnresolved`) enter the typer annotated DYNAMIC and leave rewritten
//! to their resolved counterparts.

use crate::{Identifier, Literal, Rel};
use serde::{Deserialize, Serialize};
use squall_types::{CastKind, FnSignature, StaticType};

/// A typed scalar expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rex {
    /// The inferred type of this node
    pub ty: StaticType,
    /// The operation
    pub op: RexOp,
}

impl Rex {
    /// Create a node from a type and an operation
    pub fn new(ty: StaticType, op: RexOp) -> Self {
        Self { ty, op }
    }

    /// Create an untyped (DYNAMIC) node; the usual input form
    pub fn untyped(op: RexOp) -> Self {
        Self::new(StaticType::Dynamic, op)
    }

    /// Create a literal node with its natural type
    pub fn lit(literal: Literal) -> Self {
        let ty = literal.ty();
        Self::new(ty, RexOp::Lit(literal))
    }

    /// Create an error node, typed MISSING
    pub fn error() -> Self {
        Self::new(StaticType::Missing, RexOp::Error)
    }

    /// The literal payload, if this node is a literal
    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.op {
            RexOp::Lit(lit) => Some(lit),
            _ => None,
        }
    }

    /// Check if this node is the given boolean literal
    pub fn is_literal_bool(&self, value: bool) -> bool {
        self.as_literal().and_then(Literal::as_bool) == Some(value)
    }
}

/// Scalar operation variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RexOp {
    // === Values ===
    /// Literal value
    Lit(Literal),
    /// Resolved local variable: scope depth (0 = innermost) and binding
    /// index within that scope's schema
    Var {
        depth: usize,
        index: usize,
    },
    /// Resolved global reference into the catalog
    Global(GlobalRef),
    /// Unresolved variable reference (input form)
    VarUnresolved(Identifier),

    // === Path Navigation ===
    /// Index step: `root[key]`, key must be an integer kind
    PathIndex {
        root: Box<Rex>,
        key: Box<Rex>,
    },
    /// Case-sensitive field lookup: `root['key']` or `root."key"`
    PathKey {
        root: Box<Rex>,
        key: String,
    },
    /// Case-insensitive field lookup: `root.symbol`
    PathSymbol {
        root: Box<Rex>,
        symbol: String,
    },

    // === Calls and Casts ===
    /// Unresolved call (input form); `hidden` marks operator syntax
    CallUnresolved {
        id: Identifier,
        hidden: bool,
        args: Vec<Rex>,
    },
    /// Statically dispatched call; coercions already spliced into `args`
    CallStatic {
        signature: FnSignature,
        args: Vec<Rex>,
    },
    /// Dynamically dispatched call over the surviving candidates
    CallDynamic {
        args: Vec<Rex>,
        candidates: Vec<DynamicCandidate>,
        exhaustive: bool,
    },
    /// Unresolved cast (input form)
    CastUnresolved {
        target: StaticType,
        arg: Box<Rex>,
    },
    /// Resolved cast with its classification
    Cast {
        target: StaticType,
        safety: CastKind,
        arg: Box<Rex>,
    },

    // === Branching ===
    /// Searched CASE; the default arm is NULL when absent in the source
    Case {
        branches: Vec<CaseBranch>,
        default: Box<Rex>,
    },

    // === Constructors ===
    /// Collection literal
    Coll {
        kind: CollKind,
        values: Vec<Rex>,
    },
    /// Struct literal; duplicate literal keys are retained
    Struct(Vec<StructPair>),
    /// Struct merge over the arguments (TUPLEUNION)
    TupleUnion {
        args: Vec<Rex>,
    },

    // === Relational Embeddings ===
    /// SELECT: one constructed value per input row
    Select {
        constructor: Box<Rex>,
        rel: Box<Rel>,
    },
    /// Subquery with its coercion mode
    Subquery {
        constructor: Box<Rex>,
        rel: Box<Rel>,
        coercion: SubqueryCoercion,
    },
    /// PIVOT: key/value pairs folded into one struct
    Pivot {
        key: Box<Rex>,
        value: Box<Rex>,
        rel: Box<Rel>,
    },

    /// Degraded node left behind by a reported problem
    Error,
}

/// A resolved catalog reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRef {
    /// Catalog path of the matched object
    pub path: Vec<String>,
}

impl GlobalRef {
    /// Create a global reference
    pub fn new(path: Vec<String>) -> Self {
        Self { path }
    }
}

/// One surviving candidate of a dynamic dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicCandidate {
    /// The candidate signature
    pub signature: FnSignature,
    /// Per-argument coercion targets; `None` where the argument is passed
    /// through unchanged
    pub coercions: Vec<Option<StaticType>>,
}

/// One WHEN/THEN arm of a CASE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBranch {
    /// The WHEN condition
    pub condition: Rex,
    /// The THEN result
    pub result: Rex,
}

impl CaseBranch {
    /// Create a branch
    pub fn new(condition: Rex, result: Rex) -> Self {
        Self { condition, result }
    }
}

/// Collection constructor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollKind {
    /// Ordered collection
    Array,
    /// Unordered collection
    Bag,
}

/// One key/value pair of a struct literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructPair {
    /// Field key expression; a text literal keeps the struct closed
    pub key: Rex,
    /// Field value expression
    pub value: Rex,
}

impl StructPair {
    /// Create a pair
    pub fn new(key: Rex, value: Rex) -> Self {
        Self { key, value }
    }
}

/// How a subquery's rows coerce into a scalar position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubqueryCoercion {
    /// At most one row, one value; empty input yields NULL
    Scalar,
    /// Row collection
    Row,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_node_is_typed() {
        let rex = Rex::lit(Literal::Int32(7));
        assert_eq!(rex.ty, StaticType::Int32);
        assert!(!rex.is_literal_bool(false));
        assert!(Rex::lit(Literal::Bool(true)).is_literal_bool(true));
    }

    #[test]
    fn test_error_node_types_missing() {
        assert_eq!(Rex::error().ty, StaticType::Missing);
    }

    #[test]
    fn test_untyped_is_dynamic() {
        let rex = Rex::untyped(RexOp::VarUnresolved(Identifier::regular("x")));
        assert_eq!(rex.ty, StaticType::Dynamic);
    }
}
