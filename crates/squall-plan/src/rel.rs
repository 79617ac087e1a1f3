//! Relational operator algebra
//!
//! A [`Rel`] is one relational node: a tagged operator variant plus its
//! output schema (ordered name/type bindings) and a property set. The
//! input plan carries binding names with DYNAMIC types; the typer
//! recomputes every type while preserving the names.

use crate::{Identifier, Rex};
use serde::{Deserialize, Serialize};
use squall_types::{FnSignature, StaticType};
use std::collections::BTreeSet;

/// A typed relational operator node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rel {
    /// Output schema: ordered named bindings
    pub schema: Vec<Binding>,
    /// Operator properties
    pub props: BTreeSet<RelProp>,
    /// The operator
    pub op: RelOp,
}

impl Rel {
    /// Create a node
    pub fn new(schema: Vec<Binding>, props: BTreeSet<RelProp>, op: RelOp) -> Self {
        Self { schema, props, op }
    }

    /// Check whether the node carries the ORDERED property
    pub fn is_ordered(&self) -> bool {
        self.props.contains(&RelProp::Ordered)
    }
}

/// One named, typed output binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Binding name
    pub name: String,
    /// Binding type
    pub ty: StaticType,
}

impl Binding {
    /// Create a binding
    pub fn new(name: impl Into<String>, ty: StaticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Operator properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelProp {
    /// Row order is semantic
    Ordered,
}

/// Relational operator variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelOp {
    /// Iterate a collection, binding each element
    Scan { rex: Rex },
    /// Iterate a collection, binding each element and its index
    ScanIndexed { rex: Rex },
    /// Iterate a struct's fields, binding key and value
    Unpivot { rex: Rex },
    /// Keep rows satisfying the predicate
    Filter { input: Box<Rel>, predicate: Rex },
    /// Order rows
    Sort { input: Box<Rel>, specs: Vec<SortSpec> },
    /// Keep at most `limit` rows; the expression must be an integer kind
    Limit { input: Box<Rel>, limit: Rex },
    /// Skip `offset` rows; the expression must be an integer kind
    Offset { input: Box<Rel>, offset: Rex },
    /// Join two inputs; schema is left bindings then right bindings
    Join {
        lhs: Box<Rel>,
        rhs: Box<Rel>,
        condition: Rex,
        kind: JoinKind,
    },
    /// Group rows; output schema is all calls, then all group keys
    Aggregate {
        input: Box<Rel>,
        calls: Vec<AggCall>,
        groups: Vec<Rex>,
    },
    /// Compute one output binding per projection
    Project { input: Box<Rel>, projections: Vec<Rex> },
    /// Remove (or optionalize) fields reached by the exclude paths
    Exclude {
        input: Box<Rel>,
        paths: Vec<ExcludePath>,
    },
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    /// The sort key expression
    pub rex: Rex,
    /// Direction
    pub order: SortOrder,
    /// Placement of NULL keys
    pub nulls: NullOrder,
}

impl SortSpec {
    /// Create a sort key
    pub fn new(rex: Rex, order: SortOrder, nulls: NullOrder) -> Self {
        Self { rex, order, nulls }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// NULL placement in a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullOrder {
    First,
    Last,
}

/// Join kind; outer kinds null-extend the opposite side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

/// An aggregate call within an Aggregate operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggCall {
    /// Unresolved aggregate reference (input form)
    Unresolved {
        id: Identifier,
        set_quantifier: SetQuantifier,
        args: Vec<Rex>,
    },
    /// Resolved aggregate
    Resolved {
        agg: FnSignature,
        set_quantifier: SetQuantifier,
        args: Vec<Rex>,
    },
}

/// ALL/DISTINCT quantifier of an aggregate call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetQuantifier {
    All,
    Distinct,
}

/// One exclude path: a root reference plus navigation steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludePath {
    /// Root variable; unresolved on input, a local var once typed
    pub root: Rex,
    /// Steps applied to the root's binding type
    pub steps: Vec<ExcludeStep>,
}

impl ExcludePath {
    /// Create an exclude path
    pub fn new(root: Rex, steps: Vec<ExcludeStep>) -> Self {
        Self { root, steps }
    }
}

/// One step of an exclude path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcludeStep {
    /// Case-insensitive field step
    StructField { symbol: String },
    /// Case-sensitive field step
    StructKey { key: String },
    /// Every field of a struct
    StructWildcard,
    /// One collection element
    CollIndex { index: u64 },
    /// Every collection element
    CollWildcard,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Literal, RexOp};
    use std::collections::BTreeSet;

    #[test]
    fn test_ordered_prop() {
        let scan = Rel::new(
            vec![Binding::new("x", StaticType::Dynamic)],
            BTreeSet::new(),
            RelOp::Scan {
                rex: Rex::lit(Literal::Int32(1)),
            },
        );
        assert!(!scan.is_ordered());

        let mut props = BTreeSet::new();
        props.insert(RelProp::Ordered);
        let sorted = Rel::new(scan.schema.clone(), props, scan.op.clone());
        assert!(sorted.is_ordered());
    }

    #[test]
    fn test_plan_serde_round_trip() {
        let rel = Rel::new(
            vec![Binding::new("v", StaticType::Dynamic)],
            BTreeSet::new(),
            RelOp::Scan {
                rex: Rex::untyped(RexOp::VarUnresolved(crate::Identifier::regular("t"))),
            },
        );
        let plan = crate::Plan::new(Rex::untyped(RexOp::Select {
            constructor: Box::new(Rex::untyped(RexOp::VarUnresolved(
                crate::Identifier::regular("v"),
            ))),
            rel: Box::new(rel),
        }));
        let json = serde_json::to_string(&plan).unwrap();
        let back: crate::Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
