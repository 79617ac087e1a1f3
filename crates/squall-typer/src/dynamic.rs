//! Common-supertype computation over typed expressions
//!
//! Accumulates a supertype across a sequence of typed expressions,
//! ignoring literal NULL/MISSING arguments for the supertype itself but
//! recording their positions. The result carries a per-argument mapping:
//! NULL/MISSING literals are replaced with a literal of that kind typed
//! as the supertype, and arguments whose type differs from the supertype
//! are coerced to it. Arguments already at the supertype need no entry.

use squall_plan::{Literal, Rex, RexOp};
use squall_types::{CastKind, StaticType, common_supertype};

/// Per-argument adjustment produced by [`DynamicTyper`]
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    /// Replace the argument outright (NULL/MISSING literal retyping)
    Replace(Rex),
    /// Coerce the argument to the supertype
    Coerce(StaticType),
}

/// The result of a supertype accumulation
#[derive(Debug, Clone, PartialEq)]
pub struct Unified {
    /// The common supertype
    pub ty: StaticType,
    /// One entry per argument; `None` where no adjustment is needed
    pub mappings: Vec<Option<Mapping>>,
}

/// Supertype accumulator for branch-like constructs
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicTyper;

impl DynamicTyper {
    /// Unify a sequence of typed expressions
    pub fn unify(args: &[Rex]) -> Unified {
        let unknown_literal = |rex: &Rex| {
            rex.as_literal()
                .is_some_and(|lit| lit.is_null() || lit.is_missing())
        };

        let value_types: Vec<&StaticType> = args
            .iter()
            .filter(|a| !unknown_literal(a))
            .map(|a| &a.ty)
            .collect();
        let ty = if value_types.is_empty() {
            // nothing but NULL/MISSING literals; keep their union
            StaticType::any_of(args.iter().map(|a| a.ty.clone()))
        } else {
            common_supertype(value_types)
        };

        // a DYNAMIC supertype constrains nothing; adjust no argument
        if ty.is_dynamic() {
            return Unified {
                ty,
                mappings: vec![None; args.len()],
            };
        }

        let mappings = args
            .iter()
            .map(|arg| {
                if unknown_literal(arg) {
                    let literal = match arg.as_literal() {
                        Some(Literal::Missing) => Literal::Missing,
                        _ => Literal::Null,
                    };
                    Some(Mapping::Replace(Rex::new(ty.clone(), RexOp::Lit(literal))))
                } else if arg.ty == ty {
                    None
                } else {
                    Some(Mapping::Coerce(ty.clone()))
                }
            })
            .collect();
        Unified { ty, mappings }
    }

    /// Apply one mapping entry to its argument
    pub fn apply(arg: Rex, mapping: Option<Mapping>) -> Rex {
        match mapping {
            None => arg,
            Some(Mapping::Replace(rex)) => rex,
            Some(Mapping::Coerce(target)) => Rex::new(
                target.clone(),
                RexOp::Cast {
                    target,
                    safety: CastKind::Coercion,
                    arg: Box::new(arg),
                },
            ),
        }
    }
}
