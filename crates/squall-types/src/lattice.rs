//! The widening lattice for common-supertype computation
//!
//! Computes one common type for a set of alternative-branch member types
//! (SQL-99 §9.3 style). NULL/MISSING members are stripped for the lattice
//! walk and re-unioned into the result; DYNAMIC or any unmatched pair
//! short-circuits the supertype to DYNAMIC.

use crate::{DecimalProps, StaticType, TypeKind};

/// Widening order of the numeric family used by the lattice
const NUMERIC_WIDENING: [TypeKind; 8] = [
    TypeKind::Int8,
    TypeKind::Int16,
    TypeKind::Int32,
    TypeKind::Int64,
    TypeKind::Int,
    TypeKind::Decimal,
    TypeKind::Float32,
    TypeKind::Float64,
];

/// Compute the common supertype of a set of types
///
/// The inputs are flattened into union members first. Struct and
/// collection members skip the lattice and simply union. An empty input
/// yields DYNAMIC.
pub fn common_supertype<'a, I>(types: I) -> StaticType
where
    I: IntoIterator<Item = &'a StaticType>,
{
    let mut members: Vec<&StaticType> = Vec::new();
    let mut saw_null = false;
    let mut saw_missing = false;
    for ty in types {
        for member in ty.members() {
            match member {
                StaticType::Dynamic => return StaticType::Dynamic,
                StaticType::Null => saw_null = true,
                StaticType::Missing => saw_missing = true,
                other => members.push(other),
            }
        }
    }

    let core = match members.as_slice() {
        [] => match (saw_null, saw_missing) {
            (false, false) => return StaticType::Dynamic,
            (true, false) => return StaticType::Null,
            (false, true) => return StaticType::Missing,
            (true, true) => {
                return StaticType::any_of([StaticType::Null, StaticType::Missing]);
            }
        },
        [single] => (*single).clone(),
        many => unify_members(many),
    };
    if core.is_dynamic() {
        return core;
    }

    let mut result = core;
    if saw_null {
        result = result.with_null();
    }
    if saw_missing {
        result = result.with_missing();
    }
    result
}

/// Unify two or more concrete (non-union, non-marker) members
fn unify_members(members: &[&StaticType]) -> StaticType {
    if members.iter().all(|t| t.is_numeric()) {
        return unify_numeric(members);
    }
    if members.iter().all(|t| t.is_text()) {
        return unify_text(members);
    }
    if members
        .iter()
        .all(|t| t.is_struct() || t.is_collection())
    {
        // structs and collections skip the lattice and simply union
        return StaticType::any_of(members.iter().map(|t| (*t).clone()));
    }
    // identical kinds agree; anything else is an unmatched pair
    let first = members[0];
    if members.iter().all(|t| *t == first) {
        return first.clone();
    }
    StaticType::Dynamic
}

fn unify_numeric(members: &[&StaticType]) -> StaticType {
    let widest = members
        .iter()
        .filter_map(|t| NUMERIC_WIDENING.iter().position(|k| *k == t.kind()))
        .max()
        .unwrap_or(0);
    match NUMERIC_WIDENING[widest] {
        TypeKind::Decimal => StaticType::Decimal(merge_decimal_props(members)),
        kind => kind.to_type(),
    }
}

/// Maximum precision and scale across the decimal members; any
/// arbitrary-precision member makes the result arbitrary
fn merge_decimal_props(members: &[&StaticType]) -> Option<DecimalProps> {
    let mut merged: Option<DecimalProps> = None;
    for member in members {
        if let StaticType::Decimal(props) = member {
            match (merged, props) {
                (_, None) => return None,
                (None, Some(p)) => merged = Some(*p),
                (Some(m), Some(p)) => {
                    merged = Some(DecimalProps::new(
                        m.precision.max(p.precision),
                        m.scale.max(p.scale),
                    ));
                }
            }
        }
    }
    merged
}

/// Unbounded text dominates; else the longest bounded-variable form; else
/// the longest fixed form
fn unify_text(members: &[&StaticType]) -> StaticType {
    if members.iter().any(|t| matches!(t, StaticType::String)) {
        return StaticType::String;
    }
    let max_len = members
        .iter()
        .filter_map(|t| match t {
            StaticType::Char(n) | StaticType::VarChar(n) => Some(*n),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    if members.iter().any(|t| matches!(t, StaticType::VarChar(_))) {
        StaticType::VarChar(max_len)
    } else {
        StaticType::Char(max_len)
    }
}
