//! Path-step type computation
//!
//! Every step is computed once per union member of the root's type and
//! the results are re-unioned. Symbol (case-insensitive) steps may
//! discover a single agreed field name, in which case the step is
//! rewritten to a case-sensitive key step.

use squall_plan::{IdPart, MatchCase, Rex, RexOp};
use squall_types::StaticType;

/// Type a case-sensitive key step against the root type
pub(crate) fn type_path_key(root: &StaticType, key: &str) -> StaticType {
    StaticType::any_of(root.members().iter().map(|member| key_member(member, key)))
}

fn key_member(member: &StaticType, key: &str) -> StaticType {
    match member {
        StaticType::Dynamic => StaticType::Dynamic,
        StaticType::Struct(s) => match s.field(key) {
            Some(field) => field.ty.clone(),
            None if s.closed => StaticType::Missing,
            None => StaticType::Dynamic,
        },
        _ => StaticType::Missing,
    }
}

/// Type a case-insensitive symbol step against the root type
///
/// Returns the result type and, when every member that found a field
/// agrees on one case-sensitive name, that disambiguated name.
pub(crate) fn type_path_symbol(root: &StaticType, symbol: &str) -> (StaticType, Option<String>) {
    let mut types = Vec::new();
    let mut resolved: Option<String> = None;
    let mut agreed = true;
    for member in root.members() {
        match member {
            StaticType::Dynamic => types.push(StaticType::Dynamic),
            StaticType::Struct(s) => {
                let matches: Vec<_> = s.fields_insensitive(symbol).collect();
                match matches.as_slice() {
                    [] => types.push(if s.closed {
                        StaticType::Missing
                    } else {
                        StaticType::Dynamic
                    }),
                    [field] => {
                        types.push(field.ty.clone());
                        match &resolved {
                            None => resolved = Some(field.name.clone()),
                            Some(name) if *name == field.name => {}
                            Some(_) => agreed = false,
                        }
                    }
                    many => {
                        // several case-variant fields; the key stays ambiguous
                        types.extend(many.iter().map(|f| f.ty.clone()));
                        agreed = false;
                    }
                }
            }
            _ => types.push(StaticType::Missing),
        }
    }
    let ty = StaticType::any_of(types);
    let name = if agreed { resolved } else { None };
    (ty, name)
}

/// Type an index step against the root type; the key type is checked by
/// the caller
pub(crate) fn type_path_index(root: &StaticType) -> StaticType {
    StaticType::any_of(root.members().iter().map(|member| match member {
        StaticType::Dynamic => StaticType::Dynamic,
        StaticType::Array(elem) => (**elem).clone(),
        _ => StaticType::Missing,
    }))
}

/// Wrap a typed root in one identifier-segment path step
pub(crate) fn apply_path_part(root: Rex, part: &IdPart) -> Rex {
    match part.case {
        MatchCase::Sensitive => {
            let ty = type_path_key(&root.ty, &part.text);
            Rex::new(
                ty,
                RexOp::PathKey {
                    root: Box::new(root),
                    key: part.text.clone(),
                },
            )
        }
        MatchCase::Insensitive => {
            let (ty, resolved) = type_path_symbol(&root.ty, &part.text);
            match resolved {
                Some(key) => Rex::new(
                    ty,
                    RexOp::PathKey {
                        root: Box::new(root),
                        key,
                    },
                ),
                None => Rex::new(
                    ty,
                    RexOp::PathSymbol {
                        root: Box::new(root),
                        symbol: part.text.clone(),
                    },
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squall_types::{StructField, StructType};

    fn closed(fields: Vec<StructField>) -> StaticType {
        StaticType::Struct(StructType::new(fields, true, false))
    }

    #[test]
    fn test_key_on_closed_struct() {
        let ty = closed(vec![StructField::new("a", StaticType::Int32)]);
        assert_eq!(type_path_key(&ty, "a"), StaticType::Int32);
        assert_eq!(type_path_key(&ty, "b"), StaticType::Missing);
    }

    #[test]
    fn test_key_on_open_struct_is_dynamic() {
        let ty = StaticType::Struct(StructType::open());
        assert_eq!(type_path_key(&ty, "a"), StaticType::Dynamic);
    }

    #[test]
    fn test_symbol_disambiguates_case() {
        let ty = closed(vec![StructField::new("A", StaticType::Int32)]);
        let (result, name) = type_path_symbol(&ty, "a");
        assert_eq!(result, StaticType::Int32);
        assert_eq!(name.as_deref(), Some("A"));
    }

    #[test]
    fn test_symbol_with_case_variants_stays_ambiguous() {
        let ty = closed(vec![
            StructField::new("a", StaticType::Int32),
            StructField::new("A", StaticType::String),
        ]);
        let (result, name) = type_path_symbol(&ty, "a");
        assert_eq!(
            result,
            StaticType::any_of([StaticType::Int32, StaticType::String])
        );
        assert_eq!(name, None);
    }

    #[test]
    fn test_symbol_union_with_disagreeing_resolution() {
        let ty = StaticType::any_of([
            closed(vec![StructField::new("A", StaticType::Int32)]),
            closed(vec![StructField::new("a", StaticType::Int32)]),
        ]);
        let (result, name) = type_path_symbol(&ty, "a");
        assert_eq!(result, StaticType::Int32);
        assert_eq!(name, None);
    }

    #[test]
    fn test_index_distributes_over_union() {
        let ty = StaticType::any_of([
            StaticType::array(StaticType::Int32),
            StaticType::bag(StaticType::String),
        ]);
        assert_eq!(
            type_path_index(&ty),
            StaticType::any_of([StaticType::Int32, StaticType::Missing])
        );
    }
}
