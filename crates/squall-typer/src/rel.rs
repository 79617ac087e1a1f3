//! Relational operator typing
//!
//! The relational half of the mutually recursive rewrite. Every operator
//! recomputes its output schema while preserving the binding names the
//! input plan carries; a node whose schema shape disagrees with its
//! operator is a malformed plan and aborts the pass.

use crate::resolver::FnMatch;
use crate::rex::splice_coercions;
use crate::{Strategy, TypeEnv, Typer};
use squall_diagnostics::{CompileError, ProblemKind, Result};
use squall_plan::{AggCall, Binding, JoinKind, Rel, RelOp, RelProp, Rex, SortSpec};
use squall_types::{StaticType, StructField, StructType};
use std::collections::BTreeSet;

impl Typer<'_, '_> {
    /// Type one relational node
    pub(crate) fn type_rel(&mut self, rel: &Rel, env: &TypeEnv) -> Result<Rel> {
        self.check_interrupt()?;
        match &rel.op {
            RelOp::Scan { rex } => {
                let rex = self.type_rex(rex, env, Strategy::Global)?;
                let elem = scan_element_type(&rex.ty);
                let name = binding_name(rel, 0, "scan")?;
                Ok(Rel::new(
                    vec![Binding::new(name, elem)],
                    BTreeSet::new(),
                    RelOp::Scan { rex },
                ))
            }

            RelOp::ScanIndexed { rex } => {
                let rex = self.type_rex(rex, env, Strategy::Global)?;
                let elem = scan_element_type(&rex.ty);
                let value = binding_name(rel, 0, "indexed scan")?;
                let index = binding_name(rel, 1, "indexed scan")?;
                Ok(Rel::new(
                    vec![
                        Binding::new(value, elem),
                        Binding::new(index, StaticType::Int64),
                    ],
                    BTreeSet::new(),
                    RelOp::ScanIndexed { rex },
                ))
            }

            RelOp::Unpivot { rex } => {
                let rex = self.type_rex(rex, env, Strategy::Global)?;
                let value_ty = unpivot_value_type(&rex.ty);
                let key = binding_name(rel, 0, "unpivot")?;
                let value = binding_name(rel, 1, "unpivot")?;
                Ok(Rel::new(
                    vec![
                        Binding::new(key, StaticType::String),
                        Binding::new(value, value_ty),
                    ],
                    BTreeSet::new(),
                    RelOp::Unpivot { rex },
                ))
            }

            RelOp::Filter { input, predicate } => {
                let input = self.type_rel(input, env)?;
                let inner = env.nest(input.schema.clone());
                let predicate = self.type_rex(predicate, &inner, Strategy::Local)?;
                Ok(Rel::new(
                    input.schema.clone(),
                    input.props.clone(),
                    RelOp::Filter {
                        input: Box::new(input),
                        predicate,
                    },
                ))
            }

            RelOp::Sort { input, specs } => {
                let input = self.type_rel(input, env)?;
                let inner = env.nest(input.schema.clone());
                let specs = specs
                    .iter()
                    .map(|s| {
                        self.type_rex(&s.rex, &inner, Strategy::Local)
                            .map(|rex| SortSpec::new(rex, s.order, s.nulls))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut props = input.props.clone();
                props.insert(RelProp::Ordered);
                Ok(Rel::new(
                    input.schema.clone(),
                    props,
                    RelOp::Sort {
                        input: Box::new(input),
                        specs,
                    },
                ))
            }

            RelOp::Limit { input, limit } => {
                let input = self.type_rel(input, env)?;
                // limit expressions cannot see columns
                let limit = self.type_rex(limit, env, Strategy::Local)?;
                self.check_integer("limit", &limit.ty);
                Ok(Rel::new(
                    input.schema.clone(),
                    input.props.clone(),
                    RelOp::Limit {
                        input: Box::new(input),
                        limit,
                    },
                ))
            }

            RelOp::Offset { input, offset } => {
                let input = self.type_rel(input, env)?;
                let offset = self.type_rex(offset, env, Strategy::Local)?;
                self.check_integer("offset", &offset.ty);
                Ok(Rel::new(
                    input.schema.clone(),
                    input.props.clone(),
                    RelOp::Offset {
                        input: Box::new(input),
                        offset,
                    },
                ))
            }

            RelOp::Join {
                lhs,
                rhs,
                condition,
                kind,
            } => self.type_join(lhs, rhs, condition, *kind, env),

            RelOp::Aggregate {
                input,
                calls,
                groups,
            } => self.type_aggregate(rel, input, calls, groups, env),

            RelOp::Project { input, projections } => {
                let input = self.type_rel(input, env)?;
                let inner = env.nest(input.schema.clone());
                let projections = projections
                    .iter()
                    .map(|p| self.type_rex(p, &inner, Strategy::Local))
                    .collect::<Result<Vec<_>>>()?;
                if rel.schema.len() != projections.len() {
                    return Err(CompileError::MalformedPlan(format!(
                        "project carries {} bindings for {} projections",
                        rel.schema.len(),
                        projections.len()
                    )));
                }
                let schema: Vec<Binding> = rel
                    .schema
                    .iter()
                    .zip(&projections)
                    .map(|(b, p)| Binding::new(b.name.clone(), p.ty.clone()))
                    .collect();
                self.check_duplicate_aliases(&schema);
                Ok(Rel::new(
                    schema,
                    input.props.clone(),
                    RelOp::Project {
                        input: Box::new(input),
                        projections,
                    },
                ))
            }

            RelOp::Exclude { input, paths } => {
                let input = self.type_rel(input, env)?;
                let (schema, paths) = self.type_exclude(&input, paths);
                Ok(Rel::new(
                    schema,
                    input.props.clone(),
                    RelOp::Exclude {
                        input: Box::new(input),
                        paths,
                    },
                ))
            }
        }
    }

    fn type_join(
        &mut self,
        lhs: &Rel,
        rhs: &Rel,
        condition: &Rex,
        kind: JoinKind,
        env: &TypeEnv,
    ) -> Result<Rel> {
        let lhs = self.type_rel(lhs, env)?;
        // the right side sees the left side's bindings (lateral)
        let rhs_env = env.nest(lhs.schema.clone());
        let rhs = self.type_rel(rhs, &rhs_env)?;

        let mut combined = lhs.schema.clone();
        combined.extend(rhs.schema.iter().cloned());
        let condition_env = env.nest(combined);
        let condition = self.type_rex(condition, &condition_env, Strategy::Local)?;

        let (left_nullable, right_nullable) = match kind {
            JoinKind::Inner => (false, false),
            JoinKind::Left => (false, true),
            JoinKind::Right => (true, false),
            JoinKind::Full => (true, true),
        };
        let extend_side = |bindings: &[Binding], nullable: bool| -> Vec<Binding> {
            bindings
                .iter()
                .map(|b| {
                    let ty = if nullable {
                        null_extend(&b.ty)
                    } else {
                        b.ty.clone()
                    };
                    Binding::new(b.name.clone(), ty)
                })
                .collect()
        };
        let mut schema = extend_side(&lhs.schema, left_nullable);
        schema.extend(extend_side(&rhs.schema, right_nullable));
        self.check_duplicate_aliases(&schema);

        Ok(Rel::new(
            schema,
            BTreeSet::new(),
            RelOp::Join {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                condition,
                kind,
            },
        ))
    }

    fn type_aggregate(
        &mut self,
        rel: &Rel,
        input: &Rel,
        calls: &[AggCall],
        groups: &[Rex],
        env: &TypeEnv,
    ) -> Result<Rel> {
        let input = self.type_rel(input, env)?;
        // calls see the input schema only: no other calls, no group keys
        let inner = env.nest(input.schema.clone());

        let mut typed_calls: Vec<AggCall> = Vec::new();
        let mut call_types: Vec<StaticType> = Vec::new();
        for (position, call) in calls.iter().enumerate() {
            match call {
                AggCall::Unresolved {
                    id,
                    set_quantifier,
                    args,
                } => {
                    let args = self.type_args(args, &inner, Strategy::Local)?;
                    match self.resolver.resolve_agg(id, &args) {
                        Ok(FnMatch::Static {
                            signature,
                            mapping,
                            missable,
                        }) => {
                            call_types.push(agg_return_type(&signature, missable));
                            typed_calls.push(AggCall::Resolved {
                                agg: signature,
                                set_quantifier: *set_quantifier,
                                args: splice_coercions(args, &mapping),
                            });
                        }
                        Ok(FnMatch::Dynamic {
                            candidates,
                            exhaustive,
                        }) => {
                            // aggregates dispatch statically: take the
                            // highest-precedence candidate, keep the full
                            // union as the output type
                            let mut ty = StaticType::any_of(
                                candidates
                                    .iter()
                                    .map(|c| agg_return_type(&c.signature, false)),
                            );
                            if !exhaustive {
                                ty = ty.with_missing();
                            }
                            call_types.push(ty);
                            let first = candidates
                                .into_iter()
                                .next()
                                .map(|c| c.signature)
                                .ok_or_else(|| {
                                    CompileError::MalformedPlan(
                                        "dynamic aggregate with no candidates".to_string(),
                                    )
                                })?;
                            typed_calls.push(AggCall::Resolved {
                                agg: first,
                                set_quantifier: *set_quantifier,
                                args,
                            });
                        }
                        Err(err) => {
                            self.report(ProblemKind::UnknownFunction {
                                identifier: err.identifier,
                                args: err
                                    .args
                                    .iter()
                                    .map(ToString::to_string)
                                    .collect::<Vec<_>>()
                                    .join(", "),
                            });
                            call_types.push(StaticType::Missing);
                            typed_calls.push(AggCall::Unresolved {
                                id: id.clone(),
                                set_quantifier: *set_quantifier,
                                args,
                            });
                        }
                    }
                }
                AggCall::Resolved {
                    agg,
                    set_quantifier,
                    args,
                } => {
                    let args = self.type_args(args, &inner, Strategy::Local)?;
                    // an already-resolved call keeps its computed binding
                    // type so re-typing is an identity
                    let existing = rel.schema.get(position).map(|b| &b.ty);
                    let ty = match existing {
                        Some(ty) if !ty.is_dynamic() => ty.clone(),
                        _ => agg_return_type(agg, false),
                    };
                    call_types.push(ty);
                    typed_calls.push(AggCall::Resolved {
                        agg: agg.clone(),
                        set_quantifier: *set_quantifier,
                        args,
                    });
                }
            }
        }

        let groups = groups
            .iter()
            .map(|g| self.type_rex(g, &inner, Strategy::Local))
            .collect::<Result<Vec<_>>>()?;

        if rel.schema.len() != typed_calls.len() + groups.len() {
            return Err(CompileError::MalformedPlan(format!(
                "aggregate carries {} bindings for {} calls and {} groups",
                rel.schema.len(),
                typed_calls.len(),
                groups.len()
            )));
        }
        let types = call_types.iter().chain(groups.iter().map(|g| &g.ty));
        let schema: Vec<Binding> = rel
            .schema
            .iter()
            .zip(types)
            .map(|(b, ty)| Binding::new(b.name.clone(), ty.clone()))
            .collect();

        Ok(Rel::new(
            schema,
            BTreeSet::new(),
            RelOp::Aggregate {
                input: Box::new(input),
                calls: typed_calls,
                groups,
            },
        ))
    }

    fn check_integer(&mut self, operator: &str, ty: &StaticType) {
        let ok = ty
            .members()
            .iter()
            .any(|m| m.is_integer() || m.is_dynamic() || matches!(m, StaticType::Null));
        if !ok {
            self.report(ProblemKind::IncompatibleTypesForOperator {
                operator: operator.to_string(),
                args: ty.to_string(),
            });
        }
    }

    fn check_duplicate_aliases(&mut self, schema: &[Binding]) {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for binding in schema {
            if !seen.insert(binding.name.as_str()) {
                self.report(ProblemKind::DuplicateAlias {
                    alias: binding.name.clone(),
                });
            }
        }
    }
}

/// An aggregate's result nullability is declared, not argument-driven:
/// NULL inputs are skipped, and an empty group yields NULL regardless
fn agg_return_type(sig: &squall_types::FnSignature, missable_extra: bool) -> StaticType {
    let mut ty = sig.returns.clone();
    if sig.is_nullable {
        ty = ty.with_null();
    }
    if sig.is_missable || missable_extra {
        ty = ty.with_missing();
    }
    ty
}

fn binding_name(rel: &Rel, index: usize, operator: &str) -> Result<String> {
    rel.schema
        .get(index)
        .map(|b| b.name.clone())
        .ok_or_else(|| {
            CompileError::MalformedPlan(format!("{operator} is missing binding {index}"))
        })
}

/// The bound value type of a scan: the element type of collection
/// members; non-collections scan as singletons
fn scan_element_type(ty: &StaticType) -> StaticType {
    StaticType::any_of(ty.members().iter().map(|member| match member {
        StaticType::Array(elem) | StaticType::Bag(elem) => (**elem).clone(),
        other => other.clone(),
    }))
}

/// The bound value type of an unpivot: the union of the struct members'
/// field types; open structs and DYNAMIC contribute DYNAMIC
fn unpivot_value_type(ty: &StaticType) -> StaticType {
    StaticType::any_of(ty.members().iter().map(|member| match member {
        StaticType::Struct(s) if s.closed => {
            if s.fields.is_empty() {
                StaticType::Missing
            } else {
                StaticType::any_of(s.fields.iter().map(|f| f.ty.clone()))
            }
        }
        StaticType::Struct(_) => StaticType::Dynamic,
        other => other.clone(),
    }))
}

/// Null-extend one side of an outer join; tuple bindings get every field
/// individually extended rather than the whole tuple
fn null_extend(ty: &StaticType) -> StaticType {
    match ty {
        StaticType::Struct(s) => StaticType::Struct(StructType::new(
            s.fields
                .iter()
                .map(|f| StructField::new(f.name.clone(), null_extend(&f.ty)))
                .collect(),
            s.closed,
            s.ordered,
        )),
        StaticType::AnyOf(members) => StaticType::any_of(members.iter().map(null_extend)),
        other => other.clone().with_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_element_type() {
        assert_eq!(
            scan_element_type(&StaticType::bag(StaticType::Int32)),
            StaticType::Int32
        );
        // a non-collection scans as a singleton
        assert_eq!(scan_element_type(&StaticType::Int32), StaticType::Int32);
        assert_eq!(
            scan_element_type(&StaticType::any_of([
                StaticType::array(StaticType::String),
                StaticType::bag(StaticType::Int32),
            ])),
            StaticType::any_of([StaticType::String, StaticType::Int32])
        );
    }

    #[test]
    fn test_null_extend_struct_fields_individually() {
        let ty = StaticType::Struct(StructType::new(
            vec![
                StructField::new("a", StaticType::Int32),
                StructField::new("b", StaticType::String),
            ],
            true,
            false,
        ));
        let extended = null_extend(&ty);
        let s = extended.struct_type().expect("struct");
        assert_eq!(s.fields[0].ty, StaticType::Int32.with_null());
        assert_eq!(s.fields[1].ty, StaticType::String.with_null());
        // the tuple itself is not unioned with NULL
        assert!(extended.is_struct());
    }

    #[test]
    fn test_null_extend_scalar() {
        assert_eq!(
            null_extend(&StaticType::Int32),
            StaticType::Int32.with_null()
        );
    }

    #[test]
    fn test_unpivot_value_type() {
        let ty = StaticType::Struct(StructType::new(
            vec![
                StructField::new("a", StaticType::Int32),
                StructField::new("b", StaticType::String),
            ],
            true,
            false,
        ));
        assert_eq!(
            unpivot_value_type(&ty),
            StaticType::any_of([StaticType::Int32, StaticType::String])
        );
        assert_eq!(
            unpivot_value_type(&StaticType::Struct(StructType::open())),
            StaticType::Dynamic
        );
    }
}
