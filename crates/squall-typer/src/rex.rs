//! Scalar expression typing
//!
//! The scalar half of the mutually recursive rewrite. Every visit returns
//! a new node; already-resolved nodes keep their computed type so that
//! re-running the pass over a resolved plan is an identity.

use crate::dynamic::DynamicTyper;
use crate::paths::{apply_path_part, type_path_index, type_path_key, type_path_symbol};
use crate::resolver::FnMatch;
use crate::{ScopeResolution, Strategy, TypeEnv, Typer};
use squall_diagnostics::{ProblemKind, Result};
use squall_plan::{
    AggCall, CaseBranch, CollKind, ExcludePath, GlobalRef, Identifier, Literal, Rel, RelOp, Rex,
    RexOp, SortSpec, StructPair, SubqueryCoercion,
};
use squall_types::{CastKind, FnSignature, StaticType, StructField, StructType};

impl Typer<'_, '_> {
    /// Type one scalar node
    pub(crate) fn type_rex(&mut self, rex: &Rex, env: &TypeEnv, strategy: Strategy) -> Result<Rex> {
        self.check_interrupt()?;
        match &rex.op {
            RexOp::Lit(lit) => Ok(Rex::lit(lit.clone())),

            RexOp::Var { depth, index } => {
                let ty = env
                    .binding_at(*depth, *index)
                    .map(|b| b.ty.clone())
                    .unwrap_or_else(|| rex.ty.clone());
                Ok(Rex::new(ty, rex.op.clone()))
            }

            RexOp::Global(_) => Ok(rex.clone()),

            RexOp::VarUnresolved(id) => self.type_var_unresolved(id, env, strategy),

            RexOp::PathIndex { root, key } => {
                let root = self.type_rex(root, env, strategy)?;
                let key = self.type_rex(key, env, strategy)?;
                let key_ok = key
                    .ty
                    .members()
                    .iter()
                    .any(|m| m.is_integer() || m.is_dynamic() || matches!(m, StaticType::Null));
                if !key_ok {
                    self.report(ProblemKind::IncompatibleTypesForOperator {
                        operator: "[]".to_string(),
                        args: key.ty.to_string(),
                    });
                    return Ok(Rex::new(
                        StaticType::Missing,
                        RexOp::PathIndex {
                            root: Box::new(root),
                            key: Box::new(key),
                        },
                    ));
                }
                let ty = type_path_index(&root.ty);
                self.warn_if_degraded(&root.ty, &ty);
                Ok(Rex::new(
                    ty,
                    RexOp::PathIndex {
                        root: Box::new(root),
                        key: Box::new(key),
                    },
                ))
            }

            RexOp::PathKey { root, key } => {
                let root = self.type_rex(root, env, strategy)?;
                let ty = type_path_key(&root.ty, key);
                self.warn_if_degraded(&root.ty, &ty);
                Ok(Rex::new(
                    ty,
                    RexOp::PathKey {
                        root: Box::new(root),
                        key: key.clone(),
                    },
                ))
            }

            RexOp::PathSymbol { root, symbol } => {
                let root = self.type_rex(root, env, strategy)?;
                let (ty, resolved) = type_path_symbol(&root.ty, symbol);
                self.warn_if_degraded(&root.ty, &ty);
                let op = match resolved {
                    Some(key) => RexOp::PathKey {
                        root: Box::new(root),
                        key,
                    },
                    None => RexOp::PathSymbol {
                        root: Box::new(root),
                        symbol: symbol.clone(),
                    },
                };
                Ok(Rex::new(ty, op))
            }

            RexOp::CallUnresolved { id, hidden, args } => {
                let args = self.type_args(args, env, strategy)?;
                self.type_call(id, *hidden, args)
            }

            RexOp::CallStatic { signature, args } => {
                let args = self.type_args(args, env, strategy)?;
                let ty = if rex.ty.is_dynamic() {
                    call_return_type(signature, &args, false)
                } else {
                    rex.ty.clone()
                };
                Ok(Rex::new(
                    ty,
                    RexOp::CallStatic {
                        signature: signature.clone(),
                        args,
                    },
                ))
            }

            RexOp::CallDynamic {
                args,
                candidates,
                exhaustive,
            } => {
                let args = self.type_args(args, env, strategy)?;
                let ty = if rex.ty.is_dynamic() {
                    dynamic_return_type(candidates.iter().map(|c| &c.signature), &args, *exhaustive)
                } else {
                    rex.ty.clone()
                };
                Ok(Rex::new(
                    ty,
                    RexOp::CallDynamic {
                        args,
                        candidates: candidates.clone(),
                        exhaustive: *exhaustive,
                    },
                ))
            }

            RexOp::CastUnresolved { target, arg } => {
                let arg = self.type_rex(arg, env, strategy)?;
                match self.resolver.resolve_cast(&arg.ty, target) {
                    Some(resolution) => Ok(Rex::new(
                        resolution.ty,
                        RexOp::Cast {
                            target: target.clone(),
                            safety: resolution.safety,
                            arg: Box::new(arg),
                        },
                    )),
                    None => {
                        self.report(ProblemKind::UnknownCast {
                            from: arg.ty.to_string(),
                            to: target.to_string(),
                        });
                        Ok(Rex::error())
                    }
                }
            }

            RexOp::Cast {
                target,
                safety,
                arg,
            } => {
                let arg = self.type_rex(arg, env, strategy)?;
                let ty = if rex.ty.is_dynamic() {
                    target.clone()
                } else {
                    rex.ty.clone()
                };
                Ok(Rex::new(
                    ty,
                    RexOp::Cast {
                        target: target.clone(),
                        safety: *safety,
                        arg: Box::new(arg),
                    },
                ))
            }

            RexOp::Case { branches, default } => self.type_case(branches, default, env, strategy),

            RexOp::Coll { kind, values } => {
                let values = self.type_args(values, env, strategy)?;
                let unified = DynamicTyper::unify(&values);
                let values: Vec<Rex> = values
                    .into_iter()
                    .zip(unified.mappings)
                    .map(|(value, mapping)| DynamicTyper::apply(value, mapping))
                    .collect();
                let ty = match kind {
                    CollKind::Array => StaticType::array(unified.ty),
                    CollKind::Bag => StaticType::bag(unified.ty),
                };
                Ok(Rex::new(ty, RexOp::Coll { kind: *kind, values }))
            }

            RexOp::Struct(pairs) => self.type_struct(pairs, env, strategy),

            RexOp::TupleUnion { args } => {
                let args = self.type_args(args, env, strategy)?;
                let types: Vec<&StaticType> = args.iter().map(|a| &a.ty).collect();
                let ty = tuple_union_type(&types);
                Ok(Rex::new(ty, RexOp::TupleUnion { args }))
            }

            RexOp::Select { constructor, rel } => {
                let rel = self.type_rel(rel, env)?;
                let inner = env.nest(rel.schema.clone());
                let constructor = self.type_rex(constructor, &inner, Strategy::Local)?;
                let ty = if rel.is_ordered() {
                    StaticType::array(constructor.ty.clone())
                } else {
                    StaticType::bag(constructor.ty.clone())
                };
                Ok(Rex::new(
                    ty,
                    RexOp::Select {
                        constructor: Box::new(constructor),
                        rel: Box::new(rel),
                    },
                ))
            }

            RexOp::Subquery {
                constructor,
                rel,
                coercion,
            } => {
                let rel = self.type_rel(rel, env)?;
                let inner = env.nest(rel.schema.clone());
                let constructor = self.type_rex(constructor, &inner, Strategy::Local)?;
                let ty = match coercion {
                    SubqueryCoercion::Scalar => constructor.ty.clone().with_null(),
                    SubqueryCoercion::Row => {
                        StaticType::array(constructor.ty.clone())
                    }
                };
                Ok(Rex::new(
                    ty,
                    RexOp::Subquery {
                        constructor: Box::new(constructor),
                        rel: Box::new(rel),
                        coercion: *coercion,
                    },
                ))
            }

            RexOp::Pivot { key, value, rel } => {
                let rel = self.type_rel(rel, env)?;
                let inner = env.nest(rel.schema.clone());
                let key = self.type_rex(key, &inner, Strategy::Local)?;
                let value = self.type_rex(value, &inner, Strategy::Local)?;
                let ty = StaticType::Struct(StructType::open());
                Ok(Rex::new(
                    ty,
                    RexOp::Pivot {
                        key: Box::new(key),
                        value: Box::new(value),
                        rel: Box::new(rel),
                    },
                ))
            }

            RexOp::Error => Ok(Rex::error()),
        }
    }

    pub(crate) fn type_args(
        &mut self,
        args: &[Rex],
        env: &TypeEnv,
        strategy: Strategy,
    ) -> Result<Vec<Rex>> {
        args.iter()
            .map(|arg| self.type_rex(arg, env, strategy))
            .collect()
    }

    fn type_var_unresolved(
        &mut self,
        id: &Identifier,
        env: &TypeEnv,
        strategy: Strategy,
    ) -> Result<Rex> {
        let resolved = match strategy {
            Strategy::Local => match env.resolve(id) {
                ScopeResolution::Resolved(rex) => Ok(rex),
                ScopeResolution::Undefined { ambiguous } => {
                    self.resolve_global_ref(id).ok_or(ambiguous)
                }
            },
            Strategy::Global => match self.resolve_global_ref(id) {
                Some(rex) => Ok(rex),
                None => match env.resolve(id) {
                    ScopeResolution::Resolved(rex) => Ok(rex),
                    ScopeResolution::Undefined { ambiguous } => Err(ambiguous),
                },
            },
        };
        match resolved {
            Ok(rex) => {
                if rex.ty.is_always_unknown() {
                    self.report(ProblemKind::AlwaysNullOrMissing);
                }
                Ok(rex)
            }
            Err(true) => {
                self.report(ProblemKind::AmbiguousVariable {
                    identifier: id.to_string(),
                });
                Ok(Rex::error())
            }
            Err(false) => {
                self.report(ProblemKind::UndefinedVariable {
                    identifier: id.to_string(),
                    in_scope: env.binding_names(),
                });
                Ok(Rex::error())
            }
        }
    }

    fn resolve_global_ref(&self, id: &Identifier) -> Option<Rex> {
        let hit = self.catalog.resolve_global(id)?;
        let root = Rex::new(hit.ty, RexOp::Global(GlobalRef::new(hit.path)));
        Some(id.parts()[hit.depth..].iter().fold(root, apply_path_part))
    }

    fn type_call(&mut self, id: &Identifier, hidden: bool, args: Vec<Rex>) -> Result<Rex> {
        match self.resolver.resolve_fn(id, hidden, &args) {
            Ok(FnMatch::Static {
                signature,
                mapping,
                missable,
            }) => {
                let ty = call_return_type(&signature, &args, missable);
                let args = splice_coercions(args, &mapping);
                Ok(Rex::new(ty, RexOp::CallStatic { signature, args }))
            }
            Ok(FnMatch::Dynamic {
                candidates,
                exhaustive,
            }) => {
                let ty =
                    dynamic_return_type(candidates.iter().map(|c| &c.signature), &args, exhaustive);
                Ok(Rex::new(
                    ty,
                    RexOp::CallDynamic {
                        args,
                        candidates,
                        exhaustive,
                    },
                ))
            }
            Err(err) => {
                let args = err
                    .args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if hidden && err.candidates > 0 {
                    self.report(ProblemKind::IncompatibleTypesForOperator {
                        operator: err.identifier,
                        args,
                    });
                } else {
                    self.report(ProblemKind::UnknownFunction {
                        identifier: err.identifier,
                        args,
                    });
                }
                Ok(Rex::error())
            }
        }
    }

    fn type_case(
        &mut self,
        branches: &[CaseBranch],
        default: &Rex,
        env: &TypeEnv,
        strategy: Strategy,
    ) -> Result<Rex> {
        let mut typed: Vec<CaseBranch> = Vec::new();
        for branch in branches {
            let condition = self.type_rex(&branch.condition, env, strategy)?;
            if condition.is_literal_bool(false) {
                continue;
            }
            let can_be_bool = condition.ty.members().iter().any(|m| {
                matches!(m, StaticType::Bool | StaticType::Dynamic | StaticType::Null)
            });
            if !can_be_bool {
                self.report(ProblemKind::IncompatibleTypesForOperator {
                    operator: "case-when".to_string(),
                    args: condition.ty.to_string(),
                });
            }
            if typed.is_empty() && condition.is_literal_bool(true) {
                // the whole expression collapses to this branch's result
                return self.type_rex(&branch.result, env, strategy);
            }
            let result = self.type_rex(&branch.result, env, strategy)?;
            let result = narrow_result(&condition, result);
            typed.push(CaseBranch::new(condition, result));
        }
        let default = self.type_rex(default, env, strategy)?;
        let ty = StaticType::any_of(
            typed
                .iter()
                .map(|b| b.result.ty.clone())
                .chain([default.ty.clone()]),
        );
        Ok(Rex::new(
            ty,
            RexOp::Case {
                branches: typed,
                default: Box::new(default),
            },
        ))
    }

    fn type_struct(
        &mut self,
        pairs: &[StructPair],
        env: &TypeEnv,
        strategy: Strategy,
    ) -> Result<Rex> {
        let mut fields: Vec<StructField> = Vec::new();
        let mut closed = true;
        let mut typed: Vec<StructPair> = Vec::new();
        for pair in pairs {
            let key = self.type_rex(&pair.key, env, strategy)?;
            let value = self.type_rex(&pair.value, env, strategy)?;
            match key.as_literal().and_then(Literal::as_text) {
                // duplicate literal keys are retained, both fields kept
                Some(name) => fields.push(StructField::new(name, value.ty.clone())),
                // a computed key opens the content
                None => closed = false,
            }
            typed.push(StructPair::new(key, value));
        }
        let ty = StaticType::Struct(StructType::new(fields, closed, closed));
        Ok(Rex::new(ty, RexOp::Struct(typed)))
    }

    fn warn_if_degraded(&mut self, root: &StaticType, result: &StaticType) {
        if result.is_always_unknown() && !root.is_always_unknown() {
            self.report(ProblemKind::AlwaysNullOrMissing);
        }
    }
}

/// Combine a signature's declared return type with the NULL/MISSING
/// propagation rules; MISSING outranks NULL whenever both are reachable
pub(crate) fn call_return_type(
    sig: &FnSignature,
    args: &[Rex],
    extra_missable: bool,
) -> StaticType {
    if sig.is_missing_call && args.iter().any(|a| a.ty == StaticType::Missing) {
        return StaticType::Missing;
    }
    if sig.is_null_call
        && args
            .iter()
            .any(|a| a.as_literal().is_some_and(Literal::is_null))
    {
        return StaticType::Null;
    }
    let any_null = args.iter().any(|a| a.ty.may_be_null());
    let any_missing = args.iter().any(|a| a.ty.may_be_missing());
    let mut ty = sig.returns.clone();
    if sig.is_nullable {
        ty = ty.with_null();
    }
    if sig.is_missable {
        ty = ty.with_missing();
    }
    if !sig.is_null_call && !sig.is_missing_call && !any_null && !any_missing {
        // a known result regardless of the declared nullability
        ty = ty.exclude_unknown();
    }
    if sig.is_missing_call && any_missing {
        ty = ty.with_missing();
    }
    if sig.is_null_call && any_null {
        ty = ty.with_null();
    }
    if extra_missable {
        ty = ty.with_missing();
    }
    ty
}

fn dynamic_return_type<'a, I>(signatures: I, args: &[Rex], exhaustive: bool) -> StaticType
where
    I: Iterator<Item = &'a FnSignature>,
{
    let mut ty = StaticType::any_of(signatures.map(|sig| call_return_type(sig, args, false)));
    if !exhaustive {
        ty = ty.with_missing();
    }
    ty
}

/// Wrap arguments in the coercion casts the mapping prescribes
pub(crate) fn splice_coercions(args: Vec<Rex>, mapping: &[Option<StaticType>]) -> Vec<Rex> {
    args.into_iter()
        .zip(mapping)
        .map(|(arg, target)| match target {
            None => arg,
            Some(target) => coerce(arg, target.clone()),
        })
        .collect()
}

fn coerce(arg: Rex, target: StaticType) -> Rex {
    let mut ty = target.clone();
    if arg.ty.may_be_null() {
        ty = ty.with_null();
    }
    if arg.ty.may_be_missing() {
        ty = ty.with_missing();
    }
    Rex::new(
        ty,
        RexOp::Cast {
            target,
            safety: CastKind::Coercion,
            arg: Box::new(arg),
        },
    )
}

/// TUPLEUNION: merge once per cartesian-product permutation of the
/// arguments' union members
fn tuple_union_type(types: &[&StaticType]) -> StaticType {
    let members: Vec<&[StaticType]> = types.iter().map(|t| t.members()).collect();
    let permutations: usize = members
        .iter()
        .map(|m| m.len())
        .try_fold(1usize, |acc, len| acc.checked_mul(len))
        .unwrap_or(usize::MAX);
    if permutations > crate::resolver::MAX_PERMUTATIONS {
        return StaticType::Dynamic;
    }

    let mut results: Vec<StaticType> = Vec::new();
    let mut odometer = vec![0usize; members.len()];
    loop {
        results.push(merge_permutation(&members, &odometer));
        let mut advanced = false;
        for position in (0..odometer.len()).rev() {
            odometer[position] += 1;
            if odometer[position] < members[position].len() {
                advanced = true;
                break;
            }
            odometer[position] = 0;
        }
        if !advanced {
            break;
        }
    }
    StaticType::any_of(results)
}

fn merge_permutation(members: &[&[StaticType]], odometer: &[usize]) -> StaticType {
    let mut fields: Vec<StructField> = Vec::new();
    let mut closed = true;
    let mut ordered = true;
    for (position, choice) in odometer.iter().enumerate() {
        match &members[position][*choice] {
            StaticType::Null => return StaticType::Null,
            StaticType::Dynamic => return StaticType::Dynamic,
            StaticType::Struct(s) => {
                fields.extend(s.fields.iter().cloned());
                closed &= s.closed;
                ordered &= s.ordered;
            }
            _ => return StaticType::Missing,
        }
    }
    StaticType::Struct(StructType::new(fields, closed, ordered))
}

/// Narrow tuple-tested variables inside a CASE branch result
///
/// When the branch condition is `is_struct(<local var>)`, every reference
/// to that variable inside the already-typed result subtree is narrowed
/// to the struct-only subset of its declared union. Substitution only;
/// no re-typing.
fn narrow_result(condition: &Rex, result: Rex) -> Rex {
    let RexOp::CallStatic { signature, args } = &condition.op else {
        return result;
    };
    if signature.name != "is_struct" || args.len() != 1 {
        return result;
    }
    let RexOp::Var { depth, index } = args[0].op else {
        return result;
    };
    let struct_members: Vec<StaticType> = args[0]
        .ty
        .members()
        .iter()
        .filter(|m| m.is_struct())
        .cloned()
        .collect();
    if struct_members.is_empty() {
        return result;
    }
    let narrowed = StaticType::any_of(struct_members);
    subst_rex(result, depth, index, &narrowed, 0)
}

/// Replace references to one variable, tracking the extra scope depth
/// introduced by nested relational content
fn subst_rex(rex: Rex, depth: usize, index: usize, ty: &StaticType, offset: usize) -> Rex {
    let node_ty = rex.ty;
    let sub = |r: Rex| subst_rex(r, depth, index, ty, offset);
    let sub_box = |r: Box<Rex>| Box::new(subst_rex(*r, depth, index, ty, offset));
    let sub_vec = |rs: Vec<Rex>| rs.into_iter().map(sub).collect::<Vec<_>>();
    let sub_inner =
        |r: Box<Rex>| Box::new(subst_rex(*r, depth, index, ty, offset + 1));
    let op = match rex.op {
        RexOp::Var {
            depth: d,
            index: i,
        } if d == depth + offset && i == index => {
            return Rex::new(ty.clone(), RexOp::Var { depth: d, index: i });
        }
        op @ (RexOp::Lit(_)
        | RexOp::Var { .. }
        | RexOp::Global(_)
        | RexOp::VarUnresolved(_)
        | RexOp::Error) => op,
        RexOp::PathIndex { root, key } => RexOp::PathIndex {
            root: sub_box(root),
            key: sub_box(key),
        },
        RexOp::PathKey { root, key } => RexOp::PathKey {
            root: sub_box(root),
            key,
        },
        RexOp::PathSymbol { root, symbol } => RexOp::PathSymbol {
            root: sub_box(root),
            symbol,
        },
        RexOp::CallUnresolved { id, hidden, args } => RexOp::CallUnresolved {
            id,
            hidden,
            args: sub_vec(args),
        },
        RexOp::CallStatic { signature, args } => RexOp::CallStatic {
            signature,
            args: sub_vec(args),
        },
        RexOp::CallDynamic {
            args,
            candidates,
            exhaustive,
        } => RexOp::CallDynamic {
            args: sub_vec(args),
            candidates,
            exhaustive,
        },
        RexOp::CastUnresolved { target, arg } => RexOp::CastUnresolved {
            target,
            arg: sub_box(arg),
        },
        RexOp::Cast {
            target,
            safety,
            arg,
        } => RexOp::Cast {
            target,
            safety,
            arg: sub_box(arg),
        },
        RexOp::Case { branches, default } => RexOp::Case {
            branches: branches
                .into_iter()
                .map(|b| CaseBranch::new(sub(b.condition), sub(b.result)))
                .collect(),
            default: sub_box(default),
        },
        RexOp::Coll { kind, values } => RexOp::Coll {
            kind,
            values: sub_vec(values),
        },
        RexOp::Struct(pairs) => RexOp::Struct(
            pairs
                .into_iter()
                .map(|p| StructPair::new(sub(p.key), sub(p.value)))
                .collect(),
        ),
        RexOp::TupleUnion { args } => RexOp::TupleUnion {
            args: sub_vec(args),
        },
        RexOp::Select { constructor, rel } => RexOp::Select {
            constructor: sub_inner(constructor),
            rel: Box::new(subst_rel(*rel, depth, index, ty, offset)),
        },
        RexOp::Subquery {
            constructor,
            rel,
            coercion,
        } => RexOp::Subquery {
            constructor: sub_inner(constructor),
            rel: Box::new(subst_rel(*rel, depth, index, ty, offset)),
            coercion,
        },
        RexOp::Pivot { key, value, rel } => RexOp::Pivot {
            key: sub_inner(key),
            value: sub_inner(value),
            rel: Box::new(subst_rel(*rel, depth, index, ty, offset)),
        },
    };
    Rex::new(node_ty, op)
}

fn subst_rel(rel: Rel, depth: usize, index: usize, ty: &StaticType, offset: usize) -> Rel {
    let sub = |r: Rex, extra: usize| subst_rex(r, depth, index, ty, offset + extra);
    let sub_rel = |r: Box<Rel>| Box::new(subst_rel(*r, depth, index, ty, offset));
    let op = match rel.op {
        RelOp::Scan { rex } => RelOp::Scan { rex: sub(rex, 0) },
        RelOp::ScanIndexed { rex } => RelOp::ScanIndexed { rex: sub(rex, 0) },
        RelOp::Unpivot { rex } => RelOp::Unpivot { rex: sub(rex, 0) },
        RelOp::Filter { input, predicate } => RelOp::Filter {
            input: sub_rel(input),
            predicate: sub(predicate, 1),
        },
        RelOp::Sort { input, specs } => RelOp::Sort {
            input: sub_rel(input),
            specs: specs
                .into_iter()
                .map(|s| SortSpec::new(sub(s.rex, 1), s.order, s.nulls))
                .collect(),
        },
        RelOp::Limit { input, limit } => RelOp::Limit {
            input: sub_rel(input),
            limit: sub(limit, 0),
        },
        RelOp::Offset { input, offset: off } => RelOp::Offset {
            input: sub_rel(input),
            offset: sub(off, 0),
        },
        RelOp::Join {
            lhs,
            rhs,
            condition,
            kind,
        } => RelOp::Join {
            lhs: sub_rel(lhs),
            rhs: Box::new(subst_rel(*rhs, depth, index, ty, offset + 1)),
            condition: sub(condition, 1),
            kind,
        },
        RelOp::Aggregate {
            input,
            calls,
            groups,
        } => RelOp::Aggregate {
            input: sub_rel(input),
            calls: calls
                .into_iter()
                .map(|call| match call {
                    AggCall::Unresolved {
                        id,
                        set_quantifier,
                        args,
                    } => AggCall::Unresolved {
                        id,
                        set_quantifier,
                        args: args.into_iter().map(|a| sub(a, 1)).collect(),
                    },
                    AggCall::Resolved {
                        agg,
                        set_quantifier,
                        args,
                    } => AggCall::Resolved {
                        agg,
                        set_quantifier,
                        args: args.into_iter().map(|a| sub(a, 1)).collect(),
                    },
                })
                .collect(),
            groups: groups.into_iter().map(|g| sub(g, 1)).collect(),
        },
        RelOp::Project { input, projections } => RelOp::Project {
            input: sub_rel(input),
            projections: projections.into_iter().map(|p| sub(p, 1)).collect(),
        },
        RelOp::Exclude { input, paths } => RelOp::Exclude {
            input: sub_rel(input),
            paths: paths
                .into_iter()
                .map(|p| ExcludePath::new(sub(p.root, 1), p.steps))
                .collect(),
        },
    };
    Rel::new(rel.schema, rel.props, op)
}
