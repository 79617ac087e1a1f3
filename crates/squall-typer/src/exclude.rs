//! Exclude-path resolution and application
//!
//! Each path's root is resolved against the input schema only. Steps are
//! applied recursively to the binding's type: struct steps remove
//! matching fields (or optionalize them once the path has passed through
//! a collection-index step, since only one element is affected),
//! collection steps descend into the element type, and a union type
//! distributes the removal over every member. A path that matched nothing
//! in any member leaves the schema untouched and raises a warning.

use crate::Typer;
use squall_diagnostics::ProblemKind;
use squall_plan::{Binding, ExcludePath, ExcludeStep, Rel, Rex, RexOp};
use squall_types::{StaticType, StructField, StructType};

impl Typer<'_, '_> {
    /// Resolve, merge, and apply exclude paths over the input's schema
    pub(crate) fn type_exclude(
        &mut self,
        input: &Rel,
        paths: &[ExcludePath],
    ) -> (Vec<Binding>, Vec<ExcludePath>) {
        // resolve roots against the input schema only
        let mut resolved: Vec<(usize, ExcludePath)> = Vec::new();
        let mut unresolved: Vec<ExcludePath> = Vec::new();
        for path in paths {
            match self.resolve_root(input, &path.root) {
                Some(index) => {
                    let root = Rex::new(
                        input.schema[index].ty.clone(),
                        RexOp::Var { depth: 0, index },
                    );
                    resolved.push((index, ExcludePath::new(root, path.steps.clone())));
                }
                None => {
                    self.report(ProblemKind::UnresolvedExcludeRoot {
                        root: display_root(&path.root),
                    });
                    unresolved.push(path.clone());
                }
            }
        }

        // merge subsumed paths sharing a resolved root: a path is dropped
        // when another path's steps are a proper prefix of its own, and
        // exact duplicates collapse
        let merged: Vec<(usize, ExcludePath)> = resolved
            .iter()
            .enumerate()
            .filter(|(position, (index, path))| {
                !resolved.iter().enumerate().any(|(other_pos, (o_index, other))| {
                    index == o_index
                        && other_pos != *position
                        && (is_proper_prefix(&other.steps, &path.steps)
                            || (other.steps == path.steps && other_pos < *position))
                })
            })
            .map(|(_, entry)| entry.clone())
            .collect();

        let mut schema = input.schema.clone();
        for (index, path) in &merged {
            let (ty, matched) = apply_steps(&schema[*index].ty, &path.steps, false);
            if matched {
                schema[*index] = Binding::new(schema[*index].name.clone(), ty);
            } else {
                self.report(ProblemKind::InvalidExcludePath {
                    path: display_path(path),
                });
            }
        }

        let mut out_paths: Vec<ExcludePath> = merged.into_iter().map(|(_, p)| p).collect();
        out_paths.extend(unresolved);
        (schema, out_paths)
    }

    fn resolve_root(&self, input: &Rel, root: &Rex) -> Option<usize> {
        match &root.op {
            // idempotent re-entry
            RexOp::Var { depth: 0, index } if *index < input.schema.len() => Some(*index),
            RexOp::VarUnresolved(id) => {
                let part = id.first();
                let mut hits = input
                    .schema
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| part.matches(&b.name));
                let (index, _) = hits.next()?;
                if hits.next().is_some() {
                    return None;
                }
                Some(index)
            }
            _ => None,
        }
    }
}

fn is_proper_prefix(shorter: &[ExcludeStep], longer: &[ExcludeStep]) -> bool {
    shorter.len() < longer.len() && longer[..shorter.len()] == *shorter
}

/// Apply steps to a type, distributing over union members
///
/// Returns the rewritten type and whether any step matched anything in
/// any member.
fn apply_steps(ty: &StaticType, steps: &[ExcludeStep], in_index: bool) -> (StaticType, bool) {
    if steps.is_empty() {
        return (ty.clone(), false);
    }
    let mut matched = false;
    let members: Vec<StaticType> = ty
        .members()
        .iter()
        .map(|member| {
            let (rewritten, m) = apply_member(member, steps, in_index);
            matched |= m;
            rewritten
        })
        .collect();
    (StaticType::any_of(members), matched)
}

fn apply_member(member: &StaticType, steps: &[ExcludeStep], in_index: bool) -> (StaticType, bool) {
    let Some((step, rest)) = steps.split_first() else {
        return (member.clone(), false);
    };
    match (step, member) {
        (
            ExcludeStep::StructField { .. } | ExcludeStep::StructKey { .. } | ExcludeStep::StructWildcard,
            StaticType::Struct(s),
        ) => {
            let mut fields: Vec<StructField> = Vec::new();
            let mut matched = false;
            for field in &s.fields {
                if !step_matches_field(step, field) {
                    fields.push(field.clone());
                    continue;
                }
                if rest.is_empty() {
                    matched = true;
                    if in_index {
                        // only one collection element is affected, so the
                        // field becomes optional rather than removed
                        fields.push(StructField::new(
                            field.name.clone(),
                            field.ty.clone().with_missing(),
                        ));
                    }
                } else {
                    let (ty, m) = apply_steps(&field.ty, rest, in_index);
                    matched |= m;
                    fields.push(StructField::new(field.name.clone(), ty));
                }
            }
            (
                StaticType::Struct(StructType::new(fields, s.closed, s.ordered)),
                matched,
            )
        }
        (ExcludeStep::CollIndex { .. }, StaticType::Array(elem)) => {
            if rest.is_empty() {
                // removing one element leaves the type unchanged
                (member.clone(), true)
            } else {
                let (ty, m) = apply_steps(elem, rest, true);
                (StaticType::array(ty), m)
            }
        }
        (ExcludeStep::CollWildcard, StaticType::Array(elem)) => {
            if rest.is_empty() {
                (member.clone(), true)
            } else {
                let (ty, m) = apply_steps(elem, rest, in_index);
                (StaticType::array(ty), m)
            }
        }
        (ExcludeStep::CollWildcard, StaticType::Bag(elem)) => {
            if rest.is_empty() {
                (member.clone(), true)
            } else {
                let (ty, m) = apply_steps(elem, rest, in_index);
                (StaticType::bag(ty), m)
            }
        }
        (_, StaticType::Dynamic) => (StaticType::Dynamic, true),
        _ => (member.clone(), false),
    }
}

fn step_matches_field(step: &ExcludeStep, field: &StructField) -> bool {
    match step {
        ExcludeStep::StructField { symbol } => field.name.eq_ignore_ascii_case(symbol),
        ExcludeStep::StructKey { key } => field.name == *key,
        ExcludeStep::StructWildcard => true,
        _ => false,
    }
}

fn display_root(root: &Rex) -> String {
    match &root.op {
        RexOp::VarUnresolved(id) => id.to_string(),
        RexOp::Var { depth, index } => format!("${depth}.{index}"),
        _ => "<expr>".to_string(),
    }
}

fn display_path(path: &ExcludePath) -> String {
    let mut out = display_root(&path.root);
    for step in &path.steps {
        match step {
            ExcludeStep::StructField { symbol } => {
                out.push('.');
                out.push_str(symbol);
            }
            ExcludeStep::StructKey { key } => {
                out.push_str(&format!(".\"{key}\""));
            }
            ExcludeStep::StructWildcard => out.push_str(".*"),
            ExcludeStep::CollIndex { index } => {
                out.push_str(&format!("[{index}]"));
            }
            ExcludeStep::CollWildcard => out.push_str("[*]"),
        }
    }
    out
}
