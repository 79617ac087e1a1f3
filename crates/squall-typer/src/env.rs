//! Lexical type environment
//!
//! A [`TypeEnv`] is one scope level — the ordered schema produced by the
//! enclosing relational operator — chained to its enclosing scopes. It
//! lives exactly as long as the typing pass over one query block.
//!
//! Resolution at one level prefers an exact binding-name match, then a
//! definite (closed) struct-field match. An open-struct field match is
//! provisional: it is remembered and wins only if no enclosing level
//! produces a definite match. Two or more matches at one level are an
//! ambiguity, treated as not-found at that level and propagated outward.

use crate::paths::apply_path_part;
use squall_plan::{Binding, IdPart, Identifier, Rex, RexOp};
use squall_types::StaticType;

/// Outcome of a scope-chain resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeResolution {
    /// A depth-qualified local reference, wrapped in path steps for the
    /// remaining identifier segments
    Resolved(Rex),
    /// Nothing resolved; `ambiguous` records whether any level failed on
    /// a multiple-match ambiguity
    Undefined { ambiguous: bool },
}

/// One scope level plus its enclosing chain
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    schema: Vec<Binding>,
    outer: Option<Box<TypeEnv>>,
}

impl TypeEnv {
    /// The empty root environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a root environment over a schema
    pub fn root(schema: Vec<Binding>) -> Self {
        Self {
            schema,
            outer: None,
        }
    }

    /// Open a child scope over a schema, enclosing this environment
    pub fn nest(&self, schema: Vec<Binding>) -> Self {
        Self {
            schema,
            outer: Some(Box::new(self.clone())),
        }
    }

    /// The bindings of the current level
    pub fn schema(&self) -> &[Binding] {
        &self.schema
    }

    /// Binding names of the current level, for diagnostics
    pub fn binding_names(&self) -> Vec<String> {
        self.schema.iter().map(|b| b.name.clone()).collect()
    }

    /// The binding a resolved local variable refers to
    pub fn binding_at(&self, depth: usize, index: usize) -> Option<&Binding> {
        let mut env = self;
        for _ in 0..depth {
            env = env.outer.as_deref()?;
        }
        env.schema.get(index)
    }

    /// Resolve a qualified identifier against the scope chain
    pub fn resolve(&self, id: &Identifier) -> ScopeResolution {
        let mut provisional: Option<Rex> = None;
        let mut ambiguous = false;
        let mut level = Some(self);
        let mut depth = 0usize;
        while let Some(env) = level {
            match env.resolve_level(id, depth) {
                LevelMatch::Definite(root) => {
                    return ScopeResolution::Resolved(wrap_rest(root, id));
                }
                LevelMatch::Provisional(root) => {
                    if provisional.is_none() {
                        provisional = Some(wrap_rest(root, id));
                    }
                }
                LevelMatch::Ambiguous => ambiguous = true,
                LevelMatch::None => {}
            }
            level = env.outer.as_deref();
            depth += 1;
        }
        match provisional {
            Some(rex) => ScopeResolution::Resolved(rex),
            None => ScopeResolution::Undefined { ambiguous },
        }
    }

    fn resolve_level(&self, id: &Identifier, depth: usize) -> LevelMatch {
        let part = id.first();

        // (a) binding-name match; exactly one required
        let mut names = self
            .schema
            .iter()
            .enumerate()
            .filter(|(_, b)| part.matches(&b.name));
        if let Some((index, binding)) = names.next() {
            if names.next().is_some() {
                return LevelMatch::Ambiguous;
            }
            return LevelMatch::Definite(local_var(depth, index, binding.ty.clone()));
        }

        // (b) struct-field match over struct-typed bindings
        let mut definite: Option<usize> = None;
        let mut definite_count = 0usize;
        let mut possible: Option<usize> = None;
        for (index, binding) in self.schema.iter().enumerate() {
            match classify_field_match(&binding.ty, part) {
                FieldMatch::Definite => {
                    definite_count += 1;
                    definite = Some(index);
                }
                FieldMatch::Possible => {
                    if possible.is_none() {
                        possible = Some(index);
                    }
                }
                FieldMatch::No => {}
            }
        }
        match (definite, definite_count) {
            (Some(index), 1) => {
                let root = local_var(depth, index, self.schema[index].ty.clone());
                LevelMatch::Definite(apply_path_part(root, part))
            }
            (Some(_), _) => LevelMatch::Ambiguous,
            (None, _) => match possible {
                Some(index) => {
                    let root = local_var(depth, index, self.schema[index].ty.clone());
                    LevelMatch::Provisional(apply_path_part(root, part))
                }
                None => LevelMatch::None,
            },
        }
    }
}

enum LevelMatch {
    Definite(Rex),
    Provisional(Rex),
    Ambiguous,
    None,
}

enum FieldMatch {
    Definite,
    Possible,
    No,
}

fn local_var(depth: usize, index: usize, ty: StaticType) -> Rex {
    Rex::new(ty, RexOp::Var { depth, index })
}

/// Wrap the segments after the first as explicit path steps
fn wrap_rest(root: Rex, id: &Identifier) -> Rex {
    id.rest().iter().fold(root, apply_path_part)
}

/// Classify whether a binding's type can contain the segment as a field
fn classify_field_match(ty: &StaticType, part: &IdPart) -> FieldMatch {
    let mut definite = false;
    let mut possible = false;
    for member in ty.members() {
        match member {
            StaticType::Dynamic => possible = true,
            StaticType::Struct(s) => {
                let found = s.fields.iter().any(|f| part.matches(&f.name));
                if found {
                    definite = true;
                } else if !s.closed {
                    possible = true;
                }
            }
            _ => {}
        }
    }
    if definite {
        FieldMatch::Definite
    } else if possible {
        FieldMatch::Possible
    } else {
        FieldMatch::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squall_types::{StructField, StructType};

    fn closed_struct(fields: Vec<StructField>) -> StaticType {
        StaticType::Struct(StructType::new(fields, true, false))
    }

    fn resolve(env: &TypeEnv, name: &str) -> ScopeResolution {
        env.resolve(&Identifier::regular(name))
    }

    #[test]
    fn test_name_match_at_current_level() {
        let env = TypeEnv::root(vec![Binding::new("t", StaticType::Int32)]);
        match resolve(&env, "T") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.ty, StaticType::Int32);
                assert_eq!(rex.op, RexOp::Var { depth: 0, index: 0 });
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_outer_level_adds_depth() {
        let outer = TypeEnv::root(vec![Binding::new("x", StaticType::String)]);
        let env = outer.nest(vec![Binding::new("y", StaticType::Int32)]);
        match resolve(&env, "x") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.op, RexOp::Var { depth: 1, index: 0 });
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguity_is_not_found_at_level() {
        let outer = TypeEnv::root(vec![Binding::new("x", StaticType::String)]);
        let env = outer.nest(vec![
            Binding::new("x", StaticType::Int32),
            Binding::new("x", StaticType::Bool),
        ]);
        // ambiguous at depth 0, resolves at depth 1
        match resolve(&env, "x") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.op, RexOp::Var { depth: 1, index: 0 });
                assert_eq!(rex.ty, StaticType::String);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_reports_ambiguity() {
        let env = TypeEnv::root(vec![
            Binding::new("x", StaticType::Int32),
            Binding::new("x", StaticType::Bool),
        ]);
        assert_eq!(
            resolve(&env, "x"),
            ScopeResolution::Undefined { ambiguous: true }
        );
        assert_eq!(
            resolve(&env, "y"),
            ScopeResolution::Undefined { ambiguous: false }
        );
    }

    #[test]
    fn test_closed_struct_field_match() {
        let env = TypeEnv::root(vec![Binding::new(
            "t",
            closed_struct(vec![StructField::new("a", StaticType::Int64)]),
        )]);
        match resolve(&env, "a") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.ty, StaticType::Int64);
                assert!(matches!(rex.op, RexOp::PathKey { .. }));
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_open_struct_is_provisional() {
        // the open struct at depth 0 must lose to the definite name match
        // at depth 1
        let outer = TypeEnv::root(vec![Binding::new("a", StaticType::String)]);
        let env = outer.nest(vec![Binding::new(
            "t",
            StaticType::Struct(StructType::open()),
        )]);
        match resolve(&env, "a") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.op, RexOp::Var { depth: 1, index: 0 });
                assert_eq!(rex.ty, StaticType::String);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_open_struct_wins_when_nothing_definite() {
        let env = TypeEnv::root(vec![Binding::new(
            "t",
            StaticType::Struct(StructType::open()),
        )]);
        match resolve(&env, "a") {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.ty, StaticType::Dynamic);
                assert!(matches!(rex.op, RexOp::PathSymbol { .. }));
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_remaining_segments_become_steps() {
        let env = TypeEnv::root(vec![Binding::new(
            "t",
            closed_struct(vec![StructField::new("A", StaticType::Int32)]),
        )]);
        let id = Identifier::new(vec![IdPart::regular("t"), IdPart::regular("a")]);
        match env.resolve(&id) {
            ScopeResolution::Resolved(rex) => {
                assert_eq!(rex.ty, StaticType::Int32);
                // case-insensitive segment disambiguated to the actual name
                match rex.op {
                    RexOp::PathKey { key, .. } => assert_eq!(key, "A"),
                    other => panic!("expected key step, got {other:?}"),
                }
            }
            other => panic!("expected resolution, got {other:?}"),
        }
    }
}
