//! Precedence-sorted signature registry
//!
//! Candidates for one name are kept sorted so the first match during
//! overload resolution is the preferred one: fewer parameters first, then
//! left-to-right per-parameter type precedence. Operators live in a hidden
//! namespace separate from named functions, so a user-defined function
//! named `plus` never shadows the `+` operator.

use indexmap::IndexMap;
use squall_types::FnSignature;
use std::cmp::Ordering;

/// Candidate ordering: arity, then per-parameter kind precedence
pub fn candidate_order(a: &FnSignature, b: &FnSignature) -> Ordering {
    a.arity().cmp(&b.arity()).then_with(|| {
        a.params
            .iter()
            .zip(b.params.iter())
            .map(|(pa, pb)| pa.ty.kind().precedence().cmp(&pb.ty.kind().precedence()))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    })
}

/// Registry of operator, function, and aggregate signatures
#[derive(Debug, Clone, Default)]
pub struct FnRegistry {
    operators: IndexMap<String, Vec<FnSignature>>,
    functions: IndexMap<String, Vec<FnSignature>>,
    aggregations: IndexMap<String, Vec<FnSignature>>,
}

impl FnRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator signature (hidden namespace)
    pub fn add_operator(&mut self, signature: FnSignature) {
        let sigs = self.operators.entry(signature.name.clone()).or_default();
        sigs.push(signature);
        sigs.sort_by(candidate_order);
    }

    /// Register a named function signature
    pub fn add_function(&mut self, signature: FnSignature) {
        let sigs = self.functions.entry(signature.name.clone()).or_default();
        sigs.push(signature);
        sigs.sort_by(candidate_order);
    }

    /// Register an aggregate signature
    pub fn add_aggregation(&mut self, signature: FnSignature) {
        let sigs = self.aggregations.entry(signature.name.clone()).or_default();
        sigs.push(signature);
        sigs.sort_by(candidate_order);
    }

    /// Candidates for a call; `hidden` selects the operator namespace
    pub fn lookup(&self, name: &str, hidden: bool) -> &[FnSignature] {
        let map = if hidden { &self.operators } else { &self.functions };
        map.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Candidates for an aggregate call
    pub fn lookup_aggregation(&self, name: &str) -> &[FnSignature] {
        self.aggregations
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squall_types::{FnParam, StaticType};

    fn unary(name: &str, ty: StaticType, returns: StaticType) -> FnSignature {
        FnSignature::new(name, vec![FnParam::new("value", ty)], returns)
    }

    #[test]
    fn test_candidates_sorted_by_arity_then_precedence() {
        let mut registry = FnRegistry::new();
        registry.add_function(unary("f", StaticType::String, StaticType::Bool));
        registry.add_function(unary("f", StaticType::Int8, StaticType::Bool));
        registry.add_function(FnSignature::new(
            "f",
            vec![
                FnParam::new("a", StaticType::Int8),
                FnParam::new("b", StaticType::Int8),
            ],
            StaticType::Bool,
        ));

        let sigs = registry.lookup("f", false);
        assert_eq!(sigs.len(), 3);
        assert_eq!(sigs[0].params[0].ty, StaticType::Int8);
        assert_eq!(sigs[1].params[0].ty, StaticType::String);
        assert_eq!(sigs[2].arity(), 2);
    }

    #[test]
    fn test_operator_namespace_is_separate() {
        let mut registry = FnRegistry::new();
        registry.add_operator(unary("plus", StaticType::Int32, StaticType::Int32));
        registry.add_function(unary("plus", StaticType::String, StaticType::String));

        assert_eq!(registry.lookup("plus", true)[0].params[0].ty, StaticType::Int32);
        assert_eq!(
            registry.lookup("plus", false)[0].params[0].ty,
            StaticType::String
        );
    }

    #[test]
    fn test_unknown_name_is_empty() {
        let registry = FnRegistry::new();
        assert!(registry.lookup("nope", false).is_empty());
        assert!(registry.lookup_aggregation("nope").is_empty());
    }
}
