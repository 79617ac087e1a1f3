//! Built-in operator, function, and aggregate signatures
//!
//! The SQL operator core of the language. Operators are registered in the
//! hidden namespace and reached only through lowered operator syntax;
//! named functions and aggregates are reached by name.

use crate::FnRegistry;
use once_cell::sync::Lazy;
use squall_types::{FnParam, FnSignature, StaticType};

static BUILTINS: Lazy<FnRegistry> = Lazy::new(build);

/// The process-wide built-in registry
pub fn builtins() -> &'static FnRegistry {
    &BUILTINS
}

const NUMERICS: [StaticType; 8] = [
    StaticType::Int8,
    StaticType::Int16,
    StaticType::Int32,
    StaticType::Int64,
    StaticType::Int,
    StaticType::Decimal(None),
    StaticType::Float32,
    StaticType::Float64,
];

fn comparable() -> Vec<StaticType> {
    let mut types = NUMERICS.to_vec();
    types.extend([
        StaticType::String,
        StaticType::Date,
        StaticType::Time { with_zone: false },
        StaticType::Timestamp { with_zone: false },
    ]);
    types
}

fn unary(name: &str, operand: StaticType, returns: StaticType) -> FnSignature {
    FnSignature::new(name, vec![FnParam::new("value", operand)], returns)
}

fn binary(name: &str, lhs: StaticType, rhs: StaticType, returns: StaticType) -> FnSignature {
    FnSignature::new(
        name,
        vec![FnParam::new("lhs", lhs), FnParam::new("rhs", rhs)],
        returns,
    )
}

fn build() -> FnRegistry {
    let mut registry = FnRegistry::new();
    register_logical(&mut registry);
    register_arithmetic(&mut registry);
    register_comparison(&mut registry);
    register_text(&mut registry);
    register_predicates(&mut registry);
    register_functions(&mut registry);
    register_aggregations(&mut registry);
    registry
}

fn register_logical(registry: &mut FnRegistry) {
    registry.add_operator(unary("not", StaticType::Bool, StaticType::Bool));
    // AND/OR are not strict: NULL AND FALSE is FALSE
    for name in ["and", "or"] {
        registry.add_operator(
            binary(name, StaticType::Bool, StaticType::Bool, StaticType::Bool)
                .not_null_call()
                .not_missing_call()
                .nullable(),
        );
    }
}

fn register_arithmetic(registry: &mut FnRegistry) {
    for ty in NUMERICS {
        registry.add_operator(unary("pos", ty.clone(), ty.clone()));
        registry.add_operator(unary("neg", ty.clone(), ty.clone()));
        for name in ["plus", "minus", "times", "divide", "modulo"] {
            registry.add_operator(binary(name, ty.clone(), ty.clone(), ty.clone()));
        }
    }
}

fn register_comparison(registry: &mut FnRegistry) {
    let mut equatable = comparable();
    equatable.push(StaticType::Bool);
    for ty in &equatable {
        for name in ["eq", "ne"] {
            registry.add_operator(binary(name, ty.clone(), ty.clone(), StaticType::Bool));
        }
    }
    for ty in comparable() {
        for name in ["lt", "lte", "gt", "gte"] {
            registry.add_operator(binary(name, ty.clone(), ty.clone(), StaticType::Bool));
        }
        registry.add_operator(FnSignature::new(
            "between",
            vec![
                FnParam::new("value", ty.clone()),
                FnParam::new("lower", ty.clone()),
                FnParam::new("upper", ty),
            ],
            StaticType::Bool,
        ));
    }
    registry.add_operator(binary(
        "in_collection",
        StaticType::Dynamic,
        StaticType::Dynamic,
        StaticType::Bool,
    ));
}

fn register_text(registry: &mut FnRegistry) {
    registry.add_operator(binary(
        "concat",
        StaticType::String,
        StaticType::String,
        StaticType::String,
    ));
    registry.add_operator(binary(
        "like",
        StaticType::String,
        StaticType::String,
        StaticType::Bool,
    ));
    registry.add_operator(FnSignature::new(
        "like",
        vec![
            FnParam::new("value", StaticType::String),
            FnParam::new("pattern", StaticType::String),
            FnParam::new("escape", StaticType::String),
        ],
        StaticType::Bool,
    ));
}

fn register_predicates(registry: &mut FnRegistry) {
    // type predicates observe NULL/MISSING instead of propagating them
    for name in ["is_null", "is_missing", "is_struct"] {
        registry.add_operator(
            unary(name, StaticType::Dynamic, StaticType::Bool)
                .not_null_call()
                .not_missing_call(),
        );
    }
}

fn register_functions(registry: &mut FnRegistry) {
    for name in ["lower", "upper", "trim"] {
        registry.add_function(unary(name, StaticType::String, StaticType::String));
    }
    registry.add_function(unary("char_length", StaticType::String, StaticType::Int64));
    registry.add_function(binary(
        "position",
        StaticType::String,
        StaticType::String,
        StaticType::Int64,
    ));
    registry.add_function(binary(
        "substring",
        StaticType::String,
        StaticType::Int64,
        StaticType::String,
    ));
    registry.add_function(FnSignature::new(
        "substring",
        vec![
            FnParam::new("value", StaticType::String),
            FnParam::new("start", StaticType::Int64),
            FnParam::new("length", StaticType::Int64),
        ],
        StaticType::String,
    ));
    for ty in NUMERICS {
        registry.add_function(unary("abs", ty.clone(), ty));
    }
}

fn register_aggregations(registry: &mut FnRegistry) {
    registry.add_aggregation(
        FnSignature::new("count_star", vec![], StaticType::Int64)
            .not_null_call()
            .not_missing_call(),
    );
    registry.add_aggregation(
        unary("count", StaticType::Dynamic, StaticType::Int64)
            .not_null_call()
            .not_missing_call(),
    );
    for ty in NUMERICS {
        registry.add_aggregation(
            unary("sum", ty.clone(), ty.clone())
                .not_null_call()
                .not_missing_call()
                .nullable(),
        );
        registry.add_aggregation(
            unary("avg", ty, StaticType::Decimal(None))
                .not_null_call()
                .not_missing_call()
                .nullable(),
        );
    }
    for ty in comparable() {
        for name in ["min", "max"] {
            registry.add_aggregation(
                unary(name, ty.clone(), ty.clone())
                    .not_null_call()
                    .not_missing_call()
                    .nullable(),
            );
        }
    }
    for name in ["any", "every"] {
        registry.add_aggregation(
            unary(name, StaticType::Bool, StaticType::Bool)
                .not_null_call()
                .not_missing_call()
                .nullable(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_operators_are_hidden() {
        let registry = builtins();
        assert!(!registry.lookup("plus", true).is_empty());
        assert!(registry.lookup("plus", false).is_empty());
    }

    #[rstest]
    #[case("plus", 8)]
    #[case("eq", 13)]
    #[case("not", 1)]
    #[case("like", 2)]
    fn test_operator_overload_counts(#[case] name: &str, #[case] expected: usize) {
        assert_eq!(builtins().lookup(name, true).len(), expected);
    }

    #[test]
    fn test_candidates_prefer_narrower_numerics() {
        let sigs = builtins().lookup("plus", true);
        assert_eq!(sigs[0].params[0].ty, StaticType::Int8);
        assert_eq!(sigs[sigs.len() - 1].params[0].ty, StaticType::Float64);
    }

    #[test]
    fn test_logical_operators_are_not_strict() {
        let and = &builtins().lookup("and", true)[0];
        assert!(!and.is_null_call);
        assert!(!and.is_missing_call);
        assert!(and.is_nullable);
    }

    #[test]
    fn test_aggregations() {
        let registry = builtins();
        assert_eq!(registry.lookup_aggregation("count_star")[0].arity(), 0);
        assert!(registry.lookup_aggregation("sum")[0].is_nullable);
        assert!(!registry.lookup_aggregation("count")[0].is_nullable);
    }
}
