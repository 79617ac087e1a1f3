//! Facade-level compilation tests

use pretty_assertions::assert_eq;
use squall::catalog::MapCatalog;
use squall::diagnostics::{ProblemCollector, Severity};
use squall::plan::{Binding, CollKind, Identifier, Literal, Plan, Rel, RelOp, Rex, RexOp};
use squall::types::{StaticType, StructField, StructType};
use squall::PlanTyper;
use std::collections::BTreeSet;

#[test]
fn test_degraded_plan_is_still_produced() {
    // a query with only soft problems still compiles
    let catalog = MapCatalog::new();
    let root = Rex::untyped(RexOp::CallUnresolved {
        id: Identifier::regular("no_such_function"),
        hidden: false,
        args: vec![Rex::untyped(RexOp::VarUnresolved(Identifier::regular(
            "ghost",
        )))],
    });
    let mut problems = ProblemCollector::new();
    let typed = PlanTyper::new(&catalog)
        .type_plan(&Plan::new(root), &mut problems)
        .expect("soft problems never abort");
    assert_eq!(typed.root.ty, StaticType::Missing);
    assert!(problems.has_errors());
    assert_eq!(problems.problems().len(), 2);
    assert!(
        problems
            .problems()
            .iter()
            .all(|p| p.severity == Severity::Error)
    );
}

#[test]
fn test_select_from_catalog_collection() {
    let row = StaticType::Struct(StructType::new(
        vec![
            StructField::new("id", StaticType::Int64),
            StructField::new("name", StaticType::String),
        ],
        true,
        false,
    ));
    let catalog = MapCatalog::new().with_global("db.users", StaticType::bag(row));

    let scan = Rel::new(
        vec![Binding::new("u", StaticType::Dynamic)],
        BTreeSet::new(),
        RelOp::Scan {
            rex: Rex::untyped(RexOp::VarUnresolved(Identifier::new(vec![
                squall::plan::IdPart::regular("db"),
                squall::plan::IdPart::regular("users"),
            ]))),
        },
    );
    let root = Rex::untyped(RexOp::Select {
        constructor: Box::new(Rex::untyped(RexOp::VarUnresolved(Identifier::new(vec![
            squall::plan::IdPart::regular("u"),
            squall::plan::IdPart::regular("name"),
        ])))),
        rel: Box::new(scan),
    });

    let mut problems = ProblemCollector::new();
    let typed = PlanTyper::new(&catalog)
        .type_plan(&Plan::new(root), &mut problems)
        .expect("well-formed plan");
    assert!(problems.problems().is_empty());
    assert_eq!(typed.root.ty, StaticType::bag(StaticType::String));
}

#[test]
fn test_array_literal_element_widening() {
    let catalog = MapCatalog::new();
    let root = Rex::untyped(RexOp::Coll {
        kind: CollKind::Array,
        values: vec![
            Rex::lit(Literal::Int32(1)),
            Rex::lit(Literal::Int64(2)),
        ],
    });
    let mut problems = ProblemCollector::new();
    let typed = PlanTyper::new(&catalog)
        .type_plan(&Plan::new(root), &mut problems)
        .expect("well-formed plan");
    assert_eq!(typed.root.ty, StaticType::array(StaticType::Int64));
}
