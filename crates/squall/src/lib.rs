//! Squall semantic analysis
//!
//! This crate bundles the semantic-analysis stage of the Squall compiler:
//! typing and name/overload resolution over an algebraic query plan.
//!
//! # Example
//!
//! ```
//! use squall::catalog::MapCatalog;
//! use squall::diagnostics::ProblemCollector;
//! use squall::plan::{Literal, Plan, Rex};
//! use squall::typer::PlanTyper;
//! use squall::types::StaticType;
//!
//! let catalog = MapCatalog::new().with_global("answer", StaticType::Int64);
//! let plan = Plan::new(Rex::lit(Literal::Int32(42)));
//!
//! let mut problems = ProblemCollector::new();
//! let typed = PlanTyper::new(&catalog)
//!     .type_plan(&plan, &mut problems)
//!     .expect("well-formed plan");
//! assert_eq!(typed.root.ty, StaticType::Int32);
//! ```

// Re-export the public APIs of the internal crates
pub use squall_catalog as catalog;
pub use squall_diagnostics as diagnostics;
pub use squall_plan as plan;
pub use squall_typer as typer;
pub use squall_types as types;

// Convenience re-exports
pub use squall_catalog::{Catalog, MapCatalog};
pub use squall_diagnostics::{CompileError, Problem, ProblemCollector, ProblemSink, Result};
pub use squall_plan::{Plan, Rel, Rex};
pub use squall_typer::{Interrupt, PlanTyper};
pub use squall_types::StaticType;
