//! Squall semantic analysis pass
//!
//! Consumes a plan whose references, calls, and casts are unresolved and
//! whose nodes are annotated DYNAMIC, and produces a plan where every
//! reference is a local or global binding, every call is statically or
//! dynamically dispatched with explicit coercions spliced in, and every
//! node carries a precise inferred type.
//!
//! The pass is a single-threaded, purely functional tree rewrite: no node
//! is mutated in place, and each compilation owns its own typer state, so
//! independent compilations may run in parallel. Soft problems go to the
//! injected [`ProblemSink`]; only a malformed input plan or a tripped
//! [`Interrupt`] aborts the pass.

mod dynamic;
mod env;
mod exclude;
mod paths;
mod resolver;
mod rex;
mod rel;

pub use dynamic::*;
pub use env::*;
pub use resolver::*;

use squall_catalog::Catalog;
use squall_diagnostics::{CompileError, Problem, ProblemKind, ProblemSink, Result};
use squall_plan::Plan;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation handle
///
/// Cloned handles share one flag. The typer checks the flag at every
/// recursive descent step and aborts with [`CompileError::Interrupted`]
/// once tripped.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Create an untripped handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag; every pass sharing this handle aborts at its next
    /// descent step
    pub fn trip(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether the flag is tripped
    pub fn is_tripped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        if self.is_tripped() {
            Err(CompileError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Variable resolution order
///
/// GLOBAL-first is forced while typing a FROM-clause source expression
/// and restored to LOCAL-first afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Local scope chain first, then the catalog
    Local,
    /// Catalog first, then the local scope chain
    Global,
}

/// The typing pass over one plan
pub struct PlanTyper<'c> {
    catalog: &'c dyn Catalog,
    interrupt: Interrupt,
}

impl<'c> PlanTyper<'c> {
    /// Create a typer over a catalog
    pub fn new(catalog: &'c dyn Catalog) -> Self {
        Self {
            catalog,
            interrupt: Interrupt::new(),
        }
    }

    /// Attach a cancellation handle
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Type a plan, reporting soft problems to the sink
    ///
    /// Soft problems degrade the offending subtree (usually to MISSING)
    /// and typing continues, so one pass collects every problem. The only
    /// `Err` cases are a malformed input plan and interruption.
    pub fn type_plan(&self, plan: &Plan, sink: &mut dyn ProblemSink) -> Result<Plan> {
        let mut typer = Typer {
            resolver: FnResolver::new(self.catalog),
            catalog: self.catalog,
            sink,
            interrupt: self.interrupt.clone(),
        };
        match typer.type_rex(&plan.root, &TypeEnv::empty(), Strategy::Local) {
            Ok(root) => Ok(Plan::new(root)),
            Err(err) => {
                if let CompileError::MalformedPlan(message) = &err {
                    typer.report(ProblemKind::CompileError {
                        message: message.clone(),
                    });
                }
                Err(err)
            }
        }
    }
}

/// Per-pass state shared by the mutually recursive rex/rel visitors
pub(crate) struct Typer<'c, 's> {
    pub(crate) catalog: &'c dyn Catalog,
    pub(crate) resolver: FnResolver<'c>,
    pub(crate) sink: &'s mut dyn ProblemSink,
    pub(crate) interrupt: Interrupt,
}

impl Typer<'_, '_> {
    pub(crate) fn check_interrupt(&self) -> Result<()> {
        self.interrupt.check()
    }

    pub(crate) fn report(&mut self, kind: ProblemKind) {
        self.sink.report(Problem::new(kind));
    }
}
