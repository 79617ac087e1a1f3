//! Problem taxonomy for the typing pass
//!
//! Every problem raised during semantic analysis is *soft*: it is reported
//! through a [`ProblemSink`] and the pass continues with a degraded type.
//! The only fatal condition is [`CompileError`], reserved for violated
//! internal preconditions and cancellation.

use crate::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The query is degraded; the offending subtree types as MISSING
    Error,
    /// Suspicious but well-formed; compilation output is unaffected
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The kind of a typing problem, with its offending identifiers/types
///
/// Payloads are carried as display strings so this crate stays at the
/// bottom of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ProblemKind {
    /// Variable reference resolved against neither scope nor catalog
    #[error("undefined variable `{identifier}` (local scope: {in_scope:?})")]
    UndefinedVariable {
        identifier: String,
        in_scope: Vec<String>,
    },

    /// Variable reference matched more than one binding at the same level
    #[error("ambiguous variable `{identifier}`")]
    AmbiguousVariable { identifier: String },

    /// No function candidate with the given name/arity exists
    #[error("unknown function `{identifier}({args})`")]
    UnknownFunction { identifier: String, args: String },

    /// No cast relationship exists between the given types
    #[error("cannot cast `{from}` to `{to}`")]
    UnknownCast { from: String, to: String },

    /// Operator applied to operand types it is not defined for
    #[error("operator `{operator}` is not defined for ({args})")]
    IncompatibleTypesForOperator { operator: String, args: String },

    /// Expression statically types to NULL or MISSING in every case
    #[error("expression always returns null or missing")]
    AlwaysNullOrMissing,

    /// An exclude path matched nothing in any union member of its root
    #[error("exclude path `{path}` does not exclude anything")]
    InvalidExcludePath { path: String },

    /// An exclude path root did not resolve against the input schema
    #[error("exclude root `{root}` is unresolved")]
    UnresolvedExcludeRoot { root: String },

    /// Two output bindings share a name
    #[error("duplicate binding name `{alias}`")]
    DuplicateAlias { alias: String },

    /// Internal precondition violated; reported and then raised fatally
    #[error("compile error: {message}")]
    CompileError { message: String },
}

impl ProblemKind {
    /// Default severity for this problem kind
    pub fn severity(&self) -> Severity {
        match self {
            Self::AlwaysNullOrMissing
            | Self::InvalidExcludePath { .. }
            | Self::DuplicateAlias { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A structured problem reported once per occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// What went wrong
    pub kind: ProblemKind,
    /// Severity level
    pub severity: Severity,
    /// Source location, if the producer tracked one
    pub location: Option<SourceLocation>,
}

impl Problem {
    /// Create a problem with the kind's default severity and no location
    pub fn new(kind: ProblemKind) -> Self {
        let severity = kind.severity();
        Self {
            kind,
            severity,
            location: None,
        }
    }

    /// Set the source location
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl From<ProblemKind> for Problem {
    fn from(kind: ProblemKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.kind)?;
        match &self.location {
            Some(loc) => write!(f, " at {loc}"),
            None => write!(f, " at unknown location"),
        }
    }
}

/// Receiver for problems raised during a pass
///
/// A sink must tolerate being invoked many times during one pass. Any
/// `FnMut(Problem)` closure is a sink.
pub trait ProblemSink {
    /// Report one problem occurrence
    fn report(&mut self, problem: Problem);
}

impl<F: FnMut(Problem)> ProblemSink for F {
    fn report(&mut self, problem: Problem) {
        self(problem)
    }
}

/// A sink that collects every reported problem in order
#[derive(Debug, Clone, Default)]
pub struct ProblemCollector {
    problems: Vec<Problem>,
}

impl ProblemCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// All problems reported so far, in report order
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Check whether any problem has Error severity
    pub fn has_errors(&self) -> bool {
        self.problems
            .iter()
            .any(|p| p.severity == Severity::Error)
    }

    /// Consume the collector, returning the problems
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }
}

impl ProblemSink for ProblemCollector {
    fn report(&mut self, problem: Problem) {
        self.problems.push(problem);
    }
}

/// Fatal, pass-aborting condition
///
/// Soft problems never surface here; a query with only soft problems still
/// produces a degraded plan.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// The input plan violates a structural precondition an earlier pass
    /// should have established
    #[error("malformed plan: {0}")]
    MalformedPlan(String),

    /// The pass observed a tripped interruption signal
    #[error("compilation interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_display() {
        let p = Problem::new(ProblemKind::UndefinedVariable {
            identifier: "x".to_string(),
            in_scope: vec!["t".to_string()],
        });
        assert!(p.to_string().contains("undefined variable"));
        assert!(p.to_string().contains("unknown location"));
    }

    #[test]
    fn test_problem_located() {
        let p = Problem::new(ProblemKind::AlwaysNullOrMissing)
            .at(SourceLocation::new(3, 7, 21, 4));
        assert_eq!(p.severity, Severity::Warning);
        assert!(p.to_string().contains("3:7"));
    }

    #[test]
    fn test_closure_sink() {
        let mut count = 0usize;
        {
            let mut sink = |_p: Problem| count += 1;
            sink.report(Problem::new(ProblemKind::AlwaysNullOrMissing));
            sink.report(Problem::new(ProblemKind::DuplicateAlias {
                alias: "a".to_string(),
            }));
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_collector() {
        let mut collector = ProblemCollector::new();
        collector.report(Problem::new(ProblemKind::AlwaysNullOrMissing));
        assert!(!collector.has_errors());
        collector.report(Problem::new(ProblemKind::UnknownFunction {
            identifier: "f".to_string(),
            args: "int32".to_string(),
        }));
        assert!(collector.has_errors());
        assert_eq!(collector.problems().len(), 2);
    }
}
