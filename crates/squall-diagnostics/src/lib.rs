//! Squall diagnostics
//!
//! This crate provides the diagnostics infrastructure for the Squall
//! compiler: source spans and locations, the structured problem taxonomy
//! raised by the typing pass, problem sinks, and the fatal `CompileError`.

mod problem;
mod span;

pub use problem::*;
pub use span::*;

/// Result type for pass-level operations
pub type Result<T> = std::result::Result<T, CompileError>;
