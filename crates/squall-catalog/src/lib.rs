//! Squall catalog interface and function registry
//!
//! This crate provides:
//! - The read-only [`Catalog`] collaborator consulted for global bindings
//!   and user-defined functions/aggregations
//! - An in-memory [`MapCatalog`] for embedding and tests
//! - The precedence-sorted [`FnRegistry`] with the built-in operator,
//!   function, and aggregate signature set

mod builtins;
mod provider;
mod registry;

pub use builtins::*;
pub use provider::*;
pub use registry::*;
