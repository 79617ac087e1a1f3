//! Squall algebraic query plan
//!
//! This crate defines the two-sorted algebra consumed and produced by the
//! typing pass: scalar expressions ([`Rex`]) and relational operators
//! ([`Rel`]). Unresolved (input) and resolved (output) node variants share
//! the same sum types; the typer rewrites the former into the latter and
//! never mutates a node in place.

mod identifier;
mod literal;
mod rel;
mod rex;

pub use identifier::*;
pub use literal::*;
pub use rel::*;
pub use rex::*;

use serde::{Deserialize, Serialize};

/// A complete query plan
///
/// The root is scalar: relational content enters through `Select`,
/// `Subquery`, and `Pivot` expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The root expression
    pub root: Rex,
}

impl Plan {
    /// Create a plan from its root expression
    pub fn new(root: Rex) -> Self {
        Self { root }
    }
}
