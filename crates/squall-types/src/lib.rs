//! Squall static type system
//!
//! This crate defines the type model used by the typing pass:
//! - `StaticType`, the flattened-union type of the language, with NULL and
//!   MISSING as first-class types and DYNAMIC as the unconstrained top
//! - The cast relationship table (coercion / explicit / unsafe)
//! - The widening lattice used for common-supertype computation
//! - Function and aggregate signatures

mod casts;
mod lattice;
mod signature;
mod static_type;

pub use casts::*;
pub use lattice::*;
pub use signature::*;
pub use static_type::*;
