//! The cast relationship table
//!
//! A complete |T|x|T| table over the fixed kind enumeration classifying
//! every cast as coercion, explicit, or unsafe. Only COERCION edges are
//! eligible for implicit insertion during overload resolution; EXPLICIT
//! edges require a source-level cast; UNSAFE edges may be synthesized for
//! source-level casts but mark the result as missable at runtime.

use crate::TypeKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a cast relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CastKind {
    /// Implicit, lossless; eligible for automatic insertion
    Coercion,
    /// Requires a source-level cast; never synthesized
    Explicit,
    /// May fail at runtime; the result is missable
    Unsafe,
}

impl fmt::Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastKind::Coercion => write!(f, "coercion"),
            CastKind::Explicit => write!(f, "explicit"),
            CastKind::Unsafe => write!(f, "unsafe"),
        }
    }
}

const KIND_COUNT: usize = TypeKind::ALL.len();

/// Widening order of the numeric family; lower index widens to higher
const NUMERIC_ORDER: [TypeKind; 8] = [
    TypeKind::Int8,
    TypeKind::Int16,
    TypeKind::Int32,
    TypeKind::Int64,
    TypeKind::Int,
    TypeKind::Decimal,
    TypeKind::Float32,
    TypeKind::Float64,
];

/// Widening order of the text family
const TEXT_ORDER: [TypeKind; 3] = [TypeKind::Char, TypeKind::VarChar, TypeKind::String];

fn family_position(order: &[TypeKind], kind: TypeKind) -> Option<usize> {
    order.iter().position(|k| *k == kind)
}

/// Classify the cast from `source` to `target`, if one exists
fn classify_pair(source: TypeKind, target: TypeKind) -> Option<CastKind> {
    use CastKind::{Coercion, Explicit, Unsafe};
    use TypeKind::{Array, Bag, Bool, Date, Null, Time, Timestamp};

    // Reflexive casts are coercions for every kind
    if source == target {
        return Some(Coercion);
    }

    // The null marker casts to anything
    if source == Null {
        return Some(Coercion);
    }

    // Numeric family: widening is a coercion, narrowing is unsafe
    if let (Some(s), Some(t)) = (
        family_position(&NUMERIC_ORDER, source),
        family_position(&NUMERIC_ORDER, target),
    ) {
        return Some(if s < t { Coercion } else { Unsafe });
    }

    // Text family: widening is a coercion, narrowing is unsafe
    if let (Some(s), Some(t)) = (
        family_position(&TEXT_ORDER, source),
        family_position(&TEXT_ORDER, target),
    ) {
        return Some(if s < t { Coercion } else { Unsafe });
    }

    // Numeric <-> text is never implicit
    if (source.is_numeric() && target.is_text()) || (source.is_text() && target.is_numeric()) {
        return Some(Explicit);
    }

    // Bool <-> numeric/text is never implicit
    if source == Bool && (target.is_numeric() || target.is_text()) {
        return Some(Explicit);
    }
    if target == Bool && (source.is_numeric() || source.is_text()) {
        return Some(Explicit);
    }

    // Temporal relationships
    match (source, target) {
        (Date, Timestamp) => return Some(Coercion),
        (Timestamp, Date) | (Timestamp, Time) => return Some(Unsafe),
        (Time, Timestamp) => return Some(Explicit),
        _ => {}
    }
    let temporal = |k: TypeKind| matches!(k, Date | Time | Timestamp);
    if (temporal(source) && target.is_text()) || (source.is_text() && temporal(target)) {
        return Some(Explicit);
    }

    // Array/bag-like collections coerce among themselves
    if matches!((source, target), (Array, Bag) | (Bag, Array)) {
        return Some(Coercion);
    }

    None
}

/// The static cast relationship table, built once
pub struct CastTable {
    table: [[Option<CastKind>; KIND_COUNT]; KIND_COUNT],
}

static CASTS: Lazy<CastTable> = Lazy::new(CastTable::build);

impl CastTable {
    fn build() -> Self {
        let mut table = [[None; KIND_COUNT]; KIND_COUNT];
        for source in TypeKind::ALL {
            for target in TypeKind::ALL {
                table[source.index()][target.index()] = classify_pair(source, target);
            }
        }
        Self { table }
    }

    /// The process-wide table
    pub fn get() -> &'static CastTable {
        &CASTS
    }

    /// Classify the cast from `source` to `target`
    pub fn classify(&self, source: TypeKind, target: TypeKind) -> Option<CastKind> {
        self.table[source.index()][target.index()]
    }

    /// Check if `source` coerces implicitly to `target`
    pub fn is_coercion(&self, source: TypeKind, target: TypeKind) -> bool {
        self.classify(source, target) == Some(CastKind::Coercion)
    }
}
