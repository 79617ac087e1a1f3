//! The Squall static type model
//!
//! This module defines the complete type model used by the typing pass:
//! - `StaticType`, covering primitives, collections, tuples, and unions
//! - `TypeKind`, the payload-free enumeration keying the cast table
//! - Union flattening and the NULL/MISSING membership model
//!
//! Nullability and missability are expressed by union membership: a value
//! that may be absent has MISSING among its type's members, not a side
//! flag. Unions are always flattened, deduplicated, and canonically
//! ordered, and are never nested or singleton.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The complete static type representation
///
/// NULL and MISSING are first-class types; DYNAMIC is the unconstrained
/// top type. Everything else is a concrete value type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StaticType {
    // === Markers ===
    /// The unconstrained top type
    Dynamic,
    /// The type of the NULL marker
    Null,
    /// The type of the MISSING marker
    Missing,

    // === Primitive Types ===
    /// Boolean
    Bool,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Arbitrary-precision integer
    Int,
    /// Exact numeric; `None` means arbitrary precision and scale
    Decimal(Option<DecimalProps>),
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Fixed-width text
    Char(u32),
    /// Bounded variable-width text
    VarChar(u32),
    /// Unbounded text
    String,
    /// Calendar date
    Date,
    /// Time of day
    Time {
        /// Whether a zone offset is carried
        with_zone: bool,
    },
    /// Date and time of day
    Timestamp {
        /// Whether a zone offset is carried
        with_zone: bool,
    },
    /// Binary large object
    Blob,
    /// Character large object
    Clob,

    // === Collection Types ===
    /// Ordered collection
    Array(Box<StaticType>),
    /// Unordered collection
    Bag(Box<StaticType>),

    // === Tuple Type ===
    /// Tuple with named fields
    Struct(StructType),

    // === Union Type ===
    /// Flattened, deduplicated union; construct via [`StaticType::any_of`]
    AnyOf(Vec<StaticType>),
}

/// Precision and scale of a bounded decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecimalProps {
    /// Total number of significant digits
    pub precision: u32,
    /// Digits to the right of the decimal point
    pub scale: u32,
}

impl DecimalProps {
    /// Create decimal precision/scale properties
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }
}

/// A tuple type: ordered named fields plus content flags
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructType {
    /// Fields in declaration order; duplicate names are representable
    pub fields: Vec<StructField>,
    /// Whether the field list is exhaustive
    pub closed: bool,
    /// Whether field order is semantic
    pub ordered: bool,
}

impl StructType {
    /// Create a struct type
    pub fn new(fields: Vec<StructField>, closed: bool, ordered: bool) -> Self {
        Self {
            fields,
            closed,
            ordered,
        }
    }

    /// An open, unordered struct with no known fields
    pub fn open() -> Self {
        Self::new(Vec::new(), false, false)
    }

    /// Look up a field by exact (case-sensitive) name
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields whose name matches case-insensitively
    pub fn fields_insensitive<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a StructField> {
        self.fields
            .iter()
            .filter(move |f| f.name.eq_ignore_ascii_case(name))
    }

    /// Whether the field name set contains the given name (case-sensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// A named field of a struct type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructField {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: StaticType,
}

impl StructField {
    /// Create a struct field
    pub fn new(name: impl Into<String>, ty: StaticType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl StaticType {
    // === Constructors ===

    /// Create an array type
    pub fn array(element: StaticType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Create a bag type
    pub fn bag(element: StaticType) -> Self {
        Self::Bag(Box::new(element))
    }

    /// Create a decimal with bounded precision and scale
    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::Decimal(Some(DecimalProps::new(precision, scale)))
    }

    /// Create a closed, unordered struct from fields
    pub fn row(fields: Vec<StructField>) -> Self {
        Self::Struct(StructType::new(fields, true, false))
    }

    /// Create a flattened, deduplicated union
    ///
    /// Nested unions are flattened, duplicates removed, members sorted
    /// into canonical order. A union containing DYNAMIC collapses to
    /// DYNAMIC; a singleton union collapses to its member; an empty input
    /// yields DYNAMIC.
    pub fn any_of<I: IntoIterator<Item = StaticType>>(types: I) -> Self {
        let mut members: Vec<StaticType> = Vec::new();
        let mut stack: Vec<StaticType> = types.into_iter().collect();
        stack.reverse();
        while let Some(ty) = stack.pop() {
            match ty {
                Self::AnyOf(inner) => {
                    for t in inner.into_iter().rev() {
                        stack.push(t);
                    }
                }
                Self::Dynamic => return Self::Dynamic,
                other => {
                    if !members.contains(&other) {
                        members.push(other);
                    }
                }
            }
        }
        members.sort();
        match members.len() {
            0 => Self::Dynamic,
            1 => members.pop().unwrap_or(Self::Dynamic),
            _ => Self::AnyOf(members),
        }
    }

    /// Union two types
    pub fn union_with(self, other: StaticType) -> Self {
        Self::any_of([self, other])
    }

    /// Union NULL into this type
    pub fn with_null(self) -> Self {
        self.union_with(Self::Null)
    }

    /// Union MISSING into this type
    pub fn with_missing(self) -> Self {
        self.union_with(Self::Missing)
    }

    /// Remove NULL and MISSING members
    ///
    /// A type that is exactly NULL, MISSING, or a union of the two is
    /// returned unchanged; there is no narrower type to force.
    pub fn exclude_unknown(self) -> Self {
        if self.is_always_unknown() {
            return self;
        }
        match self {
            Self::AnyOf(members) => Self::any_of(
                members
                    .into_iter()
                    .filter(|t| !matches!(t, Self::Null | Self::Missing)),
            ),
            other => other,
        }
    }

    // === Union Access ===

    /// The union members of this type; a singleton slice for non-unions
    pub fn members(&self) -> &[StaticType] {
        match self {
            Self::AnyOf(members) => members,
            other => std::slice::from_ref(other),
        }
    }

    // === Properties ===

    /// The payload-free kind of this type
    ///
    /// Unions report DYNAMIC; flatten first when the member kind matters.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Dynamic | Self::AnyOf(_) => TypeKind::Dynamic,
            Self::Null => TypeKind::Null,
            Self::Missing => TypeKind::Missing,
            Self::Bool => TypeKind::Bool,
            Self::Int8 => TypeKind::Int8,
            Self::Int16 => TypeKind::Int16,
            Self::Int32 => TypeKind::Int32,
            Self::Int64 => TypeKind::Int64,
            Self::Int => TypeKind::Int,
            Self::Decimal(_) => TypeKind::Decimal,
            Self::Float32 => TypeKind::Float32,
            Self::Float64 => TypeKind::Float64,
            Self::Char(_) => TypeKind::Char,
            Self::VarChar(_) => TypeKind::VarChar,
            Self::String => TypeKind::String,
            Self::Date => TypeKind::Date,
            Self::Time { .. } => TypeKind::Time,
            Self::Timestamp { .. } => TypeKind::Timestamp,
            Self::Blob => TypeKind::Blob,
            Self::Clob => TypeKind::Clob,
            Self::Array(_) => TypeKind::Array,
            Self::Bag(_) => TypeKind::Bag,
            Self::Struct(_) => TypeKind::Struct,
        }
    }

    /// Check if this is the DYNAMIC top type
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    /// Check if this is an integer kind
    pub fn is_integer(&self) -> bool {
        self.kind().is_integer()
    }

    /// Check if this is a text type
    pub fn is_text(&self) -> bool {
        self.kind().is_text()
    }

    /// Check if this is an array or bag
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Bag(_))
    }

    /// Check if this is a struct
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    /// Check if NULL is structurally reachable
    ///
    /// DYNAMIC may hold anything, NULL included.
    pub fn may_be_null(&self) -> bool {
        self.members()
            .iter()
            .any(|t| matches!(t, Self::Null | Self::Dynamic))
    }

    /// Check if MISSING is structurally reachable
    pub fn may_be_missing(&self) -> bool {
        self.members()
            .iter()
            .any(|t| matches!(t, Self::Missing | Self::Dynamic))
    }

    /// Check if every member is NULL or MISSING
    pub fn is_always_unknown(&self) -> bool {
        self.members()
            .iter()
            .all(|t| matches!(t, Self::Null | Self::Missing))
    }

    /// Get the element type for array/bag types
    pub fn element_type(&self) -> Option<&StaticType> {
        match self {
            Self::Array(elem) | Self::Bag(elem) => Some(elem),
            _ => None,
        }
    }

    /// Get the struct type for struct-typed values
    pub fn struct_type(&self) -> Option<&StructType> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for StaticType {
    fn default() -> Self {
        Self::Dynamic
    }
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => write!(f, "dynamic"),
            Self::Null => write!(f, "null"),
            Self::Missing => write!(f, "missing"),
            Self::Bool => write!(f, "bool"),
            Self::Int8 => write!(f, "int8"),
            Self::Int16 => write!(f, "int16"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Int => write!(f, "int"),
            Self::Decimal(None) => write!(f, "decimal"),
            Self::Decimal(Some(p)) => write!(f, "decimal({},{})", p.precision, p.scale),
            Self::Float32 => write!(f, "float32"),
            Self::Float64 => write!(f, "float64"),
            Self::Char(n) => write!(f, "char({n})"),
            Self::VarChar(n) => write!(f, "varchar({n})"),
            Self::String => write!(f, "string"),
            Self::Date => write!(f, "date"),
            Self::Time { with_zone: false } => write!(f, "time"),
            Self::Time { with_zone: true } => write!(f, "timez"),
            Self::Timestamp { with_zone: false } => write!(f, "timestamp"),
            Self::Timestamp { with_zone: true } => write!(f, "timestampz"),
            Self::Blob => write!(f, "blob"),
            Self::Clob => write!(f, "clob"),
            Self::Array(elem) => write!(f, "array<{elem}>"),
            Self::Bag(elem) => write!(f, "bag<{elem}>"),
            Self::Struct(s) => {
                write!(f, "struct")?;
                if !s.closed {
                    write!(f, "[open]")?;
                }
                write!(f, "{{")?;
                for (i, field) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Self::AnyOf(members) => {
                write!(f, "anyOf(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The payload-free enumeration of type kinds
///
/// This is the key domain of the cast table and the candidate precedence
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Null,
    Missing,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    Decimal,
    Float32,
    Float64,
    Char,
    VarChar,
    String,
    Clob,
    Blob,
    Date,
    Time,
    Timestamp,
    Array,
    Bag,
    Struct,
    Dynamic,
}

impl TypeKind {
    /// Every kind, in precedence order (see overload resolution)
    pub const ALL: [TypeKind; 23] = [
        TypeKind::Null,
        TypeKind::Missing,
        TypeKind::Bool,
        TypeKind::Int8,
        TypeKind::Int16,
        TypeKind::Int32,
        TypeKind::Int64,
        TypeKind::Int,
        TypeKind::Decimal,
        TypeKind::Float32,
        TypeKind::Float64,
        TypeKind::Char,
        TypeKind::VarChar,
        TypeKind::String,
        TypeKind::Clob,
        TypeKind::Blob,
        TypeKind::Date,
        TypeKind::Time,
        TypeKind::Timestamp,
        TypeKind::Array,
        TypeKind::Bag,
        TypeKind::Struct,
        TypeKind::Dynamic,
    ];

    /// Position of this kind in [`TypeKind::ALL`]
    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::ALL.len() - 1)
    }

    /// Left-to-right parameter precedence used to order candidates
    pub fn precedence(self) -> usize {
        self.index()
    }

    /// Check if this kind is numeric
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Int
                | Self::Decimal
                | Self::Float32
                | Self::Float64
        )
    }

    /// Check if this kind is an integer
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Int
        )
    }

    /// Check if this kind is textual
    pub fn is_text(self) -> bool {
        matches!(self, Self::Char | Self::VarChar | Self::String)
    }

    /// The representative type of this kind, with unbounded payloads
    pub fn to_type(self) -> StaticType {
        match self {
            Self::Null => StaticType::Null,
            Self::Missing => StaticType::Missing,
            Self::Bool => StaticType::Bool,
            Self::Int8 => StaticType::Int8,
            Self::Int16 => StaticType::Int16,
            Self::Int32 => StaticType::Int32,
            Self::Int64 => StaticType::Int64,
            Self::Int => StaticType::Int,
            Self::Decimal => StaticType::Decimal(None),
            Self::Float32 => StaticType::Float32,
            Self::Float64 => StaticType::Float64,
            Self::Char => StaticType::Char(1),
            Self::VarChar => StaticType::VarChar(u32::MAX),
            Self::String => StaticType::String,
            Self::Clob => StaticType::Clob,
            Self::Blob => StaticType::Blob,
            Self::Date => StaticType::Date,
            Self::Time => StaticType::Time { with_zone: false },
            Self::Timestamp => StaticType::Timestamp { with_zone: false },
            Self::Array => StaticType::array(StaticType::Dynamic),
            Self::Bag => StaticType::bag(StaticType::Dynamic),
            Self::Struct => StaticType::Struct(StructType::open()),
            Self::Dynamic => StaticType::Dynamic,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_of_flattens_and_dedups() {
        let ty = StaticType::any_of([
            StaticType::Int32,
            StaticType::any_of([StaticType::Int32, StaticType::String]),
            StaticType::Null,
        ]);
        let members = ty.members();
        assert_eq!(members.len(), 3);
        assert!(members.contains(&StaticType::Int32));
        assert!(members.contains(&StaticType::String));
        assert!(members.contains(&StaticType::Null));
    }

    #[test]
    fn test_any_of_singleton_collapses() {
        assert_eq!(
            StaticType::any_of([StaticType::Int32, StaticType::Int32]),
            StaticType::Int32
        );
    }

    #[test]
    fn test_any_of_dynamic_dominates() {
        assert_eq!(
            StaticType::any_of([StaticType::Int32, StaticType::Dynamic]),
            StaticType::Dynamic
        );
    }

    #[test]
    fn test_any_of_is_order_insensitive() {
        let a = StaticType::any_of([StaticType::Int32, StaticType::String]);
        let b = StaticType::any_of([StaticType::String, StaticType::Int32]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nullability_is_union_membership() {
        let ty = StaticType::Int32.with_null();
        assert!(ty.may_be_null());
        assert!(!ty.may_be_missing());
        assert!(StaticType::Dynamic.may_be_null());
        assert!(StaticType::Dynamic.may_be_missing());
    }

    #[test]
    fn test_exclude_unknown() {
        let ty = StaticType::any_of([StaticType::Int32, StaticType::Null, StaticType::Missing]);
        assert_eq!(ty.exclude_unknown(), StaticType::Int32);
        // no narrower type to force
        assert_eq!(StaticType::Null.exclude_unknown(), StaticType::Null);
    }

    #[test]
    fn test_always_unknown() {
        assert!(StaticType::Missing.is_always_unknown());
        assert!(StaticType::any_of([StaticType::Null, StaticType::Missing]).is_always_unknown());
        assert!(!StaticType::Int32.with_null().is_always_unknown());
    }

    #[test]
    fn test_struct_field_lookup() {
        let s = StructType::new(
            vec![
                StructField::new("A", StaticType::Int32),
                StructField::new("a", StaticType::String),
            ],
            true,
            false,
        );
        assert_eq!(s.field("A").map(|f| &f.ty), Some(&StaticType::Int32));
        assert_eq!(s.fields_insensitive("a").count(), 2);
        assert!(!s.contains("b"));
    }

    #[test]
    fn test_display() {
        assert_eq!(StaticType::decimal(10, 2).to_string(), "decimal(10,2)");
        assert_eq!(
            StaticType::bag(StaticType::Int32).to_string(),
            "bag<int32>"
        );
        assert_eq!(
            StaticType::any_of([StaticType::Int32, StaticType::Null]).to_string(),
            "anyOf(null, int32)"
        );
    }

    proptest::proptest! {
        /// Union construction is idempotent: re-wrapping a union changes
        /// nothing
        #[test]
        fn prop_any_of_is_idempotent(
            indices in proptest::collection::vec(0usize..6, 0..8)
        ) {
            let leaves = [
                StaticType::Bool,
                StaticType::Int32,
                StaticType::Int64,
                StaticType::String,
                StaticType::Null,
                StaticType::Missing,
            ];
            let types: Vec<StaticType> =
                indices.iter().map(|i| leaves[*i].clone()).collect();
            let once = StaticType::any_of(types);
            let twice = StaticType::any_of([once.clone()]);
            proptest::prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let ty = StaticType::any_of([
            StaticType::array(StaticType::Int32),
            StaticType::Struct(StructType::new(
                vec![StructField::new("x", StaticType::String)],
                true,
                true,
            )),
            StaticType::Null,
        ]);
        let json = serde_json::to_string(&ty).unwrap();
        let back: StaticType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }
}
