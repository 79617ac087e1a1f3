//! Qualified identifiers with per-segment case sensitivity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Case-matching mode of one identifier segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchCase {
    /// Delimited segment; matches byte-for-byte
    Sensitive,
    /// Regular segment; matches ignoring ASCII case
    Insensitive,
}

/// One segment of a qualified identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdPart {
    /// Segment text as written
    pub text: String,
    /// How the segment matches binding and field names
    pub case: MatchCase,
}

impl IdPart {
    /// A delimited (case-sensitive) segment
    pub fn delimited(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case: MatchCase::Sensitive,
        }
    }

    /// A regular (case-insensitive) segment
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case: MatchCase::Insensitive,
        }
    }

    /// Check whether this segment matches a name
    pub fn matches(&self, name: &str) -> bool {
        match self.case {
            MatchCase::Sensitive => self.text == name,
            MatchCase::Insensitive => self.text.eq_ignore_ascii_case(name),
        }
    }
}

impl fmt::Display for IdPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.case {
            MatchCase::Sensitive => write!(f, "\"{}\"", self.text),
            MatchCase::Insensitive => write!(f, "{}", self.text),
        }
    }
}

/// A dotted, possibly qualified identifier; always non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    parts: Vec<IdPart>,
}

impl Identifier {
    /// Create an identifier from segments; at least one is required
    pub fn new(parts: Vec<IdPart>) -> Self {
        debug_assert!(!parts.is_empty(), "identifier must have a segment");
        Self { parts }
    }

    /// A single regular segment
    pub fn regular(text: impl Into<String>) -> Self {
        Self::new(vec![IdPart::regular(text)])
    }

    /// A single delimited segment
    pub fn delimited(text: impl Into<String>) -> Self {
        Self::new(vec![IdPart::delimited(text)])
    }

    /// All segments
    pub fn parts(&self) -> &[IdPart] {
        &self.parts
    }

    /// The first segment
    pub fn first(&self) -> &IdPart {
        &self.parts[0]
    }

    /// Segments after the first
    pub fn rest(&self) -> &[IdPart] {
        &self.parts[1..]
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false; identifiers are non-empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The last segment lowercased, used for registry lookup
    pub fn name_lower(&self) -> String {
        self.parts[self.parts.len() - 1].text.to_lowercase()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_matching() {
        assert!(IdPart::regular("Name").matches("NAME"));
        assert!(!IdPart::delimited("Name").matches("NAME"));
        assert!(IdPart::delimited("Name").matches("Name"));
    }

    #[test]
    fn test_display() {
        let id = Identifier::new(vec![IdPart::regular("t"), IdPart::delimited("Col")]);
        assert_eq!(id.to_string(), "t.\"Col\"");
    }

    #[test]
    fn test_name_lower() {
        let id = Identifier::new(vec![IdPart::regular("pkg"), IdPart::regular("TRIM")]);
        assert_eq!(id.name_lower(), "trim");
    }
}
