//! The catalog collaborator interface
//!
//! The typer consults an injected [`Catalog`] for global value bindings
//! and user-defined callables. Lookups are synchronous and assumed cheap;
//! the catalog is consumed read-only and never mutated by a pass.

use indexmap::IndexMap;
use squall_plan::Identifier;
use squall_types::{FnSignature, StaticType};

/// A resolved global binding
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalResolution {
    /// Catalog path of the matched object
    pub path: Vec<String>,
    /// Number of identifier segments the match consumed; trailing
    /// segments become path steps
    pub depth: usize,
    /// Type of the matched object
    pub ty: StaticType,
}

/// Read-only catalog metadata provider
pub trait Catalog {
    /// Resolve a (prefix of a) qualified identifier to a global binding
    fn resolve_global(&self, id: &Identifier) -> Option<GlobalResolution>;

    /// User-defined function signatures for a normalized lowercase name
    fn resolve_functions(&self, name: &str) -> Vec<FnSignature>;

    /// User-defined aggregate signatures for a normalized lowercase name
    fn resolve_aggregations(&self, name: &str) -> Vec<FnSignature>;
}

/// An empty catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl Catalog for EmptyCatalog {
    fn resolve_global(&self, _id: &Identifier) -> Option<GlobalResolution> {
        None
    }

    fn resolve_functions(&self, _name: &str) -> Vec<FnSignature> {
        Vec::new()
    }

    fn resolve_aggregations(&self, _name: &str) -> Vec<FnSignature> {
        Vec::new()
    }
}

/// In-memory catalog backed by maps; the embedding and test provider
#[derive(Debug, Clone, Default)]
pub struct MapCatalog {
    globals: Vec<(Vec<String>, StaticType)>,
    functions: IndexMap<String, Vec<FnSignature>>,
    aggregations: IndexMap<String, Vec<FnSignature>>,
}

impl MapCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global binding under a dotted path
    pub fn with_global(mut self, path: &str, ty: StaticType) -> Self {
        let segments = path.split('.').map(str::to_string).collect();
        self.globals.push((segments, ty));
        self
    }

    /// Register a user-defined function
    pub fn with_function(mut self, signature: FnSignature) -> Self {
        self.functions
            .entry(signature.name.clone())
            .or_default()
            .push(signature);
        self
    }

    /// Register a user-defined aggregate
    pub fn with_aggregation(mut self, signature: FnSignature) -> Self {
        self.aggregations
            .entry(signature.name.clone())
            .or_default()
            .push(signature);
        self
    }
}

impl Catalog for MapCatalog {
    /// Longest-prefix match of the identifier against registered paths;
    /// an ambiguous prefix resolves to nothing
    fn resolve_global(&self, id: &Identifier) -> Option<GlobalResolution> {
        for depth in (1..=id.len()).rev() {
            let prefix = &id.parts()[..depth];
            let mut matches = self.globals.iter().filter(|(path, _)| {
                path.len() == depth
                    && prefix
                        .iter()
                        .zip(path.iter())
                        .all(|(part, segment)| part.matches(segment))
            });
            if let Some((path, ty)) = matches.next() {
                if matches.next().is_some() {
                    return None;
                }
                return Some(GlobalResolution {
                    path: path.clone(),
                    depth,
                    ty: ty.clone(),
                });
            }
        }
        None
    }

    fn resolve_functions(&self, name: &str) -> Vec<FnSignature> {
        self.functions.get(name).cloned().unwrap_or_default()
    }

    fn resolve_aggregations(&self, name: &str) -> Vec<FnSignature> {
        self.aggregations.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squall_plan::IdPart;
    use squall_types::FnParam;

    #[test]
    fn test_global_exact_match() {
        let catalog = MapCatalog::new().with_global("db.t", StaticType::bag(StaticType::Int32));
        let id = Identifier::new(vec![IdPart::regular("db"), IdPart::regular("T")]);
        let hit = catalog.resolve_global(&id).unwrap();
        assert_eq!(hit.depth, 2);
        assert_eq!(hit.path, vec!["db".to_string(), "t".to_string()]);
    }

    #[test]
    fn test_global_prefix_match_leaves_trailing_segments() {
        let catalog = MapCatalog::new().with_global("t", StaticType::bag(StaticType::Dynamic));
        let id = Identifier::new(vec![IdPart::regular("t"), IdPart::regular("a")]);
        let hit = catalog.resolve_global(&id).unwrap();
        assert_eq!(hit.depth, 1);
    }

    #[test]
    fn test_global_case_sensitive_segment() {
        let catalog = MapCatalog::new().with_global("Data", StaticType::Int32);
        assert!(catalog.resolve_global(&Identifier::delimited("data")).is_none());
        assert!(catalog.resolve_global(&Identifier::delimited("Data")).is_some());
        assert!(catalog.resolve_global(&Identifier::regular("DATA")).is_some());
    }

    #[test]
    fn test_functions_by_name() {
        let sig = FnSignature::new(
            "reverse",
            vec![FnParam::new("s", StaticType::String)],
            StaticType::String,
        );
        let catalog = MapCatalog::new().with_function(sig.clone());
        assert_eq!(catalog.resolve_functions("reverse"), vec![sig]);
        assert!(catalog.resolve_functions("missing_fn").is_empty());
    }
}
