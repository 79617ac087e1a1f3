//! Function, operator, aggregate, and cast resolution
//!
//! Resolution enumerates the full cross-product of the arguments' union
//! members and scans the precedence-sorted candidates once per
//! permutation. A permutation matching no candidate contributes "the
//! result may be MISSING" instead of aborting. Deduplicated results
//! decide between static dispatch, dynamic dispatch, and an error.

use smallvec::SmallVec;
use squall_catalog::{Catalog, builtins, candidate_order};
use squall_plan::{DynamicCandidate, Identifier, Rex};
use squall_types::{CastKind, CastTable, FnSignature, StaticType};

/// Bound on the permutation cross-product per call site
///
/// Beyond the bound, union-typed arguments collapse to DYNAMIC and
/// resolution degrades to non-exhaustive dynamic dispatch.
pub const MAX_PERMUTATIONS: usize = 256;

/// A successful resolution
#[derive(Debug, Clone, PartialEq)]
pub enum FnMatch {
    /// Exactly one distinct (signature, coercion mapping) survived
    Static {
        signature: FnSignature,
        /// Per-argument coercion targets; `None` where no cast is needed
        mapping: Vec<Option<StaticType>>,
        /// Whether some permutation matched no candidate
        missable: bool,
    },
    /// Multiple candidates survive to runtime dispatch
    Dynamic {
        candidates: Vec<DynamicCandidate>,
        /// Whether every permutation found a match
        exhaustive: bool,
    },
}

/// A failed resolution, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct FnError {
    /// The attempted identifier
    pub identifier: String,
    /// The argument types
    pub args: Vec<StaticType>,
    /// Number of candidates considered (same name, any arity)
    pub candidates: usize,
}

/// A resolved source-level cast
#[derive(Debug, Clone, PartialEq)]
pub struct CastResolution {
    /// Strongest classification among the source's union members
    pub safety: CastKind,
    /// Result type, including NULL/MISSING reachability
    pub ty: StaticType,
}

/// Overload resolution over the built-in registry plus catalog extensions
pub struct FnResolver<'c> {
    catalog: &'c dyn Catalog,
}

impl<'c> FnResolver<'c> {
    /// Create a resolver over a catalog
    pub fn new(catalog: &'c dyn Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve a function or operator call
    pub fn resolve_fn(
        &self,
        id: &Identifier,
        hidden: bool,
        args: &[Rex],
    ) -> Result<FnMatch, FnError> {
        let name = id.name_lower();
        let mut candidates = builtins().lookup(&name, hidden).to_vec();
        if !hidden {
            candidates.extend(self.catalog.resolve_functions(&name));
            candidates.sort_by(candidate_order);
        }
        self.resolve(id, candidates, args)
    }

    /// Resolve an aggregate call
    pub fn resolve_agg(&self, id: &Identifier, args: &[Rex]) -> Result<FnMatch, FnError> {
        let name = id.name_lower();
        let mut candidates = builtins().lookup_aggregation(&name).to_vec();
        candidates.extend(self.catalog.resolve_aggregations(&name));
        candidates.sort_by(candidate_order);
        self.resolve(id, candidates, args)
    }

    fn resolve(
        &self,
        id: &Identifier,
        candidates: Vec<FnSignature>,
        args: &[Rex],
    ) -> Result<FnMatch, FnError> {
        let considered = candidates.len();
        let error = || FnError {
            identifier: id.to_string(),
            args: args.iter().map(|a| a.ty.clone()).collect(),
            candidates: considered,
        };

        let candidates: Vec<FnSignature> = candidates
            .into_iter()
            .filter(|sig| sig.arity() == args.len())
            .collect();
        if candidates.is_empty() {
            return Err(error());
        }

        // A DYNAMIC member cannot be enumerated; neither can a
        // cross-product past the bound. Both degrade to runtime dispatch
        // over every candidate.
        let members: Vec<&[StaticType]> = args.iter().map(|a| a.ty.members()).collect();
        let permutations: usize = members
            .iter()
            .map(|m| m.len())
            .try_fold(1usize, |acc, len| acc.checked_mul(len))
            .unwrap_or(usize::MAX);
        let any_dynamic = members
            .iter()
            .any(|m| m.iter().any(StaticType::is_dynamic));
        if any_dynamic || permutations > MAX_PERMUTATIONS {
            let candidates = candidates
                .into_iter()
                .map(|signature| DynamicCandidate {
                    coercions: vec![None; args.len()],
                    signature,
                })
                .collect();
            return Ok(FnMatch::Dynamic {
                candidates,
                exhaustive: false,
            });
        }

        // Enumerate the cross-product; first matching candidate wins a
        // permutation, identical results are deduplicated across
        // permutations.
        let mut results: Vec<(FnSignature, Vec<Option<StaticType>>)> = Vec::new();
        let mut unmatched = false;
        let mut odometer: SmallVec<[usize; 4]> = SmallVec::from_elem(0, args.len());
        loop {
            let matched = candidates.iter().find_map(|sig| {
                match_permutation(sig, &members, &odometer).map(|mapping| (sig, mapping))
            });
            match matched {
                Some((sig, mapping)) => {
                    if !results.iter().any(|(s, m)| s == sig && *m == mapping) {
                        results.push((sig.clone(), mapping));
                    }
                }
                None => unmatched = true,
            }
            if !advance(&mut odometer, &members) {
                break;
            }
        }

        match results.len() {
            0 => Err(error()),
            1 => {
                let (signature, mapping) = results.swap_remove(0);
                Ok(FnMatch::Static {
                    signature,
                    mapping,
                    missable: unmatched,
                })
            }
            _ => Ok(FnMatch::Dynamic {
                candidates: results
                    .into_iter()
                    .map(|(signature, coercions)| DynamicCandidate {
                        signature,
                        coercions,
                    })
                    .collect(),
                exhaustive: !unmatched,
            }),
        }
    }

    /// Resolve a source-level cast from `source` to `target`
    ///
    /// Unconvertible union members contribute MISSING at runtime; a source
    /// with no convertible member at all is an unknown cast.
    pub fn resolve_cast(
        &self,
        source: &StaticType,
        target: &StaticType,
    ) -> Option<CastResolution> {
        let table = CastTable::get();
        let mut reachable: Vec<StaticType> = Vec::new();
        let mut safety = CastKind::Coercion;
        let mut convertible = false;
        let mut value_member = false;
        for member in source.members() {
            match member {
                StaticType::Null => reachable.push(StaticType::Null),
                StaticType::Missing => reachable.push(StaticType::Missing),
                StaticType::Dynamic => {
                    convertible = true;
                    value_member = true;
                    safety = safety.max(CastKind::Unsafe);
                    reachable.push(target.clone());
                    reachable.push(StaticType::Missing);
                }
                member => {
                    value_member = true;
                    match table.classify(member.kind(), target.kind()) {
                        Some(CastKind::Unsafe) => {
                            convertible = true;
                            safety = CastKind::Unsafe;
                            reachable.push(target.clone());
                            reachable.push(StaticType::Missing);
                        }
                        Some(kind) => {
                            convertible = true;
                            safety = safety.max(kind);
                            reachable.push(target.clone());
                        }
                        None => reachable.push(StaticType::Missing),
                    }
                }
            }
        }
        if value_member && !convertible {
            return None;
        }
        Some(CastResolution {
            safety,
            ty: StaticType::any_of(reachable),
        })
    }
}

/// Match one permutation against one candidate
///
/// A position matches when the member equals the parameter type, the
/// parameter is the universal ANY type, the member is the NULL or MISSING
/// marker (both propagate through the call), or a COERCION-classified
/// cast exists from member to parameter.
fn match_permutation(
    sig: &FnSignature,
    members: &[&[StaticType]],
    odometer: &[usize],
) -> Option<Vec<Option<StaticType>>> {
    let table = CastTable::get();
    let mut mapping = Vec::with_capacity(odometer.len());
    for (position, param) in sig.params.iter().enumerate() {
        let member = &members[position][odometer[position]];
        if *member == param.ty
            || param.ty.is_dynamic()
            || matches!(member, StaticType::Null | StaticType::Missing)
        {
            mapping.push(None);
        } else if table.is_coercion(member.kind(), param.ty.kind()) {
            mapping.push(Some(param.ty.clone()));
        } else {
            return None;
        }
    }
    Some(mapping)
}

fn advance(odometer: &mut [usize], members: &[&[StaticType]]) -> bool {
    for position in (0..odometer.len()).rev() {
        odometer[position] += 1;
        if odometer[position] < members[position].len() {
            return true;
        }
        odometer[position] = 0;
    }
    false
}
