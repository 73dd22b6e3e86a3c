// Two-tier resource catalog: complex resources depending on atomic ones

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GeosError, Result};
use crate::sampling::WeightedCoin;
use crate::types::{ResourceId, ResourceKind};

/// Every resource in the world, by id.
pub type Catalog = BTreeMap<ResourceId, Resource>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    /// Atomic resources this one is built from. Always empty for atomic resources.
    dependencies: BTreeSet<ResourceId>,
}

impl Resource {
    pub fn atomic(id: ResourceId) -> Self {
        Self {
            id,
            kind: ResourceKind::Atomic,
            dependencies: BTreeSet::new(),
        }
    }

    pub fn complex(id: ResourceId, dependencies: BTreeSet<ResourceId>) -> Self {
        Self {
            id,
            kind: ResourceKind::Complex,
            dependencies,
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.dependencies.iter().copied()
    }

    pub fn depends_on(&self, other: ResourceId) -> bool {
        self.dependencies.contains(&other)
    }
}

/// Build a catalog of `complex_count` complex and `atomic_count` atomic
/// resources.
///
/// Ids come from one counter: complex resources take `0..complex_count`,
/// atomic ones follow. Each (complex, atomic) pair gets an independent
/// weighted coin flip (`dependency_weights = [no, yes]`) deciding whether
/// the atomic resource is a dependency.
pub fn build_resource_catalog<R: Rng>(
    rng: &mut R,
    complex_count: u32,
    atomic_count: u32,
    dependency_weights: [f64; 2],
) -> Result<Catalog> {
    let coin = WeightedCoin::new(dependency_weights)?;
    let end = complex_count
        .checked_add(atomic_count)
        .ok_or(GeosError::QuantityOverflow("resource count"))?;

    let complex_ids: Vec<ResourceId> = (0..complex_count).map(ResourceId::new).collect();
    let atomic_ids: Vec<ResourceId> = (complex_count..end)
        .map(ResourceId::new)
        .collect();

    let mut catalog = Catalog::new();

    for &id in &complex_ids {
        let dependencies = atomic_ids
            .iter()
            .copied()
            .filter(|_| coin.flip(rng))
            .collect();
        catalog.insert(id, Resource::complex(id, dependencies));
    }

    for &id in &atomic_ids {
        catalog.insert(id, Resource::atomic(id));
    }

    Ok(catalog)
}
