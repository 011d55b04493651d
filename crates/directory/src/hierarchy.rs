//! Supplier hierarchy validation and depth resolution.
//!
//! The directory forms a forest: every unit carries at most one supplier
//! link, factories are always roots, and no chain may loop back on itself.
//! [`SupplierGraph`] captures the full edge set in one snapshot (taken inside
//! the mutating transaction) so every rule is checked against a consistent
//! view of the hierarchy.

use std::collections::HashMap;

use electronet_core::{UnitId, UnitRole};

use crate::error::{DirectoryError, Result, StructuralRule};

/// An in-memory snapshot of the supplier edge set.
///
/// Maps every unit to its supplier link (`None` for roots). The snapshot is
/// cheap to build for a directory-sized table and lets the validator and the
/// depth resolver work without further queries.
#[derive(Debug, Clone)]
pub struct SupplierGraph {
    edges: HashMap<UnitId, Option<UnitId>>,
}

impl SupplierGraph {
    /// Builds a graph from `(unit, supplier)` edge pairs.
    pub fn from_edges(edges: impl IntoIterator<Item = (UnitId, Option<UnitId>)>) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    /// Number of units in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the snapshot holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Upper bound on supplier-chain hops. Any walk that takes more steps
    /// than there are units has revisited a node, which only happens when
    /// the no-cycle invariant is already broken.
    fn walk_bound(&self) -> u64 {
        self.edges.len() as u64
    }

    /// Validates a proposed supplier link for a unit.
    ///
    /// `unit` is `None` when the unit is being created and has no identity
    /// yet. Rules run in a fixed order and the first failure is reported:
    ///
    /// 1. a factory must not have a supplier,
    /// 2. a unit must not supply itself,
    /// 3. the link must not close a cycle through the existing chain.
    ///
    /// A link to a unit absent from the snapshot is [`DirectoryError::NotFound`].
    /// A walk that overruns the unit count is [`DirectoryError::IntegrityBoundExceeded`],
    /// which signals pre-existing corruption rather than a bad request.
    pub fn validate_link(
        &self,
        unit: Option<UnitId>,
        role: UnitRole,
        supplier: Option<UnitId>,
    ) -> Result<()> {
        let Some(supplier) = supplier else {
            return Ok(());
        };
        if role.is_factory() {
            return Err(DirectoryError::Structural(StructuralRule::FactoryWithSupplier));
        }
        if unit == Some(supplier) {
            return Err(DirectoryError::Structural(StructuralRule::SelfReference));
        }

        let bound = self.walk_bound();
        let mut current = supplier;
        let mut hops: u64 = 0;
        loop {
            if unit == Some(current) {
                return Err(DirectoryError::Structural(StructuralRule::SupplyCycle));
            }
            let link = match self.edges.get(&current) {
                Some(link) => *link,
                None if hops == 0 => return Err(DirectoryError::unit_not_found(current)),
                None => {
                    return Err(DirectoryError::DataCorruption(format!(
                        "unit {current} links to a supplier missing from the snapshot"
                    )));
                }
            };
            match link {
                None => return Ok(()),
                Some(next) => {
                    hops += 1;
                    if hops > bound {
                        return Err(DirectoryError::IntegrityBoundExceeded { bound });
                    }
                    current = next;
                }
            }
        }
    }

    /// Resolves a unit's hierarchy level: the number of supplier hops from
    /// the unit to its root. Roots (factories included) are level 0.
    pub fn depth_of(&self, unit: UnitId) -> Result<u32> {
        let mut link = self
            .edges
            .get(&unit)
            .copied()
            .ok_or(DirectoryError::unit_not_found(unit))?;

        let bound = self.walk_bound();
        let mut depth: u32 = 0;
        while let Some(next) = link {
            depth += 1;
            if u64::from(depth) > bound {
                return Err(DirectoryError::IntegrityBoundExceeded { bound });
            }
            link = self.edges.get(&next).copied().ok_or_else(|| {
                DirectoryError::DataCorruption(format!(
                    "unit {next} is referenced as a supplier but missing from the snapshot"
                ))
            })?;
        }
        Ok(depth)
    }
}
