use std::sync::Arc;

use crate::game::owned::{InstanceId, LocationKind, OwnedCreature, PlayerId};
use crate::game::species::SpeciesId;

use super::CandidateRef;

/// An owned creature somewhere in a lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnedLeaf {
    pub instance: InstanceId,
    pub owner: PlayerId,
    pub location: LocationKind,
}

/// Aggregates over a whole lineage, computed once when a reference is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineageStats {
    pub cost: u64,
    pub wild_participants: usize,
    pub breeding_steps: usize,
    pub gender_reversals: usize,
    owned: Arc<[OwnedLeaf]>,
}

impl LineageStats {
    pub(crate) fn owned(creature: &OwnedCreature) -> Self {
        Self {
            cost: 0,
            wild_participants: 0,
            breeding_steps: 0,
            gender_reversals: 0,
            owned: Arc::from(vec![OwnedLeaf {
                instance: creature.instance,
                owner: creature.owner,
                location: creature.location,
            }]),
        }
    }

    pub(crate) fn wild() -> Self {
        Self {
            cost: 0,
            wild_participants: 1,
            breeding_steps: 0,
            gender_reversals: 0,
            owned: Arc::from(Vec::new()),
        }
    }

    /// Stats of a child bred from parents with stats `a` and `b`.
    pub(crate) fn combine(a: &LineageStats, b: &LineageStats, own_cost: u64, reversals: usize) -> Self {
        let mut owned = Vec::with_capacity(a.owned.len() + b.owned.len());
        owned.extend_from_slice(&a.owned);
        owned.extend_from_slice(&b.owned);
        owned.sort_unstable();

        Self {
            cost: a.cost.saturating_add(b.cost).saturating_add(own_cost),
            wild_participants: a.wild_participants + b.wild_participants,
            breeding_steps: a.breeding_steps + b.breeding_steps + 1,
            gender_reversals: a.gender_reversals + b.gender_reversals + reversals,
            owned: Arc::from(owned),
        }
    }

    /// Owned creatures used in the lineage, sorted, with repetitions.
    pub fn owned_leaves(&self) -> &[OwnedLeaf] {
        &self.owned
    }

    /// How many times an owned creature appears beyond its first use.
    pub fn instance_reuse(&self) -> usize {
        self.owned
            .windows(2)
            .filter(|pair| pair[0].instance == pair[1].instance)
            .count()
    }

    /// Number of distinct players whose creatures take part.
    pub fn distinct_owners(&self) -> usize {
        let mut owners: Vec<PlayerId> = self.owned.iter().map(|leaf| leaf.owner).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.len()
    }

    /// Number of owned creatures that have to be fetched from somewhere other
    /// than `location`.
    pub fn leaves_outside(&self, location: LocationKind) -> usize {
        self.owned
            .iter()
            .filter(|leaf| leaf.location != location)
            .count()
    }
}

/// Pre-order walk over a lineage tree, yielding each node with its depth.
pub struct Lineage<'a> {
    stack: Vec<(usize, &'a CandidateRef)>,
}

impl<'a> Lineage<'a> {
    pub(crate) fn new(root: &'a CandidateRef) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }
}

impl<'a> Iterator for Lineage<'a> {
    type Item = (usize, &'a CandidateRef);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        if let Some([first, second]) = node.parents() {
            self.stack.push((depth + 1, second.as_ref()));
            self.stack.push((depth + 1, first.as_ref()));
        }
        Some((depth, node))
    }
}

/// Every species appearing in a lineage, sorted, with repetitions.
pub(crate) fn lineage_species(root: &CandidateRef) -> Vec<SpeciesId> {
    let mut species: Vec<SpeciesId> = Lineage::new(root).map(|(_, node)| node.species()).collect();
    species.sort_unstable();
    species
}
