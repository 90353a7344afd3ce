use std::collections::BTreeMap;
use std::time::Duration;

use crate::game::owned::LocationKind;
use crate::game::species::SpeciesId;
use crate::reference::SharedRef;

use super::{PruningContext, PruningRule, RuleScope};

/// Keeps every candidate whose `key` equals the smallest key in the set.
///
/// A cancelled run gets its input back: a minimum over part of the set
/// would drop candidates that were never compared.
pub fn keep_minimum_by<K, F>(candidates: Vec<SharedRef>, context: &PruningContext<'_>, key: F) -> Vec<SharedRef>
where
    K: Ord,
    F: Fn(&SharedRef) -> K,
{
    if context.is_cancelled() {
        return candidates;
    }
    let Some(best) = candidates.iter().map(&key).min() else {
        return candidates;
    };
    candidates
        .into_iter()
        .filter(|candidate| key(candidate) == best)
        .collect()
}

/// Least effort; ties go to fewer gender-reversal aids, then lower cost.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumEffort;

impl PruningRule for MinimumEffort {
    fn name(&self) -> &'static str {
        "minimum-effort"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| -> (Duration, usize, u64) {
            (c.effort(), c.gender_reversals(), c.cost())
        })
    }
}

/// Fewest repeated uses of the same owned creature.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumReuse;

impl PruningRule for MinimumReuse {
    fn name(&self) -> &'static str {
        "minimum-reuse"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| c.stats().instance_reuse())
    }
}

/// Fewest owned creatures that live somewhere other than `location`.
#[derive(Debug, Clone, Copy)]
pub struct PreferredLocation {
    location: LocationKind,
}

impl PreferredLocation {
    pub fn new(location: LocationKind) -> Self {
        Self { location }
    }
}

impl PruningRule for PreferredLocation {
    fn name(&self) -> &'static str {
        "preferred-location"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| c.stats().leaves_outside(self.location))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumBreedingSteps;

impl PruningRule for MinimumBreedingSteps {
    fn name(&self) -> &'static str {
        "minimum-breeding-steps"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| c.breeding_steps())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumWildParticipants;

impl PruningRule for MinimumWildParticipants {
    fn name(&self) -> &'static str {
        "minimum-wild-participants"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| c.wild_participants())
    }
}

/// Fewest distinct players contributing creatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumOwners;

impl PruningRule for MinimumOwners {
    fn name(&self) -> &'static str {
        "minimum-owners"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        keep_minimum_by(candidates, context, |c| c.stats().distinct_owners())
    }
}

/// Drops results whose lineage mostly repeats the species of a better
/// result.
///
/// Two lineages share the species they have in common, counted with
/// repetitions; the overlap is that count over the size of the smaller
/// lineage. Candidates are visited best-first and kept unless their overlap
/// with an already kept one exceeds `max_shared_fraction`.
#[derive(Debug, Clone, Copy)]
pub struct Diversity {
    max_shared_fraction: f64,
}

impl Diversity {
    pub fn new(max_shared_fraction: f64) -> Self {
        Self {
            max_shared_fraction: max_shared_fraction.clamp(0.0, 1.0),
        }
    }

    fn overlap(a: &BTreeMap<SpeciesId, usize>, a_len: usize, b: &BTreeMap<SpeciesId, usize>, b_len: usize) -> f64 {
        let shared: usize = a
            .iter()
            .filter_map(|(species, count)| b.get(species).map(|other| (*count).min(*other)))
            .sum();
        let smaller = a_len.min(b_len).max(1);
        shared as f64 / smaller as f64
    }
}

fn species_counts(candidate: &SharedRef) -> (BTreeMap<SpeciesId, usize>, usize) {
    let species = candidate.lineage_species();
    let len = species.len();
    let mut counts = BTreeMap::new();
    for id in species {
        *counts.entry(id).or_insert(0) += 1;
    }
    (counts, len)
}

impl PruningRule for Diversity {
    fn name(&self) -> &'static str {
        "diversity"
    }

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        let mut kept: Vec<SharedRef> = Vec::with_capacity(candidates.len());
        let mut kept_counts: Vec<(BTreeMap<SpeciesId, usize>, usize)> = Vec::new();

        for candidate in candidates {
            if context.is_cancelled() {
                break;
            }
            let (counts, len) = species_counts(&candidate);
            let too_similar = kept_counts
                .iter()
                .any(|(other, other_len)| Self::overlap(&counts, len, other, *other_len) > self.max_shared_fraction);
            if !too_similar {
                kept_counts.push((counts, len));
                kept.push(candidate);
            }
        }
        kept
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Global
    }
}

/// Keeps at most `limit` results.
#[derive(Debug, Clone, Copy)]
pub struct ResultLimit {
    limit: usize,
}

impl ResultLimit {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl PruningRule for ResultLimit {
    fn name(&self) -> &'static str {
        "result-limit"
    }

    fn apply(&self, mut candidates: Vec<SharedRef>, _context: &PruningContext<'_>) -> Vec<SharedRef> {
        candidates.truncate(self.limit);
        candidates
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Global
    }
}
