//! The working set: population, results and the pairs still to try.
//!
//! Only the coordinating thread mutates a working set. Worker threads read
//! it through [`WorkingSet::breed`], which hands out shared references and
//! collects children; [`WorkingSet::commit`] then merges those children back
//! in once every worker is done.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::debug;

use crate::evaluator::{BatchEvaluator, GenerationState};
use crate::grouping::{GroupKey, PropertyGroupingIndex};
use crate::pruning::{PruningContext, PruningPipeline};
use crate::reference::{CandidateRef, SharedRef};
use crate::target::TargetSpec;

use super::control::SolverControl;
use super::pairs::PairSpace;

/// What one commit changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub offered: usize,
    pub added: usize,
    pub removed: usize,
    pub results_changed: bool,
}

#[derive(Debug)]
pub struct WorkingSet {
    population: PropertyGroupingIndex<GroupKey>,
    results: PropertyGroupingIndex<GroupKey>,
    pending: PairSpace,
}

/// Membership test by identity, for telling committed members from fresh ones.
fn identities(members: &[SharedRef]) -> HashSet<*const CandidateRef> {
    members.iter().map(Arc::as_ptr).collect()
}

/// Merges `fresh` into the matching groups of `index`. Returns the members
/// that entered the index and the number that left it.
fn merge_groups(
    index: &mut PropertyGroupingIndex<GroupKey>,
    fresh: Vec<SharedRef>,
    pipeline: &PruningPipeline,
    context: &PruningContext<'_>,
) -> (Vec<SharedRef>, usize) {
    let mut grouped: BTreeMap<GroupKey, Vec<SharedRef>> = BTreeMap::new();
    for candidate in fresh {
        grouped.entry(index.key_of(&candidate)).or_default().push(candidate);
    }

    let mut added = Vec::new();
    let mut removed = 0;
    for (key, candidates) in grouped {
        let existing = index.group(&key).to_vec();
        let before = identities(&existing);

        let mut combined = existing;
        combined.extend(candidates);
        let kept = pipeline.prune_group(combined, context);

        let after = identities(&kept);
        removed += before.difference(&after).count();
        added.extend(
            kept.iter()
                .filter(|member| !before.contains(&Arc::as_ptr(*member)))
                .cloned(),
        );
        index.replace_group(key, kept);
    }
    (added, removed)
}

impl WorkingSet {
    /// Builds the generation-0 population. Seeds that already satisfy the
    /// target are results as well.
    pub fn seed(
        seeds: Vec<SharedRef>,
        target: &TargetSpec,
        pipeline: &PruningPipeline,
        prune_seeds: bool,
        context: &PruningContext<'_>,
    ) -> Self {
        let mut population = PropertyGroupingIndex::by_properties();
        let mut results = PropertyGroupingIndex::by_properties();
        for seed in seeds {
            if target.is_satisfied_by(&seed) {
                results.add(seed.clone());
            }
            population.add(seed);
        }
        if prune_seeds {
            population.filter_all(|group| pipeline.prune_group(group, context));
        }
        results.filter_all(|group| pipeline.prune_group(group, context));

        let initial: Vec<SharedRef> = population.iter().cloned().collect();
        Self {
            population,
            results,
            pending: PairSpace::new(Vec::new(), initial),
        }
    }

    pub fn population(&self) -> &PropertyGroupingIndex<GroupKey> {
        &self.population
    }

    pub fn results(&self) -> &PropertyGroupingIndex<GroupKey> {
        &self.results
    }

    /// Pairs the next generation will evaluate.
    pub fn pending_pairs(&self) -> usize {
        self.pending.len()
    }

    /// Evaluates every pending pair and returns the children. Returns `None`
    /// if the run was cancelled, in which case nothing from this generation
    /// may be committed.
    pub fn breed(
        &self,
        evaluator: &BatchEvaluator<'_>,
        generation: usize,
        batch_size: usize,
        pool: Option<&ThreadPool>,
        control: &SolverControl,
    ) -> Option<Vec<SharedRef>> {
        let state = GenerationState {
            population: &self.population,
            results: &self.results,
            generation,
        };
        let chunks = self.pending.chunks(batch_size);
        debug!(generation, pairs = self.pending.len(), chunks = chunks.len(), "breeding");

        let run_chunk = |range: Range<usize>| -> Vec<SharedRef> { evaluator.evaluate(self.pending.pairs(range), state).collect() };

        let children: Vec<SharedRef> = match pool {
            Some(pool) if chunks.len() > 1 => pool.install(|| {
                chunks
                    .into_par_iter()
                    .flat_map_iter(run_chunk)
                    .collect()
            }),
            _ => chunks.into_iter().flat_map(run_chunk).collect(),
        };

        if control.is_cancelled() {
            return None;
        }
        Some(children)
    }

    /// Merges a generation's children. Bred candidates that satisfy the
    /// target also enter the results; terminal ones enter only the results.
    /// Pairs for the next generation are the ones involving a new member.
    pub fn commit(
        &mut self,
        fresh: Vec<SharedRef>,
        target: &TargetSpec,
        pipeline: &PruningPipeline,
        context: &PruningContext<'_>,
    ) -> CommitSummary {
        let offered = fresh.len();
        let mut breeding = Vec::with_capacity(fresh.len());
        let mut satisfying = Vec::new();
        for candidate in fresh {
            if target.is_satisfied_by(&candidate) {
                satisfying.push(candidate.clone());
            }
            if !target.is_terminal(&candidate) {
                breeding.push(candidate);
            }
        }

        let (added, removed) = merge_groups(&mut self.population, breeding, pipeline, context);
        let (results_added, results_removed) = merge_groups(&mut self.results, satisfying, pipeline, context);

        let added_ids = identities(&added);
        let existing: Vec<SharedRef> = self
            .population
            .iter()
            .filter(|member| !added_ids.contains(&Arc::as_ptr(*member)))
            .cloned()
            .collect();
        let summary = CommitSummary {
            offered,
            added: added.len(),
            removed,
            results_changed: !results_added.is_empty() || results_removed > 0,
        };
        self.pending = PairSpace::new(existing, added);
        summary
    }

    /// All results, best first, after the global rules.
    pub fn final_results(&self, pipeline: &PruningPipeline) -> Vec<SharedRef> {
        let all: Vec<SharedRef> = self.results.iter().cloned().collect();
        pipeline.prune_results(all, &PruningContext::detached())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::game::{Gender, InstanceId, IvSet, OwnedCreature, SkillSet, SpeciesId};
    use crate::pruning::PruningRuleKind;
    use crate::reference::{BredParams, FarmSettings};

    const A: SpeciesId = SpeciesId(1);
    const B: SpeciesId = SpeciesId(2);
    const C: SpeciesId = SpeciesId(3);

    fn owned(instance: u64, species: SpeciesId, gender: Gender, target: &TargetSpec) -> SharedRef {
        let creature = OwnedCreature::new(InstanceId(instance), species, gender);
        Arc::new(CandidateRef::owned(Arc::new(creature), target))
    }

    fn child(first: &SharedRef, second: &SharedRef, species: SpeciesId) -> SharedRef {
        Arc::new(CandidateRef::bred(BredParams {
            parents: [first.clone(), second.clone()],
            child: species,
            child_male_probability: 0.5,
            skills: SkillSet::empty(),
            ivs: IvSet::random(),
            probability: 0.5,
            reversals: 0,
            farm: FarmSettings {
                effort_per_attempt: Duration::from_secs(60),
                cost_per_attempt: 1,
                parallel: false,
            },
        }))
    }

    fn seeded(target: &TargetSpec) -> (WorkingSet, PruningPipeline, Vec<SharedRef>) {
        let pipeline = PruningPipeline::from_kinds(&PruningRuleKind::default_order());
        let seeds = vec![owned(1, A, Gender::Male, target), owned(5, C, Gender::Female, target)];
        let set = WorkingSet::seed(seeds.clone(), target, &pipeline, true, &PruningContext::detached());
        (set, pipeline, seeds)
    }

    #[test]
    fn test_seed_splits_results() {
        let target = TargetSpec::new(C);
        let (set, _, _) = seeded(&target);
        assert_eq!(set.population().len(), 2);
        assert_eq!(set.results().len(), 1);
        // two fresh members: each with the other and with itself
        assert_eq!(set.pending_pairs(), 3);
    }

    #[test]
    fn test_terminal_children_only_enter_results() {
        let target = TargetSpec::new(C);
        let (mut set, pipeline, seeds) = seeded(&target);

        let terminal = child(&seeds[0], &seeds[1], C);
        assert!(target.is_terminal(&terminal));
        let summary = set.commit(vec![terminal], &target, &pipeline, &PruningContext::detached());

        assert_eq!(summary.offered, 1);
        assert_eq!(summary.added, 0);
        assert!(summary.results_changed);
        assert_eq!(set.population().len(), 2);
        assert_eq!(set.pending_pairs(), 0);
        assert_eq!(set.final_results(&pipeline).len(), 2);
    }

    #[test]
    fn test_new_members_pair_with_everyone() {
        let target = TargetSpec::new(C);
        let (mut set, pipeline, seeds) = seeded(&target);

        let fresh = child(&seeds[0], &seeds[1], B);
        let summary = set.commit(vec![fresh.clone(), fresh], &target, &pipeline, &PruningContext::detached());

        assert_eq!(summary.added, 1);
        assert!(!summary.results_changed);
        assert_eq!(set.population().len(), 3);
        // existing x added, plus the new member with itself
        assert_eq!(set.pending_pairs(), 2 + 1);
    }
}
