//! # Batch evaluator
//!
//! Turns a batch of parent pairs into bred children. Evaluation is lazy: a
//! [`BatchEvaluation`] is an iterator that works through its pairs only as
//! children are pulled from it, checking the [`SolverControl`] between pairs
//! so a pause blocks it and a cancellation ends it.
//!
//! For every pair, cheap budget and legality checks run first and reject
//! most pairs outright. A surviving pair is expanded over every child
//! species its breeding rules allow, every skill outcome worth tracking and
//! two IV variants (carrying every achievable relevant IV, or none). A child
//! is only yielded if nothing already committed in its group takes less
//! effort.

pub mod gender;
pub mod skills;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::game::ivs::IvSet;
use crate::game::skills::SkillId;
use crate::game::{BreedingOutcome, GameCatalog};
use crate::grouping::{GroupKey, PropertyGroupingIndex};
use crate::pool::BufferPool;
use crate::probability::probability_inherited_target_ivs;
use crate::reference::{BredParams, CandidateRef, SharedRef};
use crate::solver::control::SolverControl;
use crate::solver::SolverSettings;
use crate::target::TargetSpec;

pub use gender::{resolve, ResolvedPair};
pub use skills::{enumerate_skill_outcomes, SkillOutcome};

/// What a generation is evaluated against. Read-only while workers run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationState<'a> {
    pub population: &'a PropertyGroupingIndex<GroupKey>,
    pub results: &'a PropertyGroupingIndex<GroupKey>,
    /// 1-based index of the generation being produced.
    pub generation: usize,
}

/// Shared, thread-safe evaluator. Holds the per-thread scratch pools, so one
/// instance should live for a whole solve.
#[derive(Debug)]
pub struct BatchEvaluator<'a> {
    catalog: &'a GameCatalog,
    target: &'a TargetSpec,
    settings: &'a SolverSettings,
    control: &'a SolverControl,
    skill_scratch: BufferPool<SkillId>,
    outcome_scratch: BufferPool<SkillOutcome>,
    species_scratch: BufferPool<BreedingOutcome>,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(
        catalog: &'a GameCatalog,
        target: &'a TargetSpec,
        settings: &'a SolverSettings,
        control: &'a SolverControl,
    ) -> Self {
        Self {
            catalog,
            target,
            settings,
            control,
            skill_scratch: BufferPool::new(),
            outcome_scratch: BufferPool::new(),
            species_scratch: BufferPool::new(),
        }
    }

    /// Lazily evaluates `pairs` against `state`.
    pub fn evaluate<'s, I>(&'s self, pairs: I, state: GenerationState<'s>) -> BatchEvaluation<'s, 'a, I>
    where
        I: Iterator<Item = (&'s SharedRef, &'s SharedRef)>,
    {
        BatchEvaluation {
            evaluator: self,
            state,
            pairs,
            pending: Vec::new().into_iter(),
            batch_best: HashMap::new(),
            stopped: false,
        }
    }

    /// Children of one pair, or nothing if the pair is rejected.
    fn evaluate_pair(&self, first: &SharedRef, second: &SharedRef, state: &GenerationState<'_>) -> Vec<SharedRef> {
        let settings = self.settings;
        let farm = settings.farm();

        let used_reversals = first.gender_reversals() + second.gender_reversals();
        let Some(reversal_budget) = settings.max_gender_reversals().checked_sub(used_reversals) else {
            trace!(%first, %second, "skip: gender-reversal budget spent");
            return Vec::new();
        };
        if !first.is_compatible_gender(second.gender()) && reversal_budget == 0 {
            trace!(%first, %second, "skip: same gender");
            return Vec::new();
        }
        if first.wild_participants() + second.wild_participants() > settings.max_wild_participants() {
            trace!(%first, %second, "skip: too many wild participants");
            return Vec::new();
        }
        if let Some(max_steps) = settings.max_total_breeding_steps() {
            if first.breeding_steps() + second.breeding_steps() + 1 > max_steps {
                trace!(%first, %second, "skip: too many breeding steps");
                return Vec::new();
            }
        }
        if first.cost().saturating_add(second.cost()) > settings.max_cost() {
            trace!(%first, %second, "skip: over cost budget");
            return Vec::new();
        }
        if farm.compose(Duration::ZERO, first.effort(), second.effort()) > settings.max_effort() {
            trace!(%first, %second, "skip: over effort budget");
            return Vec::new();
        }
        if first.owned_instance().is_some() && first.owned_instance() == second.owned_instance() {
            trace!(%first, "skip: creature paired with itself");
            return Vec::new();
        }

        let remaining_steps = settings.max_breeding_steps().saturating_sub(state.generation) as u32;
        let target_species = self.target.species();
        let mut outcomes = self.species_scratch.take();
        outcomes.extend(
            self.catalog
                .outcomes(first.species(), second.species())
                .filter(|outcome| outcome.child == target_species || !settings.is_banned(outcome.child))
                .filter(|outcome| {
                    self.catalog
                        .can_reach_within(outcome.child, target_species, remaining_steps)
                }),
        );
        if outcomes.is_empty() {
            trace!(%first, %second, "skip: target unreachable");
            return Vec::new();
        }

        let desired = self.target.desired_skills();
        let carries_useful = |parent: &SharedRef| parent.skills().is_empty() || parent.skills().count_of(desired) > 0;
        if settings.max_bred_irrelevant_skills() == 0 && !carries_useful(first) && !carries_useful(second) {
            trace!(%first, %second, "skip: only unwanted skills to pass on");
            return Vec::new();
        }

        let mut children = Vec::new();
        for outcome in outcomes.iter() {
            let Some(child_species) = self.catalog.species(outcome.child) else {
                continue;
            };
            let Some(pair) = resolve(first, second, outcome.parent_genders, reversal_budget, &farm) else {
                continue;
            };

            let mut skill_outcomes = self.outcome_scratch.take();
            enumerate_skill_outcomes(
                pair.first.skills(),
                pair.second.skills(),
                self.target,
                settings.max_bred_irrelevant_skills(),
                settings.game_constants(),
                &self.skill_scratch,
                &mut skill_outcomes,
            );

            let wanted = self.target.iv_mask();
            let achievable = pair
                .first
                .ivs()
                .relevance()
                .union(pair.second.ivs().relevance())
                .intersection(wanted);
            let iv_variants = if achievable.is_empty() {
                vec![(IvSet::random(), 1.0)]
            } else {
                let carried = IvSet::inherit(pair.first.ivs(), pair.second.ivs(), achievable);
                let p = probability_inherited_target_ivs(
                    pair.first.ivs(),
                    pair.second.ivs(),
                    achievable,
                    settings.game_constants(),
                );
                vec![(carried, p), (IvSet::random(), 1.0)]
            };

            for skill_outcome in skill_outcomes.iter() {
                if !self.control.checkpoint() {
                    return Vec::new();
                }
                for (ivs, iv_probability) in &iv_variants {
                    let probability = skill_outcome.probability * iv_probability;
                    if probability <= 0.0 {
                        continue;
                    }
                    let child = CandidateRef::bred(BredParams {
                        parents: [pair.first.clone(), pair.second.clone()],
                        child: outcome.child,
                        child_male_probability: child_species.male_probability,
                        skills: skill_outcome.skills.clone(),
                        ivs: *ivs,
                        probability,
                        reversals: pair.reversals,
                        farm,
                    });
                    if child.effort() > settings.max_effort() || child.cost() > settings.max_cost() {
                        continue;
                    }
                    let index = if self.target.is_terminal(&child) {
                        state.results
                    } else {
                        state.population
                    };
                    if !index.is_optimal(&child) {
                        continue;
                    }
                    children.push(Arc::new(child));
                }
            }
        }
        children
    }
}

/// Lazy sequence of the children of one batch of pairs.
pub struct BatchEvaluation<'s, 'a, I> {
    evaluator: &'s BatchEvaluator<'a>,
    state: GenerationState<'s>,
    pairs: I,
    pending: std::vec::IntoIter<SharedRef>,
    /// Best effort seen per group within this batch.
    batch_best: HashMap<GroupKey, Duration>,
    stopped: bool,
}

impl<'s, 'a, I> BatchEvaluation<'s, 'a, I> {
    /// `true` if the batch ended because the run was cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.stopped
    }

    fn beaten_in_batch(&mut self, child: &CandidateRef) -> bool {
        if !self.evaluator.settings.eager_pruning() {
            return false;
        }
        let effort = child.effort();
        let best = self.batch_best.entry(GroupKey::of(child)).or_insert(effort);
        if effort > *best {
            return true;
        }
        *best = effort;
        false
    }
}

impl<'s, 'a, I> Iterator for BatchEvaluation<'s, 'a, I>
where
    I: Iterator<Item = (&'s SharedRef, &'s SharedRef)>,
{
    type Item = SharedRef;

    fn next(&mut self) -> Option<SharedRef> {
        loop {
            if self.stopped {
                return None;
            }
            while let Some(child) = self.pending.next() {
                if !self.beaten_in_batch(&child) {
                    return Some(child);
                }
            }
            if !self.evaluator.control.checkpoint() {
                self.stopped = true;
                return None;
            }
            let (first, second) = self.pairs.next()?;
            self.pending = self
                .evaluator
                .evaluate_pair(first, second, &self.state)
                .into_iter();
        }
    }
}
