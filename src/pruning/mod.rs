//! # Pruning and ranking
//!
//! A pruning pipeline reduces a set of candidates that share a group key to
//! the ones worth keeping. It always starts by ordering the set by
//! [`CandidateRef::rank_key`] and collapsing structurally equivalent entries
//! (same [`CandidateRef::canonical_key`]) to their best representative; then
//! every configured rule runs in order, each one only ever narrowing the set.
//!
//! Rules come in two scopes. [`RuleScope::Group`] rules run on every key
//! group, both in the working population and in the result list.
//! [`RuleScope::Global`] rules (diversity, result cap) only make sense across
//! the final result list and run once, when the solver finishes.
//!
//! ```rust
//! use breedpath::pruning::{PruningContext, PruningPipeline, PruningRuleKind};
//!
//! let pipeline = PruningPipeline::from_kinds(&[
//!     PruningRuleKind::MinimumEffort,
//!     PruningRuleKind::MinimumBreedingSteps,
//!     PruningRuleKind::ResultLimit(10),
//! ]);
//! assert_eq!(pipeline.rule_names(), vec!["minimum-effort", "minimum-breeding-steps", "result-limit"]);
//!
//! let kept = pipeline.prune_group(Vec::new(), &PruningContext::detached());
//! assert!(kept.is_empty());
//! ```

pub mod rules;

use std::collections::HashSet;
use std::fmt::Debug;

use tracing::trace;

use crate::game::owned::LocationKind;
use crate::reference::SharedRef;
use crate::solver::control::SolverControl;

pub use rules::{
    Diversity, MinimumBreedingSteps, MinimumEffort, MinimumOwners, MinimumReuse,
    MinimumWildParticipants, PreferredLocation, ResultLimit,
};

/// Where a rule is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Each key group of the population and of the results.
    Group,
    /// The final result list as a whole.
    Global,
}

/// Cancellation state visible to rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruningContext<'a> {
    control: Option<&'a SolverControl>,
}

impl<'a> PruningContext<'a> {
    pub fn new(control: &'a SolverControl) -> Self {
        Self {
            control: Some(control),
        }
    }

    /// A context that is never cancelled.
    pub fn detached() -> Self {
        Self { control: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_some_and(SolverControl::is_cancelled)
    }
}

/// One step of a pruning pipeline.
///
/// `apply` receives the candidates ordered best-first by rank key and must
/// return a subset of them, still in that order. It must be deterministic for
/// a given input and cancellation state. When cancelled part-way, a rule
/// returns either what it has safely kept so far or, if a partial answer
/// would be meaningless, its input unchanged.
pub trait PruningRule: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef>;

    fn scope(&self) -> RuleScope {
        RuleScope::Group
    }
}

/// Serializable description of a rule, used in settings.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum PruningRuleKind {
    MinimumEffort,
    MinimumReuse,
    PreferredLocation(LocationKind),
    MinimumBreedingSteps,
    MinimumWildParticipants,
    MinimumOwners,
    Diversity { max_shared_fraction: f64 },
    ResultLimit(usize),
}

impl PruningRuleKind {
    /// The rule order used when settings do not name one.
    pub fn default_order() -> Vec<PruningRuleKind> {
        vec![
            PruningRuleKind::MinimumEffort,
            PruningRuleKind::MinimumReuse,
            PruningRuleKind::MinimumBreedingSteps,
            PruningRuleKind::MinimumWildParticipants,
        ]
    }

    pub fn build(&self) -> Box<dyn PruningRule> {
        match self {
            PruningRuleKind::MinimumEffort => Box::new(MinimumEffort),
            PruningRuleKind::MinimumReuse => Box::new(MinimumReuse),
            PruningRuleKind::PreferredLocation(location) => Box::new(PreferredLocation::new(*location)),
            PruningRuleKind::MinimumBreedingSteps => Box::new(MinimumBreedingSteps),
            PruningRuleKind::MinimumWildParticipants => Box::new(MinimumWildParticipants),
            PruningRuleKind::MinimumOwners => Box::new(MinimumOwners),
            PruningRuleKind::Diversity { max_shared_fraction } => {
                Box::new(Diversity::new(*max_shared_fraction))
            }
            PruningRuleKind::ResultLimit(limit) => Box::new(ResultLimit::new(*limit)),
        }
    }
}

/// Ordered list of rules plus the canonical-key dedup that always runs first.
#[derive(Debug, Default)]
pub struct PruningPipeline {
    rules: Vec<Box<dyn PruningRule>>,
}

impl PruningPipeline {
    pub fn new(rules: Vec<Box<dyn PruningRule>>) -> Self {
        Self { rules }
    }

    pub fn from_kinds(kinds: &[PruningRuleKind]) -> Self {
        Self::new(kinds.iter().map(PruningRuleKind::build).collect())
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Reduces one key group to the candidates worth keeping.
    pub fn prune_group(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        self.run(candidates, context, RuleScope::Group)
    }

    /// Reduces the complete result list.
    pub fn prune_results(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>) -> Vec<SharedRef> {
        self.run(candidates, context, RuleScope::Global)
    }

    fn run(&self, candidates: Vec<SharedRef>, context: &PruningContext<'_>, scope: RuleScope) -> Vec<SharedRef> {
        let mut candidates = canonicalize(candidates);
        for rule in self.rules.iter().filter(|rule| rule.scope() == scope) {
            if candidates.len() <= 1 && scope == RuleScope::Group {
                break;
            }
            let before = candidates.len();
            candidates = rule.apply(candidates, context);
            debug_assert!(candidates.len() <= before, "rule {} grew its input", rule.name());
            trace!(rule = rule.name(), before, after = candidates.len(), "pruned");
        }
        candidates
    }
}

/// Orders candidates best-first and keeps one per canonical key.
pub fn canonicalize(mut candidates: Vec<SharedRef>) -> Vec<SharedRef> {
    candidates.sort_by_cached_key(|candidate| candidate.rank_key());
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates.retain(|candidate| seen.insert(candidate.canonical_key()));
    candidates
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::game::{GameConstants, Species, SpeciesId};
    use crate::reference::CandidateRef;

    fn wild(capture_secs: u64) -> SharedRef {
        let species = Species::new(SpeciesId(1), "wild").with_capture_effort(Duration::from_secs(capture_secs));
        Arc::new(CandidateRef::wild(&species, 0, &GameConstants::default()).unwrap())
    }

    #[test]
    fn test_canonicalize_collapses_equivalents() {
        let kept = canonicalize(vec![wild(20), wild(10), wild(10)]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].effort(), Duration::from_secs(20));
    }

    #[test]
    fn test_default_pipeline_keeps_cheapest() {
        let pipeline = PruningPipeline::from_kinds(&PruningRuleKind::default_order());
        let kept = pipeline.prune_group(vec![wild(30), wild(10), wild(20)], &PruningContext::detached());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].effort(), Duration::from_secs(20));
    }

    #[test]
    fn test_global_rules_skip_groups() {
        let pipeline = PruningPipeline::from_kinds(&[PruningRuleKind::ResultLimit(1)]);
        let context = PruningContext::detached();
        assert_eq!(pipeline.prune_group(vec![wild(30), wild(10)], &context).len(), 2);
        assert_eq!(pipeline.prune_results(vec![wild(30), wild(10)], &context).len(), 1);
    }
}
