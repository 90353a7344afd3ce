use std::time::Duration;

use crate::game::ivs::IvSet;
use crate::game::skills::SkillSet;
use crate::game::species::{Gender, SpeciesId};
use crate::probability::expected_attempts;

use super::{gender_probability, CandidateRef, LineageStats, RefKind, SharedRef};

/// How breeding attempts are paid for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmSettings {
    pub effort_per_attempt: Duration,
    pub cost_per_attempt: u64,
    /// Parents are raised on separate farms at the same time, so only the
    /// slower of the two lineages counts.
    pub parallel: bool,
}

impl FarmSettings {
    /// Total effort of a child whose own attempts take `own` on top of
    /// parents taking `first` and `second`.
    pub fn compose(&self, own: Duration, first: Duration, second: Duration) -> Duration {
        let parents = if self.parallel {
            first.max(second)
        } else {
            first.saturating_add(second)
        };
        own.saturating_add(parents)
    }

    fn attempt_effort(&self, attempts: u64) -> Duration {
        u32::try_from(attempts)
            .ok()
            .and_then(|attempts| self.effort_per_attempt.checked_mul(attempts))
            .unwrap_or(Duration::MAX)
    }
}

/// Everything needed to build a bred reference.
#[derive(Debug, Clone)]
pub struct BredParams {
    pub parents: [SharedRef; 2],
    pub child: SpeciesId,
    pub child_male_probability: f64,
    pub skills: SkillSet,
    pub ivs: IvSet,
    /// Probability that one attempt yields this exact outcome.
    pub probability: f64,
    /// Gender-reversal aids used by this breeding step alone.
    pub reversals: usize,
    pub farm: FarmSettings,
}

#[derive(Debug, Clone)]
pub struct BredRef {
    parents: [SharedRef; 2],
    probability: f64,
    attempts: u64,
    self_effort: Duration,
    male_probability: f64,
    reversals: usize,
    farm: FarmSettings,
}

impl BredRef {
    pub fn parents(&self) -> &[SharedRef; 2] {
        &self.parents
    }

    /// Probability of the outcome per attempt, gender requirement included.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Effort of this breeding step alone, without the parents.
    pub fn self_effort(&self) -> Duration {
        self.self_effort
    }

    pub fn reversals(&self) -> usize {
        self.reversals
    }

    /// Parent hashes in a fixed order, so (a, b) and (b, a) agree.
    pub(crate) fn parent_hashes(&self) -> (u64, u64) {
        let a = self.parents[0].structural_hash();
        let b = self.parents[1].structural_hash();
        (a.min(b), a.max(b))
    }

    /// Same step, repeated until the child has `gender`.
    pub(crate) fn specialize(&self, node: &CandidateRef, gender: Gender) -> CandidateRef {
        let probability = self.probability * gender_probability(self.male_probability, gender);
        build(
            self.parents.clone(),
            node.species(),
            gender,
            node.skills().clone(),
            *node.ivs(),
            probability,
            self.male_probability,
            self.reversals,
            self.farm,
        )
    }
}

impl CandidateRef {
    /// Child of `params.parents`. Its gender is left undecided.
    pub fn bred(params: BredParams) -> CandidateRef {
        build(
            params.parents,
            params.child,
            Gender::Wildcard,
            params.skills,
            params.ivs,
            params.probability,
            params.child_male_probability,
            params.reversals,
            params.farm,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    parents: [SharedRef; 2],
    species: SpeciesId,
    gender: Gender,
    skills: SkillSet,
    ivs: IvSet,
    probability: f64,
    male_probability: f64,
    reversals: usize,
    farm: FarmSettings,
) -> CandidateRef {
    debug_assert!(
        skills.len() <= crate::game::SKILL_CAPACITY,
        "bred skill set {} exceeds capacity",
        skills
    );

    let attempts = expected_attempts(probability);
    let self_effort = farm.attempt_effort(attempts);
    let effort = farm.compose(self_effort, parents[0].effort(), parents[1].effort());
    let own_cost = attempts.saturating_mul(farm.cost_per_attempt);
    let stats = LineageStats::combine(parents[0].stats(), parents[1].stats(), own_cost, reversals);

    CandidateRef::assemble(
        species,
        gender,
        skills,
        ivs,
        effort,
        stats,
        RefKind::Bred(BredRef {
            parents,
            probability,
            attempts,
            self_effort,
            male_probability,
            reversals,
            farm,
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::game::{GameConstants, Species};

    fn wild(id: u32, capture_secs: u64) -> SharedRef {
        let species = Species::new(SpeciesId(id), "wild").with_capture_effort(Duration::from_secs(capture_secs));
        Arc::new(CandidateRef::wild(&species, 4, &GameConstants::default()).unwrap())
    }

    fn child(first: SharedRef, second: SharedRef, parallel: bool) -> CandidateRef {
        CandidateRef::bred(BredParams {
            parents: [first, second],
            child: SpeciesId(9),
            child_male_probability: 0.5,
            skills: SkillSet::empty(),
            ivs: IvSet::random(),
            probability: 0.25,
            reversals: 0,
            farm: FarmSettings {
                effort_per_attempt: Duration::from_secs(10),
                cost_per_attempt: 3,
                parallel,
            },
        })
    }

    #[test]
    fn test_sequential_effort_sums_parents() {
        let (a, b) = (wild(1, 100), wild(2, 300));
        let bred = child(a.clone(), b.clone(), false);
        assert_eq!(bred.effort(), Duration::from_secs(40) + a.effort() + b.effort());
        assert_eq!(bred.cost(), 12);
        assert_eq!(bred.breeding_steps(), 1);
        assert_eq!(bred.wild_participants(), 2);
    }

    #[test]
    fn test_parallel_effort_takes_slowest_parent() {
        let (a, b) = (wild(1, 100), wild(2, 300));
        let bred = child(a.clone(), b.clone(), true);
        assert_eq!(bred.effort(), Duration::from_secs(40) + a.effort().max(b.effort()));
    }

    #[test]
    fn test_parent_order_does_not_matter() {
        let (a, b) = (wild(1, 100), wild(2, 300));
        let ab = child(a.clone(), b.clone(), false);
        let ba = child(b, a, false);
        assert_eq!(ab, ba);
        assert_eq!(ab.structural_hash(), ba.structural_hash());
    }

    #[test]
    fn test_gender_specialization_repeats_own_step_only() {
        let (a, b) = (wild(1, 100), wild(2, 300));
        let bred = child(a.clone(), b.clone(), false);
        let female = bred.with_guaranteed_gender(Gender::Female).unwrap();
        // 1 / (0.25 * 0.5) = 8 attempts
        assert_eq!(female.effort(), Duration::from_secs(80) + a.effort() + b.effort());
        assert_eq!(female.gender(), Gender::Female);
        assert_eq!(female.lineage().count(), 3);
        assert_eq!(female.lineage_species(), vec![SpeciesId(1), SpeciesId(2), SpeciesId(9)]);
    }
}
