//! # Candidate references
//!
//! A [`CandidateRef`] is one creature the search considers: one the player
//! already owns, one that can be caught in the wild, or one bred from two
//! other references. Bred references own their parents, so a reference is the
//! root of a binary lineage tree.
//!
//! References are immutable. Everything derived from the lineage (effort,
//! cost, participant counts, the structural hash) is computed once, bottom-up,
//! when the reference is built. Equality and hashing are structural: two
//! lineages built separately from equivalent parts are equal.
//!
//! ```rust
//! use std::sync::Arc;
//! use breedpath::game::{Gender, InstanceId, OwnedCreature, SpeciesId};
//! use breedpath::reference::CandidateRef;
//! use breedpath::target::TargetSpec;
//!
//! let target = TargetSpec::new(SpeciesId(1));
//! let creature = Arc::new(OwnedCreature::new(InstanceId(1), SpeciesId(1), Gender::Male));
//! let owned = CandidateRef::owned(creature, &target);
//!
//! assert!(owned.effort().is_zero());
//! assert!(owned.with_guaranteed_gender(Gender::Female).is_err());
//! ```

pub mod bred;
pub mod lineage;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BreedingError, Result};
use crate::game::constants::GameConstants;
use crate::game::ivs::{IvSet, StatMask};
use crate::game::owned::{InstanceId, OwnedCreature};
use crate::game::skills::SkillSet;
use crate::game::species::{Gender, Species, SpeciesId};
use crate::target::TargetSpec;

pub use bred::{BredParams, BredRef, FarmSettings};
pub use lineage::{Lineage, LineageStats, OwnedLeaf};

/// References are shared between the population, the results and the
/// lineages of their children.
pub type SharedRef = Arc<CandidateRef>;

/// Variant-specific part of a reference.
#[derive(Debug, Clone)]
pub enum RefKind {
    /// From the player's inventory. Costs nothing to use.
    Owned(Arc<OwnedCreature>),
    /// Not owned yet; has to be caught.
    Wild(WildRef),
    /// Produced by breeding two other references.
    Bred(BredRef),
}

#[derive(Debug, Clone)]
pub struct WildRef {
    /// Expected capture time for an instance with at most the tolerated
    /// number of random skills, before any gender requirement.
    base_effort: Duration,
    male_probability: f64,
}

impl WildRef {
    pub fn base_effort(&self) -> Duration {
        self.base_effort
    }
}

/// Structural identity used to collapse equivalent references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub species: SpeciesId,
    pub gender: Gender,
    pub skills: SkillSet,
    pub ivs: StatMask,
    pub effort: Duration,
    pub cost: u64,
    pub origin: Origin,
}

/// Where a reference comes from. Owned creatures are distinct physical
/// instances; wild and bred references are interchangeable when everything
/// else matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Owned(InstanceId),
    Wild,
    Bred,
}

/// Total order used wherever candidates are ranked: lower is better.
pub type RankKey = (Duration, usize, u64, usize, usize, u64);

#[derive(Debug, Clone)]
pub struct CandidateRef {
    species: SpeciesId,
    gender: Gender,
    skills: SkillSet,
    ivs: IvSet,
    effort: Duration,
    stats: LineageStats,
    hash: u64,
    kind: RefKind,
}

impl CandidateRef {
    /// Wraps an owned creature, classifying its skills and IVs against `target`.
    pub fn owned(creature: Arc<OwnedCreature>, target: &TargetSpec) -> Self {
        let skills = SkillSet::effective(&creature.skills, target.desired_skills());
        let ivs = IvSet::effective(&creature.ivs, target.iv_target());
        Self::assemble(
            creature.species,
            creature.gender,
            skills,
            ivs,
            Duration::ZERO,
            LineageStats::owned(&creature),
            RefKind::Owned(creature),
        )
    }

    /// A wild instance of `species` carrying at most `random_skills` unknown
    /// skills. `None` if the species cannot be caught.
    pub fn wild(species: &Species, random_skills: usize, constants: &GameConstants) -> Option<Self> {
        let capture = species.capture_effort?;
        let probability = constants.wild_skill_count_at_most(random_skills);
        if probability <= 0.0 {
            return None;
        }
        let base_effort = scale_duration(capture, 1.0 / probability);
        Some(Self::assemble(
            species.id,
            Gender::Wildcard,
            SkillSet::unknown(random_skills),
            IvSet::random(),
            base_effort,
            LineageStats::wild(),
            RefKind::Wild(WildRef {
                base_effort,
                male_probability: species.male_probability,
            }),
        ))
    }

    pub(crate) fn assemble(
        species: SpeciesId,
        gender: Gender,
        skills: SkillSet,
        ivs: IvSet,
        effort: Duration,
        stats: LineageStats,
        kind: RefKind,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        species.hash(&mut hasher);
        gender.hash(&mut hasher);
        skills.hash(&mut hasher);
        ivs.hash(&mut hasher);
        effort.hash(&mut hasher);
        stats.cost.hash(&mut hasher);
        stats.gender_reversals.hash(&mut hasher);
        match &kind {
            RefKind::Owned(creature) => (0u8, creature.instance).hash(&mut hasher),
            RefKind::Wild(_) => 1u8.hash(&mut hasher),
            RefKind::Bred(bred) => (2u8, bred.parent_hashes()).hash(&mut hasher),
        }

        Self {
            species,
            gender,
            skills,
            ivs,
            effort,
            stats,
            hash: hasher.finish(),
            kind,
        }
    }

    /// Resolves an undecided gender to `gender`, paying for the extra
    /// attempts needed to get it.
    ///
    /// `gender` may be `Male`, `Female` or `OppositeWildcard` (a coin flip).
    /// Fails on references whose gender is already decided.
    pub fn with_guaranteed_gender(&self, gender: Gender) -> Result<CandidateRef> {
        if self.gender != Gender::Wildcard {
            return Err(BreedingError::InvariantViolation(format!(
                "cannot specialize {} to {:?}: gender is already {:?}",
                self.species, gender, self.gender
            )));
        }
        if gender == Gender::Wildcard {
            return Err(BreedingError::InvariantViolation(
                "cannot specialize a reference to Wildcard".to_string(),
            ));
        }

        match &self.kind {
            RefKind::Owned(_) => Err(BreedingError::InvariantViolation(format!(
                "owned creature of {} has no fixed gender",
                self.species
            ))),
            RefKind::Wild(wild) => {
                let probability = gender_probability(wild.male_probability, gender);
                let effort = scale_duration(wild.base_effort, 1.0 / probability);
                Ok(Self::assemble(
                    self.species,
                    gender,
                    self.skills.clone(),
                    self.ivs,
                    effort,
                    self.stats.clone(),
                    self.kind.clone(),
                ))
            }
            RefKind::Bred(bred) => Ok(bred.specialize(self, gender)),
        }
    }

    /// `true` if either side is undecided or the genders differ.
    pub fn is_compatible_gender(&self, other: Gender) -> bool {
        self.gender.is_compatible(other)
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    pub fn ivs(&self) -> &IvSet {
        &self.ivs
    }

    /// Expected time needed to obtain this instance, lineage included.
    pub fn effort(&self) -> Duration {
        self.effort
    }

    pub fn cost(&self) -> u64 {
        self.stats.cost
    }

    pub fn wild_participants(&self) -> usize {
        self.stats.wild_participants
    }

    pub fn breeding_steps(&self) -> usize {
        self.stats.breeding_steps
    }

    pub fn gender_reversals(&self) -> usize {
        self.stats.gender_reversals
    }

    pub fn stats(&self) -> &LineageStats {
        &self.stats
    }

    pub fn kind(&self) -> &RefKind {
        &self.kind
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.kind, RefKind::Owned(_))
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.kind, RefKind::Wild(_))
    }

    pub fn is_bred(&self) -> bool {
        matches!(self.kind, RefKind::Bred(_))
    }

    pub fn owned_instance(&self) -> Option<InstanceId> {
        match &self.kind {
            RefKind::Owned(creature) => Some(creature.instance),
            _ => None,
        }
    }

    pub fn parents(&self) -> Option<&[SharedRef; 2]> {
        match &self.kind {
            RefKind::Bred(bred) => Some(bred.parents()),
            _ => None,
        }
    }

    pub fn structural_hash(&self) -> u64 {
        self.hash
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey {
            species: self.species,
            gender: self.gender,
            skills: self.skills.clone(),
            ivs: self.ivs.relevance(),
            effort: self.effort,
            cost: self.stats.cost,
            origin: match &self.kind {
                RefKind::Owned(creature) => Origin::Owned(creature.instance),
                RefKind::Wild(_) => Origin::Wild,
                RefKind::Bred(_) => Origin::Bred,
            },
        }
    }

    pub fn rank_key(&self) -> RankKey {
        (
            self.effort,
            self.stats.gender_reversals,
            self.stats.cost,
            self.stats.breeding_steps,
            self.stats.wild_participants,
            self.hash,
        )
    }

    /// Pre-order walk over this reference and all its ancestors.
    pub fn lineage(&self) -> Lineage<'_> {
        Lineage::new(self)
    }

    /// Every species in the lineage, sorted, with repetitions.
    pub fn lineage_species(&self) -> Vec<SpeciesId> {
        lineage::lineage_species(self)
    }
}

impl PartialEq for CandidateRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.canonical_key() == other.canonical_key()
            && self.stats.gender_reversals == other.stats.gender_reversals
            && match (&self.kind, &other.kind) {
                (RefKind::Bred(a), RefKind::Bred(b)) => a.parent_hashes() == b.parent_hashes(),
                _ => true,
            }
    }
}

impl Eq for CandidateRef {}

impl Hash for CandidateRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for CandidateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.kind {
            RefKind::Owned(_) => "owned",
            RefKind::Wild(_) => "wild",
            RefKind::Bred(_) => "bred",
        };
        write!(
            f,
            "{} {} ({}) skills {} ivs {} effort {:?}",
            label, self.species, self.gender, self.skills, self.ivs, self.effort
        )
    }
}

pub(crate) fn gender_probability(male_probability: f64, gender: Gender) -> f64 {
    match gender {
        Gender::Male => male_probability,
        Gender::Female => 1.0 - male_probability,
        Gender::OppositeWildcard => 0.5,
        Gender::Wildcard => 1.0,
    }
}

/// `duration * factor`, saturating at `Duration::MAX`.
pub(crate) fn scale_duration(duration: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(duration.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}
