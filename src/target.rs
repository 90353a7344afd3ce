//! # Target specification
//!
//! What the player wants to end up with: a species, the heritable skills it
//! must carry, the ones that would be nice to have, minimum IVs and optionally
//! a gender.
//!
//! ```rust
//! use breedpath::game::{SkillId, SpeciesId, Stat};
//! use breedpath::target::TargetSpec;
//!
//! let target = TargetSpec::new(SpeciesId(7))
//!     .with_required([SkillId(1), SkillId(2)])
//!     .with_optional([SkillId(3)])
//!     .with_min_iv(Stat::Attack, 80);
//!
//! assert_eq!(target.desired_skills(), &[SkillId(1), SkillId(2), SkillId(3)]);
//! ```

use crate::error::{BreedingError, Result};
use crate::game::constants::SKILL_CAPACITY;
use crate::game::ivs::{IvTarget, Stat, StatMask};
use crate::game::skills::SkillId;
use crate::game::species::{Gender, SpeciesId};
use crate::game::GameCatalog;
use crate::reference::CandidateRef;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    species: SpeciesId,
    required: Vec<SkillId>,
    optional: Vec<SkillId>,
    desired: Vec<SkillId>,
    ivs: IvTarget,
    gender: Option<Gender>,
}

impl TargetSpec {
    pub fn new(species: SpeciesId) -> Self {
        Self {
            species,
            required: Vec::new(),
            optional: Vec::new(),
            desired: Vec::new(),
            ivs: IvTarget::default(),
            gender: None,
        }
    }

    /// Skills the result must carry.
    pub fn with_required(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.required.extend(skills);
        self.normalize();
        self
    }

    /// Skills the result should carry if there is room for them.
    pub fn with_optional(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.optional.extend(skills);
        self.normalize();
        self
    }

    pub fn with_min_iv(mut self, stat: Stat, minimum: u8) -> Self {
        self.ivs = self.ivs.with_minimum(stat, minimum);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    fn normalize(&mut self) {
        self.required.sort_unstable();
        self.required.dedup();
        self.optional.sort_unstable();
        self.optional.dedup();
        let required = &self.required;
        self.optional.retain(|skill| required.binary_search(skill).is_err());
        self.desired = self
            .required
            .iter()
            .chain(self.optional.iter())
            .copied()
            .collect();
        self.desired.sort_unstable();
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    pub fn required_skills(&self) -> &[SkillId] {
        &self.required
    }

    pub fn optional_skills(&self) -> &[SkillId] {
        &self.optional
    }

    /// Required and optional skills, sorted.
    pub fn desired_skills(&self) -> &[SkillId] {
        &self.desired
    }

    pub fn iv_target(&self) -> &IvTarget {
        &self.ivs
    }

    /// Stats whose IV must meet a minimum.
    pub fn iv_mask(&self) -> StatMask {
        self.ivs.mask()
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Rejects targets no search could ever satisfy.
    pub fn validate(&self, catalog: &GameCatalog) -> Result<()> {
        if self.required.len() > SKILL_CAPACITY {
            return Err(BreedingError::Configuration(format!(
                "target requires {} skills but a creature holds at most {}",
                self.required.len(),
                SKILL_CAPACITY
            )));
        }
        if let Some(gender) = self.gender {
            if !gender.is_concrete() {
                return Err(BreedingError::Configuration(format!(
                    "target gender must be Male or Female, got {:?}",
                    gender
                )));
            }
        }
        catalog.require_species(self.species).map_err(|_| {
            BreedingError::Configuration(format!("target species {} is not in the catalog", self.species))
        })?;
        Ok(())
    }

    /// Returns `true` if `candidate` is an instance of what the player asked for.
    /// A still-undecided gender counts as matching; it is resolved on output.
    pub fn is_satisfied_by(&self, candidate: &CandidateRef) -> bool {
        candidate.species() == self.species
            && candidate.skills().contains_all(&self.required)
            && candidate.ivs().relevance().is_superset_of(self.iv_mask())
            && self.gender.map_or(true, |gender| {
                candidate.gender() == gender || !candidate.gender().is_concrete()
            })
    }

    /// A satisfying bred candidate that already carries every optional skill
    /// and has no room left to improve is an end point: breeding it further
    /// cannot help this search.
    pub fn is_terminal(&self, candidate: &CandidateRef) -> bool {
        candidate.is_bred()
            && self.is_satisfied_by(candidate)
            && candidate.skills().contains_all(&self.optional)
            && (candidate.skills().is_full() || candidate.skills().random_count() == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Species;

    #[test]
    fn test_optional_overlapping_required_is_dropped() {
        let target = TargetSpec::new(SpeciesId(1))
            .with_required([SkillId(2)])
            .with_optional([SkillId(2), SkillId(3)]);
        assert_eq!(target.optional_skills(), &[SkillId(3)]);
        assert_eq!(target.desired_skills(), &[SkillId(2), SkillId(3)]);
    }

    #[test]
    fn test_too_many_required_skills() {
        let catalog = GameCatalog::builder()
            .species(Species::new(SpeciesId(1), "one"))
            .build()
            .unwrap();
        let target = TargetSpec::new(SpeciesId(1)).with_required((0..5).map(SkillId));
        match target.validate(&catalog) {
            Err(BreedingError::Configuration(msg)) => assert!(msg.contains("requires 5 skills")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
        assert!(TargetSpec::new(SpeciesId(1)).validate(&catalog).is_ok());
        assert!(TargetSpec::new(SpeciesId(2)).validate(&catalog).is_err());
    }
}
