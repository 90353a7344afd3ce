use super::ivs::NUM_STATS;
use super::skills::SkillId;
use super::species::{Gender, SpeciesId};

/// Identifier of a player owning creatures.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

/// Identifier of one physical creature instance in a save.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// Where an owned creature is stored.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocationKind {
    Party,
    Storage,
    Base,
}

/// A creature from the player's save, as handed over by the save parser.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedCreature {
    pub instance: InstanceId,
    pub species: SpeciesId,
    pub gender: Gender,
    pub skills: Vec<SkillId>,
    pub ivs: [u8; NUM_STATS],
    pub location: LocationKind,
    pub owner: PlayerId,
}

impl OwnedCreature {
    pub fn new(instance: InstanceId, species: SpeciesId, gender: Gender) -> Self {
        Self {
            instance,
            species,
            gender,
            skills: Vec::new(),
            ivs: [0; NUM_STATS],
            location: LocationKind::Storage,
            owner: PlayerId(0),
        }
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }

    pub fn with_ivs(mut self, ivs: [u8; NUM_STATS]) -> Self {
        self.ivs = ivs;
        self
    }

    pub fn with_location(mut self, location: LocationKind) -> Self {
        self.location = location;
        self
    }

    pub fn with_owner(mut self, owner: PlayerId) -> Self {
        self.owner = owner;
        self
    }
}
