//! # Game data
//!
//! Types describing the game the solver plans for: species and genders,
//! heritable skills, IVs, the breeding catalog, the game's fixed probability
//! constants, and owned-creature records handed over by the save parser.

pub mod catalog;
pub mod constants;
pub mod ivs;
pub mod owned;
pub mod skills;
pub mod species;

pub use catalog::{BreedingOutcome, CatalogBuilder, GameCatalog};
pub use constants::{GameConstants, SKILL_CAPACITY};
pub use ivs::{IvSet, IvTarget, IvValue, Stat, StatMask, NUM_STATS};
pub use owned::{InstanceId, LocationKind, OwnedCreature, PlayerId};
pub use skills::{SkillId, SkillSet};
pub use species::{Gender, Species, SpeciesId};
