//! # breedpath
//!
//! Plans multi-generation breeding lineages for creature-collection games.
//! Given the creatures a player owns, the species that can be caught and a
//! target (species, heritable skills, minimum IVs, gender), the solver
//! searches repeated pairwise breedings for the lineages that reach the
//! target with the least expected effort.
//!
//! Effort is an expectation, not a simulation: every breeding step costs
//! `ceil(1 / p)` attempts where `p` is the closed-form probability of the
//! wanted outcome.

pub mod error;
pub mod evaluator;
pub mod game;
pub mod grouping;
pub mod pool;
pub mod probability;
pub mod pruning;
pub mod reference;
pub mod solver;
pub mod target;

// Re-export commonly used types for convenience
pub use error::{BreedingError, OptionExt, Result, ResultExt};
pub use game::{GameCatalog, GameConstants, Gender, OwnedCreature, SkillId, Species, SpeciesId};
pub use reference::{CandidateRef, SharedRef};
pub use solver::{SolveOutcome, Solver, SolverControl, SolverSettings, SolverStatus};
pub use target::TargetSpec;
