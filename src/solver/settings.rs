//! # SolverSettings
//!
//! Budgets and toggles for one solve. Every field has a default; the builder
//! only needs the ones that differ.
//!
//! ```rust
//! use std::time::Duration;
//! use breedpath::game::SpeciesId;
//! use breedpath::solver::SolverSettings;
//!
//! let settings = SolverSettings::builder()
//!     .max_breeding_steps(4)
//!     .max_effort(Duration::from_secs(6 * 3600))
//!     .banned_species([SpeciesId(13)])
//!     .build();
//!
//! assert_eq!(settings.max_breeding_steps(), 4);
//! assert!(settings.is_banned(SpeciesId(13)));
//! assert!(settings.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use std::fs::File;
#[cfg(feature = "serde")]
use std::io::{BufReader, Read, Write};
#[cfg(feature = "serde")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "serde")]
use crate::error::ResultExt;
use crate::error::{BreedingError, Result};
use crate::game::constants::{GameConstants, SKILL_CAPACITY};
use crate::game::species::SpeciesId;
use crate::pruning::PruningRuleKind;
use crate::reference::FarmSettings;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    /// Generations to run.
    max_breeding_steps: usize,
    max_wild_participants: usize,
    /// Unwanted or unknown skills tolerated on seeds, owned and wild alike.
    /// Defaults to 0, so an owned creature carrying any skill the target does
    /// not ask for is left out unless this is raised.
    max_input_irrelevant_skills: usize,
    /// Unknown skills tolerated on bred candidates.
    max_bred_irrelevant_skills: usize,
    max_effort: Duration,
    /// Worker threads; 0 lets rayon decide.
    max_threads: usize,
    max_cost: u64,
    max_gender_reversals: usize,
    /// Optional cap on breeding steps within one lineage, all branches counted.
    max_total_breeding_steps: Option<usize>,
    banned_species: Vec<SpeciesId>,
    /// If set, only these species may be caught.
    allowed_wild_species: Option<Vec<SpeciesId>>,
    include_wild: bool,
    parallel_farms: bool,
    /// Drop children beaten by a sibling from the same batch before commit.
    eager_pruning: bool,
    /// Prune the seed population before the first generation.
    optimize_initial_step: bool,
    pruning_rules: Vec<PruningRuleKind>,
    /// Pairs per parallel work item.
    batch_size: usize,
    game_constants: GameConstants,
}

impl SolverSettings {
    pub fn builder() -> SolverSettingsBuilder {
        SolverSettingsBuilder::default()
    }

    pub fn max_breeding_steps(&self) -> usize {
        self.max_breeding_steps
    }

    pub fn max_wild_participants(&self) -> usize {
        self.max_wild_participants
    }

    pub fn max_input_irrelevant_skills(&self) -> usize {
        self.max_input_irrelevant_skills
    }

    pub fn max_bred_irrelevant_skills(&self) -> usize {
        self.max_bred_irrelevant_skills
    }

    pub fn max_effort(&self) -> Duration {
        self.max_effort
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    pub fn max_cost(&self) -> u64 {
        self.max_cost
    }

    pub fn max_gender_reversals(&self) -> usize {
        self.max_gender_reversals
    }

    pub fn max_total_breeding_steps(&self) -> Option<usize> {
        self.max_total_breeding_steps
    }

    pub fn banned_species(&self) -> &[SpeciesId] {
        &self.banned_species
    }

    pub fn is_banned(&self, species: SpeciesId) -> bool {
        self.banned_species.contains(&species)
    }

    pub fn allowed_wild_species(&self) -> Option<&[SpeciesId]> {
        self.allowed_wild_species.as_deref()
    }

    /// Returns `true` if `species` may be caught for this solve.
    pub fn may_catch(&self, species: SpeciesId) -> bool {
        self.include_wild
            && !self.is_banned(species)
            && self
                .allowed_wild_species
                .as_ref()
                .map_or(true, |allowed| allowed.contains(&species))
    }

    pub fn include_wild(&self) -> bool {
        self.include_wild
    }

    pub fn parallel_farms(&self) -> bool {
        self.parallel_farms
    }

    pub fn eager_pruning(&self) -> bool {
        self.eager_pruning
    }

    pub fn optimize_initial_step(&self) -> bool {
        self.optimize_initial_step
    }

    pub fn pruning_rules(&self) -> &[PruningRuleKind] {
        &self.pruning_rules
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn game_constants(&self) -> &GameConstants {
        &self.game_constants
    }

    pub fn farm(&self) -> FarmSettings {
        FarmSettings {
            effort_per_attempt: self.game_constants.effort_per_attempt,
            cost_per_attempt: self.game_constants.cost_per_attempt,
            parallel: self.parallel_farms,
        }
    }

    /// Rejects settings no search could run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BreedingError::Configuration(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_effort.is_zero() {
            return Err(BreedingError::Configuration(
                "max_effort must be greater than zero".to_string(),
            ));
        }
        for (name, value) in [
            ("max_input_irrelevant_skills", self.max_input_irrelevant_skills),
            ("max_bred_irrelevant_skills", self.max_bred_irrelevant_skills),
        ] {
            if value > SKILL_CAPACITY {
                return Err(BreedingError::Configuration(format!(
                    "{} is {} but a creature holds at most {} skills",
                    name, value, SKILL_CAPACITY
                )));
            }
        }
        for rule in &self.pruning_rules {
            match rule {
                PruningRuleKind::Diversity { max_shared_fraction }
                    if !(0.0..=1.0).contains(max_shared_fraction) =>
                {
                    return Err(BreedingError::Configuration(format!(
                        "diversity fraction {} is outside [0, 1]",
                        max_shared_fraction
                    )));
                }
                PruningRuleKind::ResultLimit(0) => {
                    return Err(BreedingError::Configuration(
                        "result limit must be at least 1".to_string(),
                    ));
                }
                _ => {}
            }
        }
        self.game_constants.validate()
    }

    /// Reads settings from JSON and validates them.
    #[cfg(feature = "serde")]
    pub fn from_json_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        let settings: SolverSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads and validates settings from a JSON file.
    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context(format!("opening settings file {}", path.display()))?;
        Self::from_json_reader(BufReader::new(file))
    }

    #[cfg(feature = "serde")]
    pub fn to_json_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        writer
            .write_all(json.as_bytes())
            .context("writing solver settings")?;
        Ok(())
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_breeding_steps: 6,
            max_wild_participants: 2,
            max_input_irrelevant_skills: 0,
            max_bred_irrelevant_skills: 1,
            max_effort: Duration::from_secs(8 * 3600),
            max_threads: 0,
            max_cost: u64::MAX,
            max_gender_reversals: 0,
            max_total_breeding_steps: None,
            banned_species: Vec::new(),
            allowed_wild_species: None,
            include_wild: true,
            parallel_farms: false,
            eager_pruning: true,
            optimize_initial_step: true,
            pruning_rules: PruningRuleKind::default_order(),
            batch_size: 1024,
            game_constants: GameConstants::default(),
        }
    }
}

/// Builder for `SolverSettings`.
///
/// Starts from the defaults; each setter overrides one field.
#[derive(Debug, Clone, Default)]
pub struct SolverSettingsBuilder {
    settings: SolverSettings,
}

impl SolverSettingsBuilder {
    pub fn max_breeding_steps(mut self, value: usize) -> Self {
        self.settings.max_breeding_steps = value;
        self
    }

    pub fn max_wild_participants(mut self, value: usize) -> Self {
        self.settings.max_wild_participants = value;
        self
    }

    /// Unwanted skills an owned creature may carry and still be used, and the
    /// largest random skill count tried for wild seeds. The default of 0 only
    /// seeds owned creatures whose skills are all wanted by the target.
    pub fn max_input_irrelevant_skills(mut self, value: usize) -> Self {
        self.settings.max_input_irrelevant_skills = value;
        self
    }

    pub fn max_bred_irrelevant_skills(mut self, value: usize) -> Self {
        self.settings.max_bred_irrelevant_skills = value;
        self
    }

    pub fn max_effort(mut self, value: Duration) -> Self {
        self.settings.max_effort = value;
        self
    }

    pub fn max_threads(mut self, value: usize) -> Self {
        self.settings.max_threads = value;
        self
    }

    pub fn max_cost(mut self, value: u64) -> Self {
        self.settings.max_cost = value;
        self
    }

    pub fn max_gender_reversals(mut self, value: usize) -> Self {
        self.settings.max_gender_reversals = value;
        self
    }

    pub fn max_total_breeding_steps(mut self, value: usize) -> Self {
        self.settings.max_total_breeding_steps = Some(value);
        self
    }

    pub fn banned_species(mut self, species: impl IntoIterator<Item = SpeciesId>) -> Self {
        self.settings.banned_species.extend(species);
        self.settings.banned_species.sort_unstable();
        self.settings.banned_species.dedup();
        self
    }

    pub fn allowed_wild_species(mut self, species: impl IntoIterator<Item = SpeciesId>) -> Self {
        let mut allowed: Vec<SpeciesId> = species.into_iter().collect();
        allowed.sort_unstable();
        allowed.dedup();
        self.settings.allowed_wild_species = Some(allowed);
        self
    }

    pub fn include_wild(mut self, value: bool) -> Self {
        self.settings.include_wild = value;
        self
    }

    pub fn parallel_farms(mut self, value: bool) -> Self {
        self.settings.parallel_farms = value;
        self
    }

    pub fn eager_pruning(mut self, value: bool) -> Self {
        self.settings.eager_pruning = value;
        self
    }

    pub fn optimize_initial_step(mut self, value: bool) -> Self {
        self.settings.optimize_initial_step = value;
        self
    }

    pub fn pruning_rules(mut self, rules: Vec<PruningRuleKind>) -> Self {
        self.settings.pruning_rules = rules;
        self
    }

    pub fn batch_size(mut self, value: usize) -> Self {
        self.settings.batch_size = value;
        self
    }

    pub fn game_constants(mut self, constants: GameConstants) -> Self {
        self.settings.game_constants = constants;
        self
    }

    pub fn build(self) -> SolverSettings {
        self.settings
    }
}
