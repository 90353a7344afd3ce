//! # Solver
//!
//! Drives the generational search. A solve seeds a working set from the
//! player's creatures and the catchable species, then runs up to
//! `max_breeding_steps` generations: every generation evaluates the pending
//! parent pairs in parallel and commits the children on the calling thread.
//! The search stops early once a generation changes nothing.
//!
//! ```rust
//! use std::time::Duration;
//! use breedpath::game::{GameCatalog, Gender, InstanceId, OwnedCreature, Species, SpeciesId};
//! use breedpath::solver::{Solver, SolverSettings};
//! use breedpath::target::TargetSpec;
//!
//! let (a, b, c) = (SpeciesId(1), SpeciesId(2), SpeciesId(3));
//! let catalog = GameCatalog::builder()
//!     .species(Species::new(a, "A"))
//!     .species(Species::new(b, "B"))
//!     .species(Species::new(c, "C"))
//!     .rule(a, b, c)
//!     .build()
//!     .unwrap();
//!
//! let settings = SolverSettings::builder().max_breeding_steps(2).max_threads(1).build();
//! let solver = Solver::new(&catalog, settings).with_owned([
//!     OwnedCreature::new(InstanceId(1), a, Gender::Male),
//!     OwnedCreature::new(InstanceId(2), b, Gender::Female),
//! ]);
//!
//! let outcome = solver.solve(&TargetSpec::new(c)).unwrap();
//! assert!(!outcome.cancelled);
//! assert_eq!(outcome.results[0].species(), c);
//! ```

pub mod control;
pub mod pairs;
pub mod settings;
pub mod status;
pub mod working_set;

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::error::{BreedingError, Result};
use crate::evaluator::BatchEvaluator;
use crate::game::{GameCatalog, OwnedCreature, SKILL_CAPACITY};
use crate::pruning::{PruningContext, PruningPipeline};
use crate::reference::{CandidateRef, SharedRef};
use crate::target::TargetSpec;

pub use control::SolverControl;
pub use pairs::PairSpace;
pub use settings::{SolverSettings, SolverSettingsBuilder};
pub use status::{SolverPhase, SolverStatus, StatusCallback};
pub use working_set::{CommitSummary, WorkingSet};

/// What a solve produced.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Lineages satisfying the target, least effort first.
    pub results: Vec<SharedRef>,
    /// Generations committed.
    pub generations_run: usize,
    /// The run was cancelled; `results` are those committed before that.
    pub cancelled: bool,
}

pub struct Solver<'a> {
    catalog: &'a GameCatalog,
    settings: SolverSettings,
    owned: Vec<Arc<OwnedCreature>>,
    control: SolverControl,
    on_status: Option<StatusCallback>,
}

impl<'a> Solver<'a> {
    pub fn new(catalog: &'a GameCatalog, settings: SolverSettings) -> Self {
        Self {
            catalog,
            settings,
            owned: Vec::new(),
            control: SolverControl::new(),
            on_status: None,
        }
    }

    /// Adds creatures the player owns.
    pub fn with_owned(mut self, creatures: impl IntoIterator<Item = OwnedCreature>) -> Self {
        self.owned.extend(creatures.into_iter().map(Arc::new));
        self
    }

    /// Uses `control` instead of a private handle, so the caller can pause or
    /// cancel the run from another thread.
    pub fn with_control(mut self, control: SolverControl) -> Self {
        self.control = control;
        self
    }

    /// Registers a callback for status events.
    pub fn on_status(mut self, callback: impl Fn(&SolverStatus) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Box::new(callback));
        self
    }

    pub fn control(&self) -> SolverControl {
        self.control.clone()
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    fn emit(&self, phase: SolverPhase, current_generation: usize) {
        if let Some(callback) = &self.on_status {
            callback(&SolverStatus {
                phase,
                current_generation,
                target_generations: self.settings.max_breeding_steps(),
                cancelled: self.control.is_cancelled(),
            });
        }
    }

    fn thread_pool(&self) -> Result<Option<ThreadPool>> {
        if self.settings.max_threads() == 1 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.max_threads())
            .thread_name(|index| format!("breedpath-worker-{}", index))
            .build()
            .map(Some)
            .map_err(|e| BreedingError::ThreadPool(e.to_string()))
    }

    /// Generation-0 candidates: owned creatures and catchable species that
    /// can still turn into the target in time.
    fn seeds(&self, target: &TargetSpec) -> Vec<SharedRef> {
        let settings = &self.settings;
        let steps = settings.max_breeding_steps() as u32;
        let reachable = |species| self.catalog.can_reach_within(species, target.species(), steps);

        let mut seeds: Vec<SharedRef> = Vec::new();
        for creature in &self.owned {
            if settings.is_banned(creature.species) || !reachable(creature.species) {
                continue;
            }
            if creature.skills.len() > SKILL_CAPACITY {
                warn!(
                    instance = creature.instance.0,
                    skills = creature.skills.len(),
                    "Skipping owned creature with more skills than a creature can hold"
                );
                continue;
            }
            let candidate = CandidateRef::owned(creature.clone(), target);
            let irrelevant = candidate.skills().random_count();
            if irrelevant > settings.max_input_irrelevant_skills() {
                debug!(
                    instance = creature.instance.0,
                    irrelevant,
                    tolerated = settings.max_input_irrelevant_skills(),
                    "Skipping owned creature with unwanted skills"
                );
                continue;
            }
            seeds.push(Arc::new(candidate));
        }

        if settings.max_wild_participants() > 0 {
            for species in self.catalog.all_species() {
                if !settings.may_catch(species.id) || !reachable(species.id) {
                    continue;
                }
                for random in 0..=settings.max_input_irrelevant_skills() {
                    let Some(wild) = CandidateRef::wild(species, random, settings.game_constants()) else {
                        continue;
                    };
                    if wild.effort() <= settings.max_effort() {
                        seeds.push(Arc::new(wild));
                    }
                }
            }
        }
        seeds
    }

    /// Runs the search for `target`.
    ///
    /// Fails only if the settings or the target are invalid, the worker pool
    /// cannot be built, or a result cannot take the requested gender.
    /// Cancellation is reported through [`SolveOutcome::cancelled`].
    pub fn solve(&self, target: &TargetSpec) -> Result<SolveOutcome> {
        self.settings.validate()?;
        target.validate(self.catalog)?;

        self.emit(SolverPhase::Initializing, 0);
        let pipeline = PruningPipeline::from_kinds(self.settings.pruning_rules());
        let pool = self.thread_pool()?;

        let seeds = self.seeds(target);
        let seed_count = seeds.len();
        let mut working_set = WorkingSet::seed(
            seeds,
            target,
            &pipeline,
            self.settings.optimize_initial_step(),
            &PruningContext::new(&self.control),
        );
        info!(
            target = %target.species(),
            seeds = seed_count,
            population = working_set.population().len(),
            rules = ?pipeline.rule_names(),
            "solve started"
        );

        let evaluator = BatchEvaluator::new(self.catalog, target, &self.settings, &self.control);
        let mut generations_run = 0;
        let mut cancelled = self.control.is_cancelled();

        for generation in 1..=self.settings.max_breeding_steps() {
            if cancelled || working_set.pending_pairs() == 0 {
                break;
            }
            self.emit(SolverPhase::Breeding, generation);
            let fresh = working_set.breed(
                &evaluator,
                generation,
                self.settings.batch_size(),
                pool.as_ref(),
                &self.control,
            );
            let Some(fresh) = fresh else {
                cancelled = true;
                break;
            };

            self.emit(SolverPhase::Simplifying, generation);
            if self.control.is_cancelled() {
                cancelled = true;
                break;
            }
            let summary = working_set.commit(fresh, target, &pipeline, &PruningContext::detached());
            generations_run = generation;
            debug!(
                generation,
                offered = summary.offered,
                added = summary.added,
                removed = summary.removed,
                population = working_set.population().len(),
                results = working_set.results().len(),
                "generation committed"
            );

            if summary.added == 0 && !summary.results_changed {
                debug!(generation, "fixed point reached");
                break;
            }
        }

        let results = self.finish(&working_set, &pipeline, target)?;
        self.emit(SolverPhase::Finished, generations_run);
        info!(
            results = results.len(),
            generations = generations_run,
            cancelled,
            "solve finished"
        );

        Ok(SolveOutcome {
            results,
            generations_run,
            cancelled,
        })
    }

    /// Applies the global rules and resolves undecided genders.
    fn finish(&self, working_set: &WorkingSet, pipeline: &PruningPipeline, target: &TargetSpec) -> Result<Vec<SharedRef>> {
        let mut results = working_set.final_results(pipeline);
        if let Some(gender) = target.gender() {
            results = results
                .into_iter()
                .map(|result| {
                    if result.gender().is_concrete() {
                        Ok(result)
                    } else {
                        result.with_guaranteed_gender(gender).map(Arc::new)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            results.sort_by_cached_key(|result| result.rank_key());
        }
        Ok(results)
    }
}

impl fmt::Debug for Solver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("settings", &self.settings)
            .field("owned", &self.owned.len())
            .field("control", &self.control)
            .field("on_status", &self.on_status.is_some())
            .finish()
    }
}
