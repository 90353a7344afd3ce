//! # Breeding catalog
//!
//! Read-only lookup tables the search consumes: species, the breeding-result
//! table (species x species -> child species, optionally gated on parent
//! genders) and the species -> species minimum breeding distance table.
//!
//! ```rust
//! use breedpath::game::{GameCatalog, Species, SpeciesId};
//!
//! let a = SpeciesId(1);
//! let b = SpeciesId(2);
//! let c = SpeciesId(3);
//! let catalog = GameCatalog::builder()
//!     .species(Species::new(a, "A"))
//!     .species(Species::new(b, "B"))
//!     .species(Species::new(c, "C"))
//!     .rule(a, b, c)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(catalog.min_distance(a, c), Some(1));
//! assert_eq!(catalog.min_distance(c, a), None);
//! ```

use std::collections::HashMap;

use tracing::debug;

use super::species::{Gender, Species, SpeciesId};
use crate::error::{BreedingError, OptionExt, Result};

/// One possible child of a species pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreedingOutcome {
    pub child: SpeciesId,
    /// Genders the (first, second) parent must have for this child, if the
    /// outcome is gender-specific.
    pub parent_genders: Option<(Gender, Gender)>,
}

impl BreedingOutcome {
    fn flipped(self) -> Self {
        Self {
            child: self.child,
            parent_genders: self.parent_genders.map(|(a, b)| (b, a)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameCatalog {
    species: HashMap<SpeciesId, Species>,
    rules: HashMap<(SpeciesId, SpeciesId), Vec<BreedingOutcome>>,
    distances: HashMap<(SpeciesId, SpeciesId), u32>,
}

impl GameCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    /// Like [`GameCatalog::species`], but an unknown id is an error.
    pub fn require_species(&self, id: SpeciesId) -> Result<&Species> {
        self.species(id)
            .ok_or_else_breeding(|| BreedingError::MissingRule(format!("unknown species {}", id)))
    }

    /// All species, in id order.
    pub fn all_species(&self) -> Vec<&Species> {
        let mut all: Vec<&Species> = self.species.values().collect();
        all.sort_by_key(|species| species.id);
        all
    }

    /// Children of breeding `first` with `second`. Gender requirements are
    /// oriented to the argument order.
    pub fn outcomes(
        &self,
        first: SpeciesId,
        second: SpeciesId,
    ) -> impl Iterator<Item = BreedingOutcome> + '_ {
        let flip = first > second;
        let key = if flip { (second, first) } else { (first, second) };
        self.rules
            .get(&key)
            .into_iter()
            .flatten()
            .map(move |outcome| if flip { outcome.flipped() } else { *outcome })
    }

    /// Minimum number of breeding steps needed to turn `from` into `to`.
    pub fn min_distance(&self, from: SpeciesId, to: SpeciesId) -> Option<u32> {
        self.distances.get(&(from, to)).copied()
    }

    /// Returns `true` if `from` can become `to` within `steps` breedings.
    pub fn can_reach_within(&self, from: SpeciesId, to: SpeciesId, steps: u32) -> bool {
        self.min_distance(from, to)
            .is_some_and(|distance| distance <= steps)
    }
}

/// Builder for [`GameCatalog`]. Computes the distance table on `build`.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    species: Vec<Species>,
    rules: Vec<(SpeciesId, SpeciesId, BreedingOutcome)>,
}

impl CatalogBuilder {
    pub fn species(mut self, species: Species) -> Self {
        self.species.push(species);
        self
    }

    /// Breeding `a` with `b` (either gender assignment) can produce `child`.
    pub fn rule(mut self, a: SpeciesId, b: SpeciesId, child: SpeciesId) -> Self {
        self.rules.push((
            a,
            b,
            BreedingOutcome {
                child,
                parent_genders: None,
            },
        ));
        self
    }

    /// Breeding `a` as `a_gender` with `b` as `b_gender` produces `child`.
    pub fn gendered_rule(
        mut self,
        a: SpeciesId,
        a_gender: Gender,
        b: SpeciesId,
        b_gender: Gender,
        child: SpeciesId,
    ) -> Self {
        self.rules.push((
            a,
            b,
            BreedingOutcome {
                child,
                parent_genders: Some((a_gender, b_gender)),
            },
        ));
        self
    }

    pub fn build(self) -> Result<GameCatalog> {
        let species: HashMap<SpeciesId, Species> = self
            .species
            .into_iter()
            .map(|species| (species.id, species))
            .collect();

        let mut rules: HashMap<(SpeciesId, SpeciesId), Vec<BreedingOutcome>> = HashMap::new();
        for (a, b, outcome) in self.rules {
            for id in [a, b, outcome.child] {
                species.get(&id).ok_or_else_breeding(|| {
                    BreedingError::MissingRule(format!("breeding rule references unknown species {}", id))
                })?;
            }
            if let Some((a_gender, b_gender)) = outcome.parent_genders {
                if !a_gender.is_concrete() || !b_gender.is_concrete() || a_gender == b_gender {
                    return Err(BreedingError::Configuration(format!(
                        "breeding rule {} x {} requires genders {:?}/{:?}",
                        a, b, a_gender, b_gender
                    )));
                }
            }
            let (key, outcome) = if a > b {
                ((b, a), outcome.flipped())
            } else {
                ((a, b), outcome)
            };
            let entry = rules.entry(key).or_default();
            if !entry.contains(&outcome) {
                entry.push(outcome);
            }
        }

        let distances = compute_distances(&species, &rules);
        debug!(
            species = species.len(),
            pairs = rules.len(),
            distances = distances.len(),
            "built breeding catalog"
        );

        Ok(GameCatalog {
            species,
            rules,
            distances,
        })
    }
}

/// Relaxes `distance(a, t) = 1 + min distance(child, t)` over every rule until
/// nothing changes.
fn compute_distances(
    species: &HashMap<SpeciesId, Species>,
    rules: &HashMap<(SpeciesId, SpeciesId), Vec<BreedingOutcome>>,
) -> HashMap<(SpeciesId, SpeciesId), u32> {
    let mut ids: Vec<SpeciesId> = species.keys().copied().collect();
    ids.sort_unstable();

    let mut distances: HashMap<(SpeciesId, SpeciesId), u32> =
        ids.iter().map(|id| ((*id, *id), 0)).collect();

    loop {
        let mut changed = false;
        for ((a, b), outcomes) in rules {
            for outcome in outcomes {
                for target in &ids {
                    let Some(child_distance) = distances.get(&(outcome.child, *target)).copied()
                    else {
                        continue;
                    };
                    for parent in [*a, *b] {
                        let entry = distances.entry((parent, *target)).or_insert(u32::MAX);
                        if child_distance + 1 < *entry {
                            *entry = child_distance + 1;
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    distances
}
