//! Fixed game mechanics the probability engine is built on.

use std::time::Duration;

use super::ivs::NUM_STATS;
use crate::error::{BreedingError, Result};

/// Maximum number of heritable skills a single creature can carry.
pub const SKILL_CAPACITY: usize = 4;

/// Distributions and per-attempt costs of the breeding mechanics.
///
/// All distributions are indexed by count. The defaults are the values the
/// game ships with.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GameConstants {
    /// Probability that the child takes exactly `i` skills from the parents'
    /// combined pool (index 0 is unused: a non-empty pool always passes at least one).
    pub direct_skill_probability: [f64; SKILL_CAPACITY + 1],
    /// Probability that exactly `i` random skills are added on top of the
    /// inherited ones.
    pub random_skill_probability: [f64; SKILL_CAPACITY + 1],
    /// Probability that exactly `i` IVs are taken from the parents.
    pub iv_direct_probability: [f64; NUM_STATS + 1],
    /// Probability that a wild capture carries exactly `i` skills.
    pub wild_skill_count_probability: [f64; SKILL_CAPACITY + 1],
    /// Time spent per breeding attempt (one egg).
    pub effort_per_attempt: Duration,
    /// Resources consumed per breeding attempt.
    pub cost_per_attempt: u64,
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            direct_skill_probability: [0.0, 0.4, 0.3, 0.2, 0.1],
            random_skill_probability: [0.4, 0.3, 0.2, 0.1, 0.0],
            iv_direct_probability: [0.0, 0.3, 0.4, 0.3],
            wild_skill_count_probability: [0.5, 0.3, 0.15, 0.05, 0.0],
            effort_per_attempt: Duration::from_secs(5 * 60),
            cost_per_attempt: 1,
        }
    }
}

impl GameConstants {
    /// Probability that a wild capture carries at most `max_skills` skills.
    pub fn wild_skill_count_at_most(&self, max_skills: usize) -> f64 {
        self.wild_skill_count_probability
            .iter()
            .take(max_skills + 1)
            .sum()
    }

    /// Checks that every distribution is a (sub-)probability distribution.
    pub fn validate(&self) -> Result<()> {
        let distributions: [(&str, &[f64]); 4] = [
            ("direct_skill_probability", &self.direct_skill_probability),
            ("random_skill_probability", &self.random_skill_probability),
            ("iv_direct_probability", &self.iv_direct_probability),
            ("wild_skill_count_probability", &self.wild_skill_count_probability),
        ];

        for (name, values) in distributions {
            if values.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
                return Err(BreedingError::Configuration(format!(
                    "{} contains a value outside [0, 1]",
                    name
                )));
            }
            let total: f64 = values.iter().sum();
            if total > 1.0 + 1e-9 {
                return Err(BreedingError::Configuration(format!(
                    "{} sums to {} (more than 1)",
                    name, total
                )));
            }
        }

        if self.effort_per_attempt.is_zero() {
            return Err(BreedingError::Configuration(
                "effort_per_attempt cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}
