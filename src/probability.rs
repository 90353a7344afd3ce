//! # Probability engine
//!
//! Closed-form probabilities of breeding outcomes. Every function here is pure
//! and works on small integer inputs: skill pools of at most two full parents
//! and final skill counts bounded by [`SKILL_CAPACITY`].
//!
//! ## Skills
//!
//! A child first takes `n` skills from the parents' combined pool, where `n`
//! follows [`GameConstants::direct_skill_probability`] (capped at the pool
//! size), then receives `r` random skills following
//! [`GameConstants::random_skill_probability`]. The result is truncated at
//! [`SKILL_CAPACITY`].
//!
//! ```rust
//! use breedpath::game::GameConstants;
//! use breedpath::probability::{choose, skill_inheritance_probability};
//!
//! let constants = GameConstants::default();
//! assert_eq!(choose(8, 4), 70);
//!
//! // two parents without skills: the child has none iff no random skill is added
//! let p = skill_inheritance_probability(0, 0, 0, &constants);
//! assert_eq!(p, constants.random_skill_probability[0]);
//! ```

use crate::game::constants::{GameConstants, SKILL_CAPACITY};
use crate::game::ivs::{IvSet, StatMask, NUM_STATS};
use crate::game::skills::SkillId;

const TRIANGLE_SIZE: usize = 34;

const fn build_triangle() -> [[u64; TRIANGLE_SIZE]; TRIANGLE_SIZE] {
    let mut triangle = [[0u64; TRIANGLE_SIZE]; TRIANGLE_SIZE];
    let mut n = 0;
    while n < TRIANGLE_SIZE {
        triangle[n][0] = 1;
        let mut k = 1;
        while k <= n {
            triangle[n][k] = triangle[n - 1][k - 1] + triangle[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    triangle
}

static PASCAL: [[u64; TRIANGLE_SIZE]; TRIANGLE_SIZE] = build_triangle();

/// Binomial coefficient `n choose k`, `0` when `k > n`.
///
/// Served from a precomputed Pascal triangle; inputs beyond the table fall
/// back to the multiplicative formula.
pub fn choose(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    if n < TRIANGLE_SIZE {
        return PASCAL[n][k];
    }
    let k = k.min(n - k);
    (0..k).fold(1u128, |acc, i| acc * (n - i) as u128 / (i + 1) as u128) as u64
}

fn choose_ratio(numerator: (usize, usize), denominator: (usize, usize)) -> f64 {
    let denominator = choose(denominator.0, denominator.1);
    if denominator == 0 {
        return 0.0;
    }
    choose(numerator.0, numerator.1) as f64 / denominator as f64
}

/// Probability that the random additions bring a child holding `inherited`
/// skills to exactly `num_final`. Additions past the capacity are lost, so
/// reaching the capacity collects the whole tail of the distribution.
fn random_addition_probability(inherited: usize, num_final: usize, constants: &GameConstants) -> f64 {
    if num_final < inherited {
        return 0.0;
    }
    let needed = num_final - inherited;
    if num_final < SKILL_CAPACITY {
        constants
            .random_skill_probability
            .get(needed)
            .copied()
            .unwrap_or(0.0)
    } else {
        constants
            .random_skill_probability
            .iter()
            .skip(needed)
            .sum()
    }
}

/// Probability that a child of parents whose combined pool holds `available`
/// distinct skills ends up with exactly `num_final` skills, `desired` of which
/// are specific skills from that pool.
pub fn skill_inheritance_probability(
    available: usize,
    desired: usize,
    num_final: usize,
    constants: &GameConstants,
) -> f64 {
    debug_assert!(
        available <= 2 * SKILL_CAPACITY,
        "parent pool of {} skills exceeds two full parents",
        available
    );

    if desired > num_final || desired > available || num_final > SKILL_CAPACITY {
        return 0.0;
    }

    if available == 0 {
        return random_addition_probability(0, num_final, constants);
    }

    let mut total = 0.0;
    for requested in 1..=SKILL_CAPACITY {
        let direct = constants.direct_skill_probability[requested];
        if direct == 0.0 {
            continue;
        }
        let inherited = requested.min(available);
        if inherited < desired || inherited > num_final {
            continue;
        }
        let contains_desired = choose_ratio(
            (available - desired, inherited - desired),
            (available, inherited),
        );
        total += direct * contains_desired * random_addition_probability(inherited, num_final, constants);
    }
    total
}

/// Probability that a child of parents with the combined skill pool
/// `parent_skills` ends up with exactly `num_final` skills including every
/// skill of `desired_skills`. Desired skills missing from the pool make the
/// outcome impossible.
pub fn probability_inherited_target_skills(
    parent_skills: &[SkillId],
    desired_skills: &[SkillId],
    num_final: usize,
    constants: &GameConstants,
) -> f64 {
    if !desired_skills
        .iter()
        .all(|skill| parent_skills.contains(skill))
    {
        return 0.0;
    }
    skill_inheritance_probability(
        parent_skills.len(),
        desired_skills.len(),
        num_final,
        constants,
    )
}

/// Probability that every stat in `wanted` is inherited from a parent whose
/// IV for that stat is relevant.
///
/// `k` IVs are inherited (following
/// [`GameConstants::iv_direct_probability`]), picked uniformly among the
/// stats; each inherited stat comes from either parent with equal odds.
/// Stats outside `wanted` never constrain the outcome.
pub fn probability_inherited_target_ivs(
    parent_a: &IvSet,
    parent_b: &IvSet,
    wanted: StatMask,
    constants: &GameConstants,
) -> f64 {
    let required = wanted.count();
    if required == 0 {
        return 1.0;
    }

    let mut from_relevant_parent = 1.0;
    for stat in wanted.iter() {
        let sources = parent_a.get(stat).is_relevant() as u8 + parent_b.get(stat).is_relevant() as u8;
        if sources == 0 {
            return 0.0;
        }
        from_relevant_parent *= sources as f64 / 2.0;
    }

    let inherited: f64 = (required..=NUM_STATS)
        .map(|count| {
            constants.iv_direct_probability[count]
                * choose_ratio((NUM_STATS - required, count - required), (NUM_STATS, count))
        })
        .sum();

    inherited * from_relevant_parent
}

/// Expected number of attempts to observe an outcome of probability `p`.
pub fn expected_attempts(probability: f64) -> u64 {
    if probability <= 0.0 || !probability.is_finite() {
        return u64::MAX;
    }
    let attempts = (1.0 / probability).ceil();
    if attempts >= u64::MAX as f64 {
        u64::MAX
    } else {
        attempts.max(1.0) as u64
    }
}
