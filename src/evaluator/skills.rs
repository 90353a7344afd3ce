//! Skill outcomes of one pair.
//!
//! A child is described by the desired skills it is meant to carry (every
//! required skill the parents can pass on, plus some subset of the optional
//! ones they can pass on) and by how many unknown skills may come along.

use crate::game::constants::{GameConstants, SKILL_CAPACITY};
use crate::game::skills::{union_into, SkillId, SkillSet};
use crate::pool::BufferPool;
use crate::probability::skill_inheritance_probability;
use crate::target::TargetSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOutcome {
    pub skills: SkillSet,
    /// Probability that one attempt yields a child carrying every named skill
    /// in `skills` and at most `skills.random_count()` others.
    pub probability: f64,
}

/// Appends every viable skill outcome of `first` x `second` to `out`.
///
/// `max_irrelevant` caps the unknown skills a child may carry. Outcomes with
/// zero probability are left out.
pub fn enumerate_skill_outcomes(
    first: &SkillSet,
    second: &SkillSet,
    target: &TargetSpec,
    max_irrelevant: usize,
    constants: &GameConstants,
    scratch: &BufferPool<SkillId>,
    out: &mut Vec<SkillOutcome>,
) {
    let mut pool = scratch.take();
    union_into(first.skills(), second.skills(), &mut pool);
    let available = pool.len() + first.random_count() + second.random_count();

    let mut base = scratch.take();
    base.extend(
        target
            .required_skills()
            .iter()
            .filter(|skill| pool.binary_search(skill).is_ok()),
    );
    let mut optional = scratch.take();
    optional.extend(
        target
            .optional_skills()
            .iter()
            .filter(|skill| pool.binary_search(skill).is_ok()),
    );
    if base.len() > SKILL_CAPACITY {
        return;
    }

    let mut chosen = scratch.take();
    for mask in 0u32..(1 << optional.len()) {
        let size = base.len() + mask.count_ones() as usize;
        if size > SKILL_CAPACITY {
            continue;
        }
        chosen.clear();
        chosen.extend_from_slice(&base);
        chosen.extend(
            optional
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, skill)| *skill),
        );

        let random = max_irrelevant.min(SKILL_CAPACITY - size);
        let probability: f64 = (size..=size + random)
            .map(|num_final| skill_inheritance_probability(available, size, num_final, constants))
            .sum();
        if probability > 0.0 {
            out.push(SkillOutcome {
                skills: SkillSet::new(chosen.iter().copied(), random),
                probability,
            });
        }
    }
}
