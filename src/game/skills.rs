use std::fmt;

use super::constants::SKILL_CAPACITY;

/// Identifier of a heritable (passive) skill.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillId(pub u16);

/// The heritable skills of a candidate.
///
/// Only skills the search cares about are stored by identity; every other
/// skill (an irrelevant named skill, or an unknown one) is a *random
/// placeholder*. Placeholders are interchangeable, so the set keeps only their
/// count. Both kinds occupy a slot of the per-creature capacity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillSet {
    skills: Vec<SkillId>,
    random: usize,
}

impl SkillSet {
    /// Builds a canonical set: named skills sorted and deduplicated.
    pub fn new(skills: impl IntoIterator<Item = SkillId>, random: usize) -> Self {
        let mut skills: Vec<SkillId> = skills.into_iter().collect();
        skills.sort_unstable();
        skills.dedup();
        Self { skills, random }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A set holding only `random` placeholders.
    pub fn unknown(random: usize) -> Self {
        Self {
            skills: Vec::new(),
            random,
        }
    }

    /// Builds the set a search sees for a creature carrying `actual`: skills in
    /// `desired` keep their identity, the rest become random placeholders.
    /// `desired` must be sorted.
    pub fn effective(actual: &[SkillId], desired: &[SkillId]) -> Self {
        let mut skills = Vec::with_capacity(actual.len());
        let mut random = 0;
        for skill in actual {
            if desired.binary_search(skill).is_ok() {
                skills.push(*skill);
            } else {
                random += 1;
            }
        }
        Self::new(skills, random)
    }

    /// Named skills, sorted.
    pub fn skills(&self) -> &[SkillId] {
        &self.skills
    }

    /// Number of random placeholders.
    pub fn random_count(&self) -> usize {
        self.random
    }

    /// Total number of occupied slots.
    pub fn len(&self) -> usize {
        self.skills.len() + self.random
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= SKILL_CAPACITY
    }

    pub fn contains(&self, skill: SkillId) -> bool {
        self.skills.binary_search(&skill).is_ok()
    }

    pub fn contains_all(&self, skills: &[SkillId]) -> bool {
        skills.iter().all(|skill| self.contains(*skill))
    }

    /// Number of skills in `other` this set carries.
    pub fn count_of(&self, other: &[SkillId]) -> usize {
        other.iter().filter(|skill| self.contains(**skill)).count()
    }
}

impl fmt::Display for SkillSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for skill in &self.skills {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", skill.0)?;
            first = false;
        }
        for _ in 0..self.random {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str("?")?;
            first = false;
        }
        f.write_str("]")
    }
}

/// Merges two sorted, deduplicated skill slices into `out` (cleared first).
pub(crate) fn union_into(a: &[SkillId], b: &[SkillId], out: &mut Vec<SkillId>) {
    out.clear();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}
