//! # Property grouping index
//!
//! Stores a candidate population grouped by a composite key. Candidates in
//! the same group are interchangeable as breeding inputs, so the pruning
//! pipeline only ever compares members of one group, and "is this new
//! candidate already beaten?" is a single group lookup.
//!
//! Groups are kept in key order, so iteration is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use crate::game::ivs::StatMask;
use crate::game::skills::SkillSet;
use crate::game::species::{Gender, SpeciesId};
use crate::reference::{CandidateRef, SharedRef};

/// Properties that make two candidates interchangeable as parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub species: SpeciesId,
    pub gender: Gender,
    pub skills: SkillSet,
    pub ivs: StatMask,
}

impl GroupKey {
    pub fn of(candidate: &CandidateRef) -> Self {
        Self {
            species: candidate.species(),
            gender: candidate.gender(),
            skills: candidate.skills().clone(),
            ivs: candidate.ivs().relevance(),
        }
    }
}

type KeyFn<K> = Box<dyn Fn(&CandidateRef) -> K + Send + Sync>;

pub struct PropertyGroupingIndex<K: Ord> {
    key_fn: KeyFn<K>,
    groups: BTreeMap<K, Vec<SharedRef>>,
    len: usize,
}

impl PropertyGroupingIndex<GroupKey> {
    /// Index grouped by [`GroupKey`].
    pub fn by_properties() -> Self {
        Self::new(GroupKey::of)
    }
}

impl<K: Ord + Clone> PropertyGroupingIndex<K> {
    pub fn new(key_fn: impl Fn(&CandidateRef) -> K + Send + Sync + 'static) -> Self {
        Self {
            key_fn: Box::new(key_fn),
            groups: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn key_of(&self, candidate: &CandidateRef) -> K {
        (self.key_fn)(candidate)
    }

    pub fn add(&mut self, candidate: SharedRef) {
        let key = self.key_of(&candidate);
        self.groups.entry(key).or_default().push(candidate);
        self.len += 1;
    }

    /// Removes one structurally equal candidate. Returns `false` if none was
    /// present.
    pub fn remove(&mut self, candidate: &CandidateRef) -> bool {
        let key = self.key_of(candidate);
        let Some(group) = self.groups.get_mut(&key) else {
            return false;
        };
        let Some(position) = group.iter().position(|member| member.as_ref() == candidate) else {
            return false;
        };
        group.swap_remove(position);
        if group.is_empty() {
            self.groups.remove(&key);
        }
        self.len -= 1;
        true
    }

    pub fn group(&self, key: &K) -> &[SharedRef] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the members of one group, returning the previous ones.
    pub fn replace_group(&mut self, key: K, members: Vec<SharedRef>) -> Vec<SharedRef> {
        debug_assert!(
            members.iter().all(|member| self.key_of(member) == key),
            "replacement members do not share the group key"
        );
        self.len += members.len();
        let previous = if members.is_empty() {
            self.groups.remove(&key).unwrap_or_default()
        } else {
            self.groups.insert(key, members).unwrap_or_default()
        };
        self.len -= previous.len();
        previous
    }

    /// Runs `reducer` over one group and keeps what it returns.
    pub fn filter<F>(&mut self, key: &K, reducer: F)
    where
        F: FnOnce(Vec<SharedRef>) -> Vec<SharedRef>,
    {
        if let Some(members) = self.groups.remove(key) {
            self.len -= members.len();
            let kept = reducer(members);
            if !kept.is_empty() {
                self.len += kept.len();
                self.groups.insert(key.clone(), kept);
            }
        }
    }

    /// Runs `reducer` over every group.
    pub fn filter_all<F>(&mut self, mut reducer: F)
    where
        F: FnMut(Vec<SharedRef>) -> Vec<SharedRef>,
    {
        let groups = std::mem::take(&mut self.groups);
        self.len = 0;
        for (key, members) in groups {
            let kept = reducer(members);
            if !kept.is_empty() {
                self.len += kept.len();
                self.groups.insert(key, kept);
            }
        }
    }

    /// Returns `true` if nothing in the candidate's group takes less effort.
    pub fn is_optimal(&self, candidate: &CandidateRef) -> bool {
        let key = self.key_of(candidate);
        self.group(&key)
            .iter()
            .all(|member| candidate.effort() <= member.effort())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedRef> + '_ {
        self.groups.values().flatten()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.groups.keys()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl<K: Ord> fmt::Debug for PropertyGroupingIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyGroupingIndex")
            .field("groups", &self.groups.len())
            .field("len", &self.len)
            .finish()
    }
}
