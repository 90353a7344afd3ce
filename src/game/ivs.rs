//! Genetic quality (IV) values.
//!
//! Every creature has one IV per [`Stat`]. The search never cares about the
//! exact number, only whether it meets the target's minimum for that stat.

use std::fmt;

/// Number of stats carrying an IV.
pub const NUM_STATS: usize = 3;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
}

impl Stat {
    pub const ALL: [Stat; NUM_STATS] = [Stat::Hp, Stat::Attack, Stat::Defense];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A set of stats packed in a bitmask.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatMask(u8);

impl StatMask {
    pub const NONE: StatMask = StatMask(0);

    pub fn with(self, stat: Stat) -> Self {
        StatMask(self.0 | (1 << stat.index()))
    }

    pub fn contains(self, stat: Stat) -> bool {
        self.0 & (1 << stat.index()) != 0
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Stat> {
        Stat::ALL.into_iter().filter(move |stat| self.contains(*stat))
    }

    /// Returns `true` if every stat in `other` is also in `self`.
    pub fn is_superset_of(self, other: StatMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: StatMask) -> StatMask {
        StatMask(self.0 | other.0)
    }

    pub fn intersection(self, other: StatMask) -> StatMask {
        StatMask(self.0 & other.0)
    }
}

/// The IV of one stat as far as the search knows it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IvValue {
    /// Unknown, or not inherited from either parent.
    Random,
    /// Known, but below the target minimum (or the stat is not wanted).
    Irrelevant(u8),
    /// Known and meeting the target minimum.
    Relevant(u8),
    /// Meets the target minimum; the exact value depends on which parent it
    /// was inherited from.
    Range { min: u8, max: u8 },
}

impl IvValue {
    pub fn is_relevant(self) -> bool {
        matches!(self, IvValue::Relevant(_) | IvValue::Range { .. })
    }

    fn bounds(self) -> Option<(u8, u8)> {
        match self {
            IvValue::Relevant(value) => Some((value, value)),
            IvValue::Range { min, max } => Some((min, max)),
            _ => None,
        }
    }

    /// The value a child carries for this stat when it is inherited from a
    /// relevant parent, whichever parent that is.
    pub fn merge(a: IvValue, b: IvValue) -> IvValue {
        match (a.bounds(), b.bounds()) {
            (Some((a_min, a_max)), Some((b_min, b_max))) => {
                let (min, max) = (a_min.min(b_min), a_max.max(b_max));
                if min == max {
                    IvValue::Relevant(min)
                } else {
                    IvValue::Range { min, max }
                }
            }
            (Some(_), None) => a,
            (None, Some(_)) => b,
            (None, None) => IvValue::Random,
        }
    }
}

/// Minimum IV per stat requested by a target. `None` means the stat does not matter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IvTarget {
    pub minimums: [Option<u8>; NUM_STATS],
}

impl IvTarget {
    pub fn with_minimum(mut self, stat: Stat, minimum: u8) -> Self {
        self.minimums[stat.index()] = Some(minimum);
        self
    }

    /// The stats the target cares about.
    pub fn mask(&self) -> StatMask {
        Stat::ALL
            .into_iter()
            .filter(|stat| self.minimums[stat.index()].is_some())
            .fold(StatMask::NONE, StatMask::with)
    }
}

/// The IVs of a candidate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IvSet {
    values: [IvValue; NUM_STATS],
}

impl Default for IvSet {
    fn default() -> Self {
        Self::random()
    }
}

impl IvSet {
    pub fn new(values: [IvValue; NUM_STATS]) -> Self {
        Self { values }
    }

    /// All stats unknown.
    pub fn random() -> Self {
        Self {
            values: [IvValue::Random; NUM_STATS],
        }
    }

    /// Classifies the concrete IVs of an owned creature against `target`.
    pub fn effective(actual: &[u8; NUM_STATS], target: &IvTarget) -> Self {
        let mut values = [IvValue::Random; NUM_STATS];
        for stat in Stat::ALL {
            let value = actual[stat.index()];
            values[stat.index()] = match target.minimums[stat.index()] {
                Some(minimum) if value >= minimum => IvValue::Relevant(value),
                _ => IvValue::Irrelevant(value),
            };
        }
        Self { values }
    }

    pub fn get(&self, stat: Stat) -> IvValue {
        self.values[stat.index()]
    }

    /// The relevance signature: which stats meet the target.
    pub fn relevance(&self) -> StatMask {
        Stat::ALL
            .into_iter()
            .filter(|stat| self.get(*stat).is_relevant())
            .fold(StatMask::NONE, StatMask::with)
    }

    /// The child's IVs when every stat in `carried` is inherited from a
    /// relevant parent and all others are left to chance.
    pub fn inherit(a: &IvSet, b: &IvSet, carried: StatMask) -> Self {
        let mut values = [IvValue::Random; NUM_STATS];
        for stat in carried.iter() {
            values[stat.index()] = IvValue::merge(a.get(stat), b.get(stat));
        }
        Self { values }
    }
}

impl fmt::Display for IvSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|value| match value {
                IvValue::Random => "?".to_string(),
                IvValue::Irrelevant(_) => "-".to_string(),
                IvValue::Relevant(v) => v.to_string(),
                IvValue::Range { min, max } => format!("{}-{}", min, max),
            })
            .collect();
        write!(f, "{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_classification() {
        let target = IvTarget::default().with_minimum(Stat::Attack, 80);
        let ivs = IvSet::effective(&[95, 90, 10], &target);
        assert_eq!(ivs.get(Stat::Hp), IvValue::Irrelevant(95));
        assert_eq!(ivs.get(Stat::Attack), IvValue::Relevant(90));
        assert_eq!(ivs.relevance(), StatMask::NONE.with(Stat::Attack));
    }

    #[test]
    fn test_merge_widens_range() {
        assert_eq!(
            IvValue::merge(IvValue::Relevant(90), IvValue::Range { min: 85, max: 88 }),
            IvValue::Range { min: 85, max: 90 }
        );
        assert_eq!(
            IvValue::merge(IvValue::Relevant(90), IvValue::Irrelevant(3)),
            IvValue::Relevant(90)
        );
        assert_eq!(
            IvValue::merge(IvValue::Random, IvValue::Irrelevant(3)),
            IvValue::Random
        );
    }

    #[test]
    fn test_inherit_only_carried_stats() {
        let a = IvSet::new([IvValue::Relevant(90), IvValue::Relevant(91), IvValue::Random]);
        let b = IvSet::new([IvValue::Irrelevant(2), IvValue::Relevant(95), IvValue::Random]);
        let carried = StatMask::NONE.with(Stat::Attack);
        let child = IvSet::inherit(&a, &b, carried);
        assert_eq!(child.get(Stat::Hp), IvValue::Random);
        assert_eq!(child.get(Stat::Attack), IvValue::Range { min: 91, max: 95 });
        assert_eq!(child.relevance(), carried);
    }
}
