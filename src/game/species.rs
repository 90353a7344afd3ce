use std::fmt;
use std::time::Duration;

/// Identifier of a species in the breeding catalog.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Gender of a candidate.
///
/// `Wildcard` means "not decided yet": the candidate can be produced as either
/// gender and is specialized lazily once a pairing needs a concrete one.
/// `OppositeWildcard` only appears while resolving a pair of two wildcards and
/// means "whichever gender the partner did not turn out to be".
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Male,
    Female,
    Wildcard,
    OppositeWildcard,
}

impl Gender {
    /// Returns `true` for `Male` and `Female`.
    pub fn is_concrete(self) -> bool {
        matches!(self, Gender::Male | Gender::Female)
    }

    /// Returns the other concrete gender. Wildcards map to themselves.
    pub fn opposite(self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
            other => other,
        }
    }

    /// Two genders can be paired if either side is still undecided or if they differ.
    pub fn is_compatible(self, other: Gender) -> bool {
        !self.is_concrete() || !other.is_concrete() || self != other
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Wildcard => "*",
            Gender::OppositeWildcard => "~",
        };
        f.write_str(symbol)
    }
}

/// Static description of a species.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    /// Probability that a newly produced instance is male.
    pub male_probability: f64,
    /// Expected time to catch one instance in the wild, `None` if the species
    /// cannot be caught.
    pub capture_effort: Option<Duration>,
}

impl Species {
    pub fn new(id: SpeciesId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            male_probability: 0.5,
            capture_effort: None,
        }
    }

    pub fn with_male_probability(mut self, probability: f64) -> Self {
        self.male_probability = probability;
        self
    }

    pub fn with_capture_effort(mut self, effort: Duration) -> Self {
        self.capture_effort = Some(effort);
        self
    }

    /// Probability that a new instance of this species has `gender`.
    ///
    /// `OppositeWildcard` is a coin flip regardless of the species ratio, and
    /// `Wildcard` always succeeds.
    pub fn gender_probability(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.male_probability,
            Gender::Female => 1.0 - self.male_probability,
            Gender::OppositeWildcard => 0.5,
            Gender::Wildcard => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_compatibility() {
        assert!(Gender::Male.is_compatible(Gender::Female));
        assert!(!Gender::Male.is_compatible(Gender::Male));
        assert!(Gender::Wildcard.is_compatible(Gender::Male));
        assert!(Gender::Female.is_compatible(Gender::OppositeWildcard));
        assert!(Gender::Wildcard.is_compatible(Gender::Wildcard));
    }

    #[test]
    fn test_gender_probability() {
        let species = Species::new(SpeciesId(1), "Lamball").with_male_probability(0.25);
        assert_eq!(species.gender_probability(Gender::Male), 0.25);
        assert_eq!(species.gender_probability(Gender::Female), 0.75);
        assert_eq!(species.gender_probability(Gender::OppositeWildcard), 0.5);
        assert_eq!(species.gender_probability(Gender::Wildcard), 1.0);
    }
}
