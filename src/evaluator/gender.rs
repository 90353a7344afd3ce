//! Gender assignment for a parent pair.
//!
//! Undecided (wildcard) parents are specialized to whichever gender makes the
//! pair cheapest. Concrete parents keep their gender; pairing one against its
//! gender costs a gender-reversal aid.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::game::species::Gender;
use crate::reference::{FarmSettings, SharedRef};

/// Parents ready to breed, in the order they were given.
#[derive(Debug, Clone)]
pub struct ResolvedPair {
    pub first: SharedRef,
    pub second: SharedRef,
    /// Aids needed for this step alone.
    pub reversals: usize,
}

/// `parent` playing `gender`, plus the aids that takes.
fn assign(parent: &SharedRef, gender: Gender) -> Option<(SharedRef, usize)> {
    let current = parent.gender();
    if current == gender {
        return Some((parent.clone(), 0));
    }
    if current.is_concrete() {
        return gender.is_concrete().then(|| (parent.clone(), 1));
    }
    parent
        .with_guaranteed_gender(gender)
        .ok()
        .map(|specialized| (Arc::new(specialized), 0))
}

/// Picks the cheapest gender assignment for `first` x `second`.
///
/// `required` is the (first, second) gender pair an outcome insists on, if
/// any. Assignments needing more than `reversal_budget` aids are ruled out.
/// Returns `None` when no assignment is allowed.
pub fn resolve(
    first: &SharedRef,
    second: &SharedRef,
    required: Option<(Gender, Gender)>,
    reversal_budget: usize,
    farm: &FarmSettings,
) -> Option<ResolvedPair> {
    let mut options: Vec<(Gender, Gender)> = Vec::with_capacity(3);
    match required {
        Some(pair) => options.push(pair),
        None => {
            options.push((Gender::Male, Gender::Female));
            options.push((Gender::Female, Gender::Male));
            if first.gender() == Gender::Wildcard && second.gender() == Gender::Wildcard {
                options.push((Gender::Wildcard, Gender::OppositeWildcard));
            }
        }
    }

    let mut best: Option<(Duration, ResolvedPair)> = None;
    for (first_gender, second_gender) in options {
        let compatible = first_gender.is_compatible(second_gender);
        debug_assert!(
            compatible,
            "gender assignment {:?}/{:?} cannot breed",
            first_gender, second_gender
        );
        if !compatible {
            warn!(?first_gender, ?second_gender, "skipping incompatible gender assignment");
            continue;
        }

        let Some((first_parent, first_aids)) = assign(first, first_gender) else {
            continue;
        };
        let Some((second_parent, second_aids)) = assign(second, second_gender) else {
            continue;
        };
        let reversals = first_aids + second_aids;
        if reversals > reversal_budget {
            continue;
        }

        let effort = farm.compose(Duration::ZERO, first_parent.effort(), second_parent.effort());
        let better = best.as_ref().map_or(true, |(best_effort, best_pair)| {
            (effort, reversals) < (*best_effort, best_pair.reversals)
        });
        if better {
            best = Some((
                effort,
                ResolvedPair {
                    first: first_parent,
                    second: second_parent,
                    reversals,
                },
            ));
        }
    }
    best.map(|(_, pair)| pair)
}
