//! Outcome collections.
//!
//! The reasoners use ordered and unordered groups of outcomes for three
//! different jobs, and each job gets its own type:
//!
//! - [`Trace`]: an ordered walk through the induced preference graph. Adjacent
//!   outcomes differ in at least one variable.
//! - [`Level`]: one rank of a weak order. Unordered and duplicate-free.
//! - [`ExclusionSet`]: outcomes removed from every subsequent oracle query.

use std::fmt;

use indexmap::IndexSet;

use crate::errors::ValidationError;
use crate::outcome::Outcome;

/// An ordered path of outcomes, as reconstructed from an oracle witness.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "Vec<Outcome>", into = "Vec<Outcome>"))]
pub struct Trace {
    outcomes: Vec<Outcome>,
}

impl Trace {
    /// Builds a trace, rejecting empty input and adjacent repeats.
    pub fn new(outcomes: Vec<Outcome>) -> Result<Self, ValidationError> {
        if outcomes.is_empty() {
            return Err(ValidationError::EmptyTrace);
        }
        if let Some(position) = outcomes.windows(2).position(|w| w[0] == w[1]) {
            return Err(ValidationError::StutterInTrace { position });
        }
        Ok(Self { outcomes })
    }

    /// Builds a trace from a walk that may stay on the same outcome for
    /// several steps; consecutive repeats are merged.
    pub fn from_walk(walk: impl IntoIterator<Item = Outcome>) -> Result<Self, ValidationError> {
        let mut outcomes: Vec<Outcome> = walk.into_iter().collect();
        outcomes.dedup();
        Self::new(outcomes)
    }

    pub fn single(outcome: Outcome) -> Self {
        Self {
            outcomes: vec![outcome],
        }
    }

    pub fn first(&self) -> &Outcome {
        &self.outcomes[0]
    }

    pub fn last(&self) -> &Outcome {
        &self.outcomes[self.outcomes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Always false; traces hold at least one outcome.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn contains(&self, outcome: &Outcome) -> bool {
        self.outcomes.contains(outcome)
    }

    /// True when the walk returns to where it started.
    pub fn is_cycle(&self) -> bool {
        self.outcomes.len() > 1 && self.first() == self.last()
    }

    /// The distinct outcomes visited, in first-visit order.
    pub fn distinct(&self) -> Level {
        self.outcomes.iter().cloned().collect()
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}

impl TryFrom<Vec<Outcome>> for Trace {
    type Error = ValidationError;

    fn try_from(outcomes: Vec<Outcome>) -> Result<Self, Self::Error> {
        Trace::new(outcomes)
    }
}

impl From<Trace> for Vec<Outcome> {
    fn from(trace: Trace) -> Self {
        trace.outcomes
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

/// One level of a weak order: outcomes that are mutually non-dominating or
/// mutually cyclic. Equality ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct Level {
    outcomes: IndexSet<Outcome>,
}

impl Level {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the outcome was already present.
    pub fn insert(&mut self, outcome: Outcome) -> bool {
        self.outcomes.insert(outcome)
    }

    pub fn extend<'a>(&mut self, outcomes: impl IntoIterator<Item = &'a Outcome>) {
        self.outcomes.extend(outcomes.into_iter().cloned());
    }

    pub fn contains(&self, outcome: &Outcome) -> bool {
        self.outcomes.contains(outcome)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    /// Union of `self` and `other`, keeping `self`'s outcomes first.
    pub fn union(&self, other: &Level) -> Level {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    /// Bit-string rendering of every outcome, for 0/1 specifications.
    pub fn binary_encoding<S: AsRef<str>>(&self, variables: &[S]) -> String {
        let encoded: Vec<String> = self
            .outcomes
            .iter()
            .map(|o| o.binary_encoding(variables))
            .collect();
        encoded.join(" ")
    }
}

impl FromIterator<Outcome> for Level {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Level {
    type Item = &'a Outcome;
    type IntoIter = indexmap::set::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl IntoIterator for Level {
    type Item = Outcome;
    type IntoIter = indexmap::set::IntoIter<Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{outcome}")?;
        }
        write!(f, "}}")
    }
}

/// Outcomes removed from the model. Every oracle query of a session replays
/// the full set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct ExclusionSet {
    outcomes: IndexSet<Outcome>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(&mut self, outcome: Outcome) -> bool {
        self.outcomes.insert(outcome)
    }

    pub fn exclude_all<'a>(&mut self, outcomes: impl IntoIterator<Item = &'a Outcome>) {
        self.outcomes.extend(outcomes.into_iter().cloned());
    }

    pub fn is_excluded(&self, outcome: &Outcome) -> bool {
        self.outcomes.contains(outcome)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, Outcome> {
        self.outcomes.iter()
    }
}

impl FromIterator<Outcome> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExclusionSet {
    type Item = &'a Outcome;
    type IntoIter = indexmap::set::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
