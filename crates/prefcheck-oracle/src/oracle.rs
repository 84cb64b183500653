use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use prefcheck_model::{ExclusionSet, Outcome};

use crate::formula::Formula;

/// What a query asks, for logging and backend tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Can one state reach another (dominance, candidate verification).
    Reachability,
    /// Is there no improving cycle through the start state (consistency).
    CycleAbsence,
    /// Is a set of states closed or maximal (next-preferred, cycle extraction).
    Containment,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Reachability => write!(f, "reachability"),
            QueryKind::CycleAbsence => write!(f, "cycle-absence"),
            QueryKind::Containment => write!(f, "containment"),
        }
    }
}

/// A single question posed to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleQuery {
    pub kind: QueryKind,
    /// Short name used in logs and error messages.
    pub label: String,
    pub property: Formula,
}

impl OracleQuery {
    pub fn new(kind: QueryKind, label: impl Into<String>, property: Formula) -> Self {
        Self {
            kind,
            label: label.into(),
            property,
        }
    }
}

/// One state of a witness trace.
///
/// Only the first step is guaranteed to carry a full assignment; later steps
/// list the variables that step asserts, which include every variable in
/// `changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WitnessStep {
    pub assignments: BTreeMap<String, String>,
    pub changed: BTreeSet<String>,
}

impl WitnessStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.assignments.insert(variable.into(), value.into());
        self
    }

    /// Records a change of `variable` to `value` on the step into this state.
    pub fn change(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        let variable = variable.into();
        self.changed.insert(variable.clone());
        self.assignments.insert(variable, value.into());
        self
    }

    /// A step carrying every assignment of `outcome` and no changes.
    pub fn full(outcome: &Outcome) -> Self {
        Self {
            assignments: outcome
                .assignments()
                .map(|(var, val)| (var.to_string(), val.to_string()))
                .collect(),
            changed: BTreeSet::new(),
        }
    }
}

/// A falsifying run reported by the oracle, starting at an initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witness {
    pub steps: Vec<WitnessStep>,
}

impl Witness {
    pub fn new(steps: Vec<WitnessStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of a query: the property holds in every initial state, or it
/// fails and a witness may explain why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub holds: bool,
    pub witness: Option<Witness>,
}

impl Verdict {
    pub fn holds() -> Self {
        Self {
            holds: true,
            witness: None,
        }
    }

    pub fn falsified(witness: Witness) -> Self {
        Self {
            holds: false,
            witness: Some(witness),
        }
    }

    pub fn falsified_without_witness() -> Self {
        Self {
            holds: false,
            witness: None,
        }
    }
}

/// A symbolic verification oracle.
///
/// Implementations own the transition system induced by one preference
/// specification. Every call replays the full exclusion set: excluded
/// outcomes are neither initial states nor successors.
pub trait Oracle {
    type Error: std::error::Error;

    /// Checks `query` in every non-excluded initial state.
    fn verify(
        &mut self,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Verdict, Self::Error>;

    /// Time budget for the next call; `None` lifts any limit. Backends
    /// that cannot bound a call ignore it.
    fn set_timeout(&mut self, _timeout: Option<Duration>) {}

    /// Backend name for logs.
    fn name(&self) -> &str {
        "oracle"
    }
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    type Error = O::Error;

    fn verify(
        &mut self,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Verdict, Self::Error> {
        (**self).verify(query, exclusions)
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) {
        (**self).set_timeout(timeout)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, thiserror::Error)]
    #[error("script exhausted")]
    struct Exhausted;

    /// Replays canned verdicts and records what it was asked.
    struct ScriptedOracle {
        verdicts: VecDeque<Verdict>,
        asked: Vec<(QueryKind, usize)>,
    }

    impl Oracle for ScriptedOracle {
        type Error = Exhausted;

        fn verify(
            &mut self,
            query: &OracleQuery,
            exclusions: &ExclusionSet,
        ) -> Result<Verdict, Self::Error> {
            self.asked.push((query.kind, exclusions.len()));
            self.verdicts.pop_front().ok_or(Exhausted)
        }
    }

    fn drive<O: Oracle>(mut oracle: O, query: &OracleQuery) -> Result<Verdict, O::Error> {
        oracle.verify(query, &ExclusionSet::new())
    }

    #[test]
    fn mutable_reference_forwards_to_the_backend() {
        let mut scripted = ScriptedOracle {
            verdicts: VecDeque::from(vec![Verdict::holds()]),
            asked: Vec::new(),
        };
        let query = OracleQuery::new(QueryKind::CycleAbsence, "consistency", Formula::True);
        let verdict = drive(&mut scripted, &query).expect("scripted verdict");
        assert!(verdict.holds);
        assert_eq!(scripted.asked, vec![(QueryKind::CycleAbsence, 0)]);
        assert!(drive(&mut scripted, &query).is_err());
    }

    #[test]
    fn witness_step_change_records_assignment_and_flag() {
        let step = WitnessStep::new().assign("a", "0").change("b", "1");
        assert_eq!(step.assignments.get("b").map(String::as_str), Some("1"));
        assert!(step.changed.contains("b"));
        assert!(!step.changed.contains("a"));
    }

    #[test]
    fn full_step_copies_every_assignment() {
        let o = Outcome::new().with("x", "1").with("y", "0");
        let step = WitnessStep::full(&o);
        assert_eq!(step.assignments.len(), 2);
        assert!(step.changed.is_empty());
        assert_eq!(QueryKind::Containment.to_string(), "containment");
    }
}
