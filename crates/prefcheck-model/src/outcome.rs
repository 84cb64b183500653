use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A complete assignment of domain values to preference variables.
///
/// Equality and hashing are defined on the assignment map alone, so two
/// outcomes built in different variable orders compare equal. Completeness
/// and domain membership are checked by
/// [`PreferenceSpecification::validate`](crate::PreferenceSpecification::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct Outcome {
    assignments: BTreeMap<String, String>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment, replacing any previous value of `variable`.
    pub fn with(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.assign(variable, value);
        self
    }

    pub fn assign(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.assignments.insert(variable.into(), value.into());
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.assignments.get(variable).map(String::as_str)
    }

    pub fn contains_variable(&self, variable: &str) -> bool {
        self.assignments.contains_key(variable)
    }

    /// Assignments in variable-name order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assignments
            .iter()
            .map(|(var, val)| (var.as_str(), val.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Variables whose value differs between `self` and `other`.
    ///
    /// A variable assigned in only one of the two outcomes counts as differing.
    pub fn differing_variables<'a>(&'a self, other: &'a Outcome) -> Vec<&'a str> {
        let mut out: Vec<&str> = self
            .assignments
            .iter()
            .filter(|(var, val)| other.assignments.get(*var) != Some(*val))
            .map(|(var, _)| var.as_str())
            .collect();
        for var in other.assignments.keys() {
            if !self.assignments.contains_key(var) {
                out.push(var.as_str());
            }
        }
        out.sort_unstable();
        out
    }

    /// Renders the outcome as a bit string over `variables`, for 0/1 domains.
    ///
    /// Values other than `0`/`false` render as `1`; unassigned variables
    /// render as `?`.
    pub fn binary_encoding<S: AsRef<str>>(&self, variables: &[S]) -> String {
        variables
            .iter()
            .map(|var| match self.get(var.as_ref()) {
                None => '?',
                Some("0") => '0',
                Some(v) if v.eq_ignore_ascii_case("false") => '0',
                Some(_) => '1',
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Outcome {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let assignments = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { assignments }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (var, val)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var}={val}")?;
        }
        write!(f, ")")
    }
}

/// Role of an outcome inside a dominance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "String", into = "String"))]
pub enum OutcomeLabel {
    Better,
    Worse,
}

impl fmt::Display for OutcomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeLabel::Better => write!(f, "BETTER"),
            OutcomeLabel::Worse => write!(f, "WORSE"),
        }
    }
}

impl FromStr for OutcomeLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("better") {
            Ok(OutcomeLabel::Better)
        } else if s.trim().eq_ignore_ascii_case("worse") {
            Ok(OutcomeLabel::Worse)
        } else {
            Err(format!("invalid outcome label '{s}' (expected BETTER or WORSE)"))
        }
    }
}

impl TryFrom<String> for OutcomeLabel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<OutcomeLabel> for String {
    fn from(label: OutcomeLabel) -> Self {
        label.to_string()
    }
}

/// An outcome tagged with auxiliary metadata. The label never takes part in
/// outcome identity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledOutcome {
    pub label: OutcomeLabel,
    pub outcome: Outcome,
}

impl LabeledOutcome {
    pub fn better(outcome: Outcome) -> Self {
        Self {
            label: OutcomeLabel::Better,
            outcome,
        }
    }

    pub fn worse(outcome: Outcome) -> Self {
        Self {
            label: OutcomeLabel::Worse,
            outcome,
        }
    }
}
