//! Request and result objects for one-shot dominance and consistency
//! questions.

use std::fmt;
use std::str::FromStr;

use prefcheck_model::{LabeledOutcome, Outcome, OutcomeLabel, Trace};
use serde::{Deserialize, Serialize};

use crate::reasoner::Reasoner;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueryType {
    Dominance,
    Consistency,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Dominance => write!(f, "DOMINANCE"),
            QueryType::Consistency => write!(f, "CONSISTENCY"),
        }
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DOMINANCE" => Ok(QueryType::Dominance),
            "CONSISTENCY" => Ok(QueryType::Consistency),
            _ => Err(format!(
                "invalid query type '{s}' (expected DOMINANCE or CONSISTENCY)"
            )),
        }
    }
}

impl TryFrom<String> for QueryType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QueryType> for String {
    fn from(kind: QueryType) -> Self {
        kind.to_string()
    }
}

/// Answer to a reasoning question. `proof` holds the dominance path or the
/// cycle that refutes consistency; `error` is set when the question could
/// not be answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub holds: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Trace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    pub fn positive(proof: Option<Trace>) -> Self {
        Self {
            holds: true,
            proof,
            error: None,
        }
    }

    pub fn negative() -> Self {
        Self {
            holds: false,
            proof: None,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            holds: false,
            proof: None,
            error: Some(message.into()),
        }
    }

    /// The proof rendered as `(..) -> (..) -> ..`.
    pub fn proof_text(&self) -> Option<String> {
        self.proof.as_ref().map(Trace::to_string)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A self-describing dominance or consistency request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceQuery {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    /// Name of the specification the query is about.
    pub specification: String,
    #[serde(default)]
    pub outcomes: Vec<LabeledOutcome>,
}

impl PreferenceQuery {
    pub fn dominance(specification: impl Into<String>, better: Outcome, worse: Outcome) -> Self {
        Self {
            query_type: QueryType::Dominance,
            specification: specification.into(),
            outcomes: vec![LabeledOutcome::better(better), LabeledOutcome::worse(worse)],
        }
    }

    pub fn consistency(specification: impl Into<String>) -> Self {
        Self {
            query_type: QueryType::Consistency,
            specification: specification.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The single outcome carrying `label`.
    pub fn labeled(&self, label: OutcomeLabel) -> Result<&Outcome, String> {
        let mut matching = self.outcomes.iter().filter(|o| o.label == label);
        match (matching.next(), matching.next()) {
            (Some(found), None) => Ok(&found.outcome),
            (None, _) => Err(format!("dominance query has no {label} outcome")),
            (Some(_), Some(_)) => Err(format!("dominance query has more than one {label} outcome")),
        }
    }

    /// Runs the query. Failures of any kind come back in
    /// [`QueryResult::error`].
    pub fn execute<R: Reasoner + ?Sized>(&self, reasoner: &mut R, session: &mut Session) -> QueryResult {
        let expected = reasoner.specification().name();
        if self.specification != expected {
            return QueryResult::failed(format!(
                "query targets specification '{}' but the reasoner holds '{expected}'",
                self.specification
            ));
        }
        match self.query_type {
            QueryType::Dominance => {
                if self.outcomes.len() != 2 {
                    return QueryResult::failed(format!(
                        "dominance query needs exactly two outcomes, got {}",
                        self.outcomes.len()
                    ));
                }
                let pair = self
                    .labeled(OutcomeLabel::Better)
                    .and_then(|better| Ok((better, self.labeled(OutcomeLabel::Worse)?)));
                match pair {
                    Ok((better, worse)) => reasoner
                        .dominates(session, better, worse)
                        .unwrap_or_else(|e| QueryResult::failed(e.to_string())),
                    Err(message) => QueryResult::failed(message),
                }
            }
            QueryType::Consistency => reasoner
                .is_consistent(session)
                .unwrap_or_else(|e| QueryResult::failed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn o(x: &str) -> Outcome {
        Outcome::new().with("x", x)
    }

    #[test]
    fn query_type_parses_case_insensitively() {
        assert_eq!("dominance".parse::<QueryType>(), Ok(QueryType::Dominance));
        assert_eq!("Consistency".parse::<QueryType>(), Ok(QueryType::Consistency));
        assert!("ordering".parse::<QueryType>().is_err());
    }

    #[test]
    fn json_labels_are_case_insensitive() {
        let json = r#"{
            "type": "dominance",
            "specification": "s",
            "outcomes": [
                {"label": "better", "outcome": {"x": "1"}},
                {"label": "Worse", "outcome": {"x": "0"}}
            ]
        }"#;
        let query = PreferenceQuery::from_json(json).expect("valid query");
        assert_eq!(query, PreferenceQuery::dominance("s", o("1"), o("0")));
        assert_eq!(query.labeled(OutcomeLabel::Worse), Ok(&o("0")));
    }

    #[test]
    fn serialized_query_reads_back() {
        let query = PreferenceQuery::consistency("dinner");
        let json = query.to_json().expect("serializable");
        assert!(json.contains("\"CONSISTENCY\""));
        assert_eq!(PreferenceQuery::from_json(&json).expect("valid query"), query);
    }

    #[test]
    fn labeled_rejects_missing_and_duplicate_labels() {
        let mut query = PreferenceQuery::dominance("s", o("1"), o("0"));
        query.outcomes[1].label = OutcomeLabel::Better;
        assert!(query.labeled(OutcomeLabel::Better).is_err());
        assert!(query.labeled(OutcomeLabel::Worse).is_err());
    }

    #[test]
    fn result_json_omits_absent_fields() {
        let json = QueryResult::negative().to_json().expect("serializable");
        assert!(!json.contains("proof"));
        assert!(!json.contains("error"));

        let proof = Trace::new(vec![o("0"), o("1")]).expect("valid trace");
        let result = QueryResult::positive(Some(proof));
        assert_eq!(result.proof_text().as_deref(), Some("(x=0) -> (x=1)"));
        let back: QueryResult =
            serde_json::from_str(&result.to_json().expect("serializable")).expect("valid json");
        assert_eq!(back, result);
    }
}
