mod common;

use std::thread;
use std::time::Duration;

use common::{abc, cpnet, cyclic, ScriptedOracle};
use prefcheck_engine::{
    AcyclicReasoner, Activity, CyclicReasoner, PreferenceQuery, QueryType, ReasonError, Reasoner,
    ReasonerConfig, Session, SessionMisuse,
};
use prefcheck_model::{ExclusionSet, Level};
use prefcheck_oracle::{Oracle, OracleQuery, Verdict};

// ---------------------------------------------------------------------------
// Session discipline
// ---------------------------------------------------------------------------

#[test]
fn ordering_after_dominance_requires_reset() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    reasoner
        .dominates(&mut session, &abc("111"), &abc("000"))
        .expect("dominance should be decided");
    let err = reasoner
        .generate_weak_order(&mut session)
        .expect_err("ordering must not follow a raw query");
    assert!(matches!(
        err,
        ReasonError::SessionMisuse(SessionMisuse::OrderingAfterRawQuery)
    ));

    reasoner.reset_reasoner(&mut session);
    assert_eq!(session.activity(), Activity::Idle);
    assert!(reasoner.generate_weak_order(&mut session).is_ok());
}

#[test]
fn dominance_after_exclusions_is_refused() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    reasoner
        .remove_outcomes(&mut session, &[abc("110")])
        .expect("valid outcome");
    let err = reasoner
        .dominates(&mut session, &abc("111"), &abc("000"))
        .expect_err("exclusions change dominance");
    assert!(matches!(
        err,
        ReasonError::SessionMisuse(SessionMisuse::RawQueryWithExclusions)
    ));
}

#[test]
fn consistency_during_ordering_is_refused() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    reasoner.next_preferred(&mut session).expect("query should succeed");
    let err = reasoner
        .is_consistent(&mut session)
        .expect_err("raw query in the middle of an ordering");
    assert!(matches!(
        err,
        ReasonError::SessionMisuse(SessionMisuse::RawQueryDuringOrdering)
    ));
}

#[test]
fn acyclic_and_cyclic_orderings_do_not_mix() {
    let (spec, oracle) = cyclic();
    let mut reasoner = CyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    reasoner.next_preferred(&mut session).expect("query should succeed");
    let err = reasoner
        .next_level_with_cycles(&mut session)
        .expect_err("orderings must not share a session");
    assert!(matches!(
        err,
        ReasonError::SessionMisuse(SessionMisuse::MixedOrderings)
    ));
}

#[test]
fn sessions_are_independent() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut ordering = Session::new();
    let mut queries = Session::new();

    reasoner
        .next_preferred(&mut ordering)
        .expect("query should succeed");
    let result = reasoner
        .dominates(&mut queries, &abc("111"), &abc("000"))
        .expect("fresh session accepts raw queries");
    assert!(result.holds);
    assert_eq!(ordering.current_maximal(), &Level::from_iter([abc("111")]));
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

/// Answers every query after a pause and records the budget it was given.
struct SlowOracle {
    pause: Duration,
    budgets: Vec<Option<Duration>>,
}

impl SlowOracle {
    fn new(pause: Duration) -> Self {
        Self {
            pause,
            budgets: Vec::new(),
        }
    }
}

impl Oracle for SlowOracle {
    type Error = std::convert::Infallible;

    fn verify(&mut self, _: &OracleQuery, _: &ExclusionSet) -> Result<Verdict, Self::Error> {
        thread::sleep(self.pause);
        Ok(Verdict::holds())
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.budgets.push(timeout);
    }
}

#[test]
fn expired_deadline_fails_later_queries() {
    let (spec, _) = cpnet();
    let config = ReasonerConfig::default().with_timeout_secs(1);
    let mut reasoner =
        AcyclicReasoner::with_config(spec, SlowOracle::new(Duration::from_millis(1100)), config);
    let mut session = Session::new();

    let first = reasoner
        .dominates(&mut session, &abc("111"), &abc("000"))
        .expect_err("negation query starts after the deadline");
    match first {
        ReasonError::Oracle { query, message } => {
            assert_eq!(query, "dominance-negation");
            assert!(message.contains("timed out"), "{message}");
        }
        other => panic!("expected oracle error, got {other:?}"),
    }
}

#[test]
fn backend_is_given_the_time_left_in_the_session() {
    let (spec, _) = cpnet();
    let config = ReasonerConfig::default()
        .with_timeout_secs(30)
        .with_obtain_proof(false);
    let mut reasoner = AcyclicReasoner::with_config(spec, SlowOracle::new(Duration::ZERO), config);
    let mut session = Session::new();

    reasoner
        .dominates(&mut session, &abc("111"), &abc("000"))
        .expect("well within the budget");
    let budget = reasoner.oracle().budgets[0].expect("budget forwarded");
    assert!(budget <= Duration::from_secs(30));
    assert!(budget > Duration::from_secs(20));
}

#[test]
fn reset_renews_the_deadline() {
    let (spec, _) = cpnet();
    let config = ReasonerConfig::default()
        .with_timeout_secs(1)
        .with_obtain_proof(false);
    let mut reasoner =
        AcyclicReasoner::with_config(spec, SlowOracle::new(Duration::from_millis(1100)), config);
    let mut session = Session::new();

    reasoner
        .dominates(&mut session, &abc("111"), &abc("000"))
        .expect("first call starts the clock");
    let err = reasoner
        .dominates(&mut session, &abc("110"), &abc("000"))
        .expect_err("session budget spent");
    assert!(matches!(err, ReasonError::Oracle { ref query, .. } if query == "dominance"));

    reasoner.reset_reasoner(&mut session);
    assert!(reasoner
        .dominates(&mut session, &abc("110"), &abc("000"))
        .expect("reset starts a new budget")
        .holds);

    // A fresh session has its own budget.
    assert!(reasoner
        .dominates(&mut Session::new(), &abc("111"), &abc("000"))
        .is_ok());
}

// ---------------------------------------------------------------------------
// Preference queries
// ---------------------------------------------------------------------------

#[test]
fn dominance_query_round_trips_through_json() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    let json = r#"{
        "type": "DOMINANCE",
        "specification": "cpnet",
        "outcomes": [
            {"label": "BETTER", "outcome": {"a": "1", "b": "1", "c": "1"}},
            {"label": "WORSE", "outcome": {"a": "1", "b": "0", "c": "0"}}
        ]
    }"#;
    let query = PreferenceQuery::from_json(json).expect("valid query");
    assert_eq!(query.query_type, QueryType::Dominance);

    let result = query.execute(&mut reasoner, &mut session);
    assert_eq!(result.error, None);
    assert!(result.holds);
    assert_eq!(
        result.proof_text().as_deref(),
        Some("(a=1, b=0, c=0) -> (a=1, b=1, c=0) -> (a=1, b=1, c=1)")
    );
}

#[test]
fn consistency_query_executes() {
    let (spec, oracle) = cyclic();
    let mut reasoner = CyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    let result = PreferenceQuery::consistency("cyclic").execute(&mut reasoner, &mut session);
    assert_eq!(result.error, None);
    assert!(!result.holds);
    assert!(result.proof.is_some());
}

#[test]
fn query_for_another_specification_fails_without_oracle_calls() {
    let (spec, _) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, ScriptedOracle::default());
    let mut session = Session::new();

    let result = PreferenceQuery::consistency("dinner").execute(&mut reasoner, &mut session);
    assert!(!result.holds);
    assert!(result.error.expect("mismatch reported").contains("dinner"));
    assert!(reasoner.oracle().queries.is_empty());
}

#[test]
fn malformed_dominance_query_reports_an_error() {
    let (spec, oracle) = cpnet();
    let mut reasoner = AcyclicReasoner::new(spec, oracle);
    let mut session = Session::new();

    let mut query = PreferenceQuery::dominance("cpnet", abc("111"), abc("000"));
    query.outcomes.pop();
    let result = query.execute(&mut reasoner, &mut session);
    assert!(result.error.is_some());

    let mut invalid = PreferenceQuery::dominance("cpnet", abc("111"), abc("000"));
    invalid.outcomes[0].outcome.assign("a", "2");
    let result = invalid.execute(&mut reasoner, &mut session);
    assert!(result.error.is_some());
    assert_eq!(reasoner.oracle().calls(), 0);
}
