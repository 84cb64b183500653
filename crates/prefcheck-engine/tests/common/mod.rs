#![allow(dead_code)]

use std::collections::VecDeque;

use prefcheck_model::{ExclusionSet, Outcome, PreferenceSpecification, Variable};
use prefcheck_oracle::backends::explicit::ExplicitOracle;
use prefcheck_oracle::{Oracle, OracleQuery, Verdict, Witness, WitnessStep};

/// Outcome over binary variables `a`, `b`, `c` from a bit string like "101".
pub fn abc(bits: &str) -> Outcome {
    ["a", "b", "c"]
        .into_iter()
        .zip(bits.chars())
        .map(|(var, bit)| (var, bit.to_string()))
        .collect()
}

pub fn abc_spec(name: &str) -> PreferenceSpecification {
    PreferenceSpecification::new(
        name,
        ["a", "b", "c"]
            .into_iter()
            .map(|n| Variable::binary(n).expect("valid variable")),
    )
    .expect("valid specification")
}

pub fn oracle_with_flips(
    spec: &PreferenceSpecification,
    flips: &[(&str, &str)],
    outcome: fn(&str) -> Outcome,
) -> ExplicitOracle {
    let mut oracle = ExplicitOracle::new(spec.clone()).expect("small specification");
    for (worse, better) in flips {
        oracle
            .add_flip(&outcome(worse), &outcome(better))
            .expect("valid flip");
    }
    oracle
}

// ---------------------------------------------------------------------------
// Acyclic fixture: a conditional-preference network over a, b, c
//
//   a: 1 > 0
//   b: prefers the value of a
//   c: 1 > 0 when b = 1, otherwise 0 > 1
// ---------------------------------------------------------------------------

pub const CPNET_FLIPS: &[(&str, &str)] = &[
    ("000", "100"),
    ("001", "101"),
    ("001", "000"),
    ("010", "110"),
    ("010", "000"),
    ("010", "011"),
    ("011", "111"),
    ("011", "001"),
    ("100", "110"),
    ("101", "111"),
    ("101", "100"),
    ("110", "111"),
];

/// The weak order of the network, most preferred first.
pub const CPNET_LEVELS: &[&[&str]] = &[
    &["111"],
    &["110"],
    &["100"],
    &["000", "101"],
    &["001"],
    &["011"],
    &["010"],
];

pub fn cpnet() -> (PreferenceSpecification, ExplicitOracle) {
    let spec = abc_spec("cpnet");
    let oracle = oracle_with_flips(&spec, CPNET_FLIPS, abc);
    (spec, oracle)
}

// ---------------------------------------------------------------------------
// Cyclic fixture over a, b, c
//
//   level 0: 110 -> 011 -> 101 -> 110                       (type II)
//   level 1: 111 -> 110 (type I); 100 <-> 010, 100 -> 101  (type II)
//   level 2: 000 -> 100                                     (type I)
//   level 3: 001 -> 000                                     (type I)
// ---------------------------------------------------------------------------

pub const CYCLIC_FLIPS: &[(&str, &str)] = &[
    ("110", "011"),
    ("011", "101"),
    ("101", "110"),
    ("111", "110"),
    ("100", "010"),
    ("010", "100"),
    ("100", "101"),
    ("000", "100"),
    ("001", "000"),
];

pub fn cyclic() -> (PreferenceSpecification, ExplicitOracle) {
    let spec = abc_spec("cyclic");
    let oracle = oracle_with_flips(&spec, CYCLIC_FLIPS, abc);
    (spec, oracle)
}

// ---------------------------------------------------------------------------
// Three outcomes of one variable in a single cycle: a -> b -> c -> a
// ---------------------------------------------------------------------------

pub fn x(value: &str) -> Outcome {
    Outcome::new().with("x", value)
}

pub fn triangle_spec() -> PreferenceSpecification {
    PreferenceSpecification::new(
        "triangle",
        [Variable::new("x", ["a", "b", "c"]).expect("valid variable")],
    )
    .expect("valid specification")
}

pub fn triangle() -> (PreferenceSpecification, ExplicitOracle) {
    let spec = triangle_spec();
    let oracle = oracle_with_flips(&spec, &[("a", "b"), ("b", "c"), ("c", "a")], x);
    (spec, oracle)
}

// ---------------------------------------------------------------------------
// Scripted oracle
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("scripted oracle has no verdict left for '{0}'")]
pub struct ScriptExhausted(pub String);

/// Replays canned verdicts in order and records every query it receives.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    pub verdicts: VecDeque<Verdict>,
    pub queries: Vec<OracleQuery>,
}

impl ScriptedOracle {
    pub fn new(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        Self {
            verdicts: verdicts.into_iter().collect(),
            queries: Vec::new(),
        }
    }
}

impl Oracle for ScriptedOracle {
    type Error = ScriptExhausted;

    fn verify(
        &mut self,
        query: &OracleQuery,
        _exclusions: &ExclusionSet,
    ) -> Result<Verdict, Self::Error> {
        self.queries.push(query.clone());
        self.verdicts
            .pop_front()
            .ok_or_else(|| ScriptExhausted(query.label.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Compressed witness for a walk over single-variable outcomes `x = ..`.
pub fn x_walk(values: &[&str]) -> Witness {
    let steps = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if i == 0 {
                WitnessStep::new().assign("x", *value)
            } else {
                WitnessStep::new().change("x", *value)
            }
        })
        .collect();
    Witness::new(steps)
}

pub fn level_of(outcomes: &[&str], outcome: fn(&str) -> Outcome) -> prefcheck_model::Level {
    outcomes.iter().map(|o| outcome(o)).collect()
}
