//! Proptest strategies for well-formed specifications and outcomes.

use proptest::prelude::*;

use crate::outcome::Outcome;
use crate::variable::{PreferenceSpecification, Variable};

/// Strategy for a small specification suitable for property testing.
///
/// Generated specifications have 1–4 variables named `v0..`, each with a
/// domain of 2–3 values named `d0..`, so the outcome space never exceeds 81.
pub fn arb_specification() -> impl Strategy<Value = PreferenceSpecification> {
    proptest::collection::vec(2..=3usize, 1..=4).prop_map(|domain_sizes| {
        let variables = domain_sizes.iter().enumerate().filter_map(|(i, &size)| {
            Variable::new(format!("v{i}"), (0..size).map(|d| format!("d{d}"))).ok()
        });
        PreferenceSpecification::new("generated", variables)
            .unwrap_or_else(|e| panic!("generated specification must be valid: {e}"))
    })
}

/// Strategy for a complete, valid outcome of `spec`.
pub fn arb_outcome(spec: &PreferenceSpecification) -> impl Strategy<Value = Outcome> {
    let choices: Vec<(String, Vec<String>)> = spec
        .variables()
        .map(|v| {
            (
                v.name().to_string(),
                v.domain().map(str::to_string).collect(),
            )
        })
        .collect();
    let index_strategies: Vec<_> = choices.iter().map(|(_, d)| 0..d.len()).collect();
    index_strategies.prop_map(move |indices| {
        choices
            .iter()
            .zip(indices)
            .map(|((name, domain), idx)| (name.clone(), domain[idx].clone()))
            .collect()
    })
}

/// Strategy for a specification together with a walk of outcomes through it.
pub fn arb_specification_with_walk(
    max_len: usize,
) -> impl Strategy<Value = (PreferenceSpecification, Vec<Outcome>)> {
    arb_specification().prop_flat_map(move |spec| {
        let walk = proptest::collection::vec(arb_outcome(&spec), 1..=max_len.max(1));
        (Just(spec), walk)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_outcomes_validate((spec, walk) in arb_specification_with_walk(6)) {
            for outcome in &walk {
                prop_assert!(spec.validate(outcome).is_ok());
            }
        }

        #[test]
        fn outcome_space_matches_enumeration(spec in arb_specification()) {
            prop_assert_eq!(spec.enumerate_outcomes().len() as u128, spec.outcome_space_size());
        }
    }
}
