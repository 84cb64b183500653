//! Rebuilding complete outcomes from compressed oracle witnesses.
//!
//! Oracles report the first state of a witness in full and every later
//! state by the variables that step asserts. A variable a step leaves out
//! keeps the value it had one step earlier.

use prefcheck_model::{Outcome, PreferenceSpecification, Trace};
use prefcheck_oracle::{Witness, WitnessStep};

use crate::error::ReconstructionError;

/// Fills every step's omitted variables with its predecessor's value.
///
/// Change flags are left untouched. Applying the function to its own output
/// returns that output unchanged.
pub fn fill_in_carried_over_valuations(steps: &[WitnessStep]) -> Vec<WitnessStep> {
    let mut filled: Vec<WitnessStep> = Vec::with_capacity(steps.len());
    for step in steps {
        let mut assignments = filled
            .last()
            .map(|prev| prev.assignments.clone())
            .unwrap_or_default();
        assignments.extend(
            step.assignments
                .iter()
                .map(|(var, val)| (var.clone(), val.clone())),
        );
        filled.push(WitnessStep {
            assignments,
            changed: step.changed.clone(),
        });
    }
    filled
}

/// Complete outcomes of every witness step, one per step (stutter steps
/// included).
///
/// Assignments to names that are not variables of `spec` (auxiliary model
/// state) are ignored.
pub fn reconstruct_outcomes(
    spec: &PreferenceSpecification,
    witness: &Witness,
) -> Result<Vec<Outcome>, ReconstructionError> {
    if witness.is_empty() {
        return Err(ReconstructionError::EmptyWitness);
    }
    fill_in_carried_over_valuations(&witness.steps)
        .iter()
        .enumerate()
        .map(|(step, filled)| {
            let mut outcome = Outcome::new();
            for variable in spec.variable_names() {
                let value = filled.assignments.get(variable).ok_or_else(|| {
                    ReconstructionError::UnresolvedVariable {
                        step,
                        variable: variable.to_string(),
                    }
                })?;
                outcome.assign(variable, value.as_str());
            }
            spec.validate(&outcome)
                .map_err(|source| ReconstructionError::InvalidOutcome { step, source })?;
            Ok(outcome)
        })
        .collect()
}

/// The witness as a trace; stutter steps collapse.
pub fn reconstruct_trace(
    spec: &PreferenceSpecification,
    witness: &Witness,
) -> Result<Trace, ReconstructionError> {
    let outcomes = reconstruct_outcomes(spec, witness)?;
    Trace::from_walk(outcomes).map_err(|_| ReconstructionError::EmptyWitness)
}

/// The complete outcome of the witness's first (initial) state.
pub fn first_outcome(
    spec: &PreferenceSpecification,
    witness: &Witness,
) -> Result<Outcome, ReconstructionError> {
    let first = witness
        .steps
        .first()
        .ok_or(ReconstructionError::EmptyWitness)?;
    let single = Witness::new(vec![first.clone()]);
    let mut outcomes = reconstruct_outcomes(spec, &single)?;
    outcomes.pop().ok_or(ReconstructionError::EmptyWitness)
}

/// Cuts a dominance proof down to the walk from `worse` to the first visit
/// of `better`.
pub(crate) fn proof_between(
    trace: Trace,
    query: &str,
    worse: &Outcome,
    better: &Outcome,
) -> Result<Trace, ReconstructionError> {
    let mismatch = || ReconstructionError::ProofMismatch {
        query: query.to_string(),
        from: worse.to_string(),
        to: better.to_string(),
    };
    if trace.first() != worse {
        return Err(mismatch());
    }
    let end = trace
        .iter()
        .skip(1)
        .position(|o| o == better)
        .ok_or_else(mismatch)?;
    let mut outcomes = trace.into_outcomes();
    outcomes.truncate(end + 2);
    Trace::new(outcomes).map_err(|_| mismatch())
}
