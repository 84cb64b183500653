use miette::Diagnostic;
use prefcheck_model::ValidationError;
use thiserror::Error;

/// Failures turning an oracle witness into outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ReconstructionError {
    #[error("Witness contains no steps")]
    #[diagnostic(code(prefcheck::engine::empty_witness))]
    EmptyWitness,

    #[error("Oracle falsified '{query}' without producing a witness")]
    #[diagnostic(
        code(prefcheck::engine::missing_witness),
        help("configure the oracle backend to emit counterexample traces")
    )]
    MissingWitness { query: String },

    #[error("Variable '{variable}' is still unassigned at witness step {step}")]
    #[diagnostic(
        code(prefcheck::engine::unresolved_variable),
        help("the first witness step must assign every variable of the specification")
    )]
    UnresolvedVariable { step: usize, variable: String },

    #[error("Witness step {step} is not a valid outcome: {source}")]
    #[diagnostic(code(prefcheck::engine::invalid_witness_step))]
    InvalidOutcome {
        step: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Proof for '{query}' does not lead from {from} to {to}")]
    #[diagnostic(code(prefcheck::engine::proof_mismatch))]
    ProofMismatch {
        query: String,
        from: String,
        to: String,
    },

    #[error("Witness for '{query}' adds nothing new to {known}")]
    #[diagnostic(code(prefcheck::engine::no_progress))]
    NoProgress { query: String, known: String },

    #[error("Cycle extraction did not converge within {bound} rounds")]
    #[diagnostic(code(prefcheck::engine::cycle_bound_exceeded))]
    CycleBoundExceeded { bound: u128 },
}

/// Operations invoked on a session whose state does not allow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionMisuse {
    #[error("ordering requested after a dominance or consistency query")]
    OrderingAfterRawQuery,
    #[error("acyclic and cyclic orderings cannot share a session")]
    MixedOrderings,
    #[error("dominance or consistency requested while outcomes are excluded")]
    RawQueryWithExclusions,
    #[error("dominance or consistency requested in the middle of an ordering")]
    RawQueryDuringOrdering,
}

/// Errors returned by reasoner operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ReasonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("Oracle error in '{query}': {message}")]
    #[diagnostic(code(prefcheck::engine::oracle))]
    Oracle { query: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reconstruction(#[from] ReconstructionError),

    #[error("Session misuse: {0}")]
    #[diagnostic(
        code(prefcheck::engine::session_misuse),
        help("call reset_reasoner before starting an unrelated sequence of operations")
    )]
    SessionMisuse(SessionMisuse),
}

impl From<SessionMisuse> for ReasonError {
    fn from(misuse: SessionMisuse) -> Self {
        ReasonError::SessionMisuse(misuse)
    }
}

impl ReasonError {
    pub(crate) fn oracle(query: &str, message: impl Into<String>) -> Self {
        ReasonError::Oracle {
            query: query.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_carry_stable_codes() {
        let err = ReasonError::from(SessionMisuse::MixedOrderings);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("prefcheck::engine::session_misuse"));
        assert!(err.help().is_some());
    }

    #[test]
    fn transparent_variants_forward_codes() {
        let err = ReasonError::from(ValidationError::MissingAssignment {
            variable: "x".into(),
        });
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("prefcheck::model::incomplete_outcome"));

        let err = ReasonError::from(ReconstructionError::CycleBoundExceeded { bound: 8 });
        assert_eq!(
            err.to_string(),
            "Cycle extraction did not converge within 8 rounds"
        );
    }

    #[test]
    fn oracle_errors_name_the_query() {
        let err = ReasonError::oracle("consistency", "backend crashed");
        assert_eq!(
            err.to_string(),
            "Oracle error in 'consistency': backend crashed"
        );
    }
}
