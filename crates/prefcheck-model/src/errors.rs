use miette::Diagnostic;
use thiserror::Error;

/// Structural problems with variables, outcomes or traces.
///
/// Validation always happens before an outcome is turned into an oracle
/// query, so none of these ever reach the verification backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Variable name must not be empty")]
    #[diagnostic(code(prefcheck::model::empty_name))]
    EmptyVariableName,

    #[error("Variable '{variable}' has an empty domain")]
    #[diagnostic(
        code(prefcheck::model::empty_domain),
        help("every preference variable needs at least one domain value")
    )]
    EmptyDomain { variable: String },

    #[error("Duplicate variable: {variable}")]
    #[diagnostic(code(prefcheck::model::duplicate_variable))]
    DuplicateVariable { variable: String },

    #[error("Outcome does not assign variable '{variable}'")]
    #[diagnostic(
        code(prefcheck::model::incomplete_outcome),
        help("an outcome must assign a value to every variable of the specification")
    )]
    MissingAssignment { variable: String },

    #[error("Outcome assigns unknown variable '{variable}'")]
    #[diagnostic(code(prefcheck::model::unknown_variable))]
    UnknownVariable { variable: String },

    #[error("Value '{value}' is outside the domain of '{variable}' (domain: {domain})")]
    #[diagnostic(code(prefcheck::model::value_outside_domain))]
    ValueOutsideDomain {
        variable: String,
        value: String,
        domain: String,
    },

    #[error("Trace must contain at least one outcome")]
    #[diagnostic(code(prefcheck::model::empty_trace))]
    EmptyTrace,

    #[error("Trace repeats the same outcome at positions {} and {}", .position, .position + 1)]
    #[diagnostic(
        code(prefcheck::model::stutter_in_trace),
        help("adjacent outcomes of a trace must differ in at least one variable")
    )]
    StutterInTrace { position: usize },
}
