#![doc = include_str!("../README.md")]

//! Preference data model.
//!
//! This crate defines preference variables with finite domains, the
//! specification-level variable catalog, complete outcomes, and the
//! explicitly distinct outcome collections used by the reasoning engine:
//! witness traces, weak-order levels and exclusion sets.

pub mod errors;
pub mod outcome;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod sequence;
pub mod variable;

pub use errors::ValidationError;
pub use outcome::{LabeledOutcome, Outcome, OutcomeLabel};
pub use sequence::{ExclusionSet, Level, Trace};
pub use variable::{PreferenceSpecification, Variable};
