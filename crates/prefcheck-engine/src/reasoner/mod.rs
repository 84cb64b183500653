//! Reasoners over a verification oracle.
//!
//! [`Reasoner`] carries the operations both reasoners share. The cyclic
//! reasoner adds its level-classification operations as inherent methods on
//! [`cyclic::CyclicReasoner`].

pub mod acyclic;
pub mod cyclic;

use prefcheck_model::{Level, Outcome, PreferenceSpecification};

use crate::config::ReasonerConfig;
use crate::error::ReasonError;
use crate::query::QueryResult;
use crate::session::Session;

pub trait Reasoner {
    fn specification(&self) -> &PreferenceSpecification;

    fn config(&self) -> &ReasonerConfig;

    /// Does `better` improve on `worse` through a chain of improving flips?
    ///
    /// Positive answers carry the improving path from `worse` to `better`
    /// when proofs are enabled. An outcome never dominates itself.
    fn dominates(
        &mut self,
        session: &mut Session,
        better: &Outcome,
        worse: &Outcome,
    ) -> Result<QueryResult, ReasonError>;

    /// Is the induced preference graph acyclic? A negative answer carries the
    /// cycle that was found.
    fn is_consistent(&mut self, session: &mut Session) -> Result<QueryResult, ReasonError>;

    /// One more maximal outcome of the current level, or `None` once the
    /// level is exhausted (at which point the level is excluded).
    fn next_preferred(&mut self, session: &mut Session) -> Result<Option<Outcome>, ReasonError>;

    /// Every remaining maximal outcome of the current level.
    fn compute_current_preferred_set(&mut self, session: &mut Session) -> Result<Level, ReasonError>;

    /// Excludes `ignored`, then computes the current preferred set.
    fn compute_next_preferred_set_ignoring(
        &mut self,
        session: &mut Session,
        ignored: &[Outcome],
    ) -> Result<Level, ReasonError>;

    /// Levels from most to least preferred.
    fn generate_weak_order(&mut self, session: &mut Session) -> Result<Vec<Level>, ReasonError>;

    /// Removes `outcomes` from every later query of the session.
    fn remove_outcomes(&mut self, session: &mut Session, outcomes: &[Outcome]) -> Result<(), ReasonError>;

    fn reset_reasoner(&mut self, session: &mut Session) {
        session.reset();
    }
}
