use prefcheck_model::{Level, Outcome, PreferenceSpecification};
use prefcheck_oracle::Oracle;

use crate::config::ReasonerConfig;
use crate::error::ReasonError;
use crate::protocol::ReasonerCore;
use crate::query::QueryResult;
use crate::reasoner::Reasoner;
use crate::session::Session;

/// Reasoner for specifications whose preference graph has no cycles.
///
/// Ordering works by exclusion: the outcomes with no improving flip form the
/// top level, they are excluded, and the next level is whatever has no
/// improving flip among the rest. On a cyclic graph the outcomes on a cycle
/// are never emitted; use [`CyclicReasoner`](super::cyclic::CyclicReasoner)
/// there.
#[derive(Debug)]
pub struct AcyclicReasoner<O> {
    core: ReasonerCore<O>,
}

impl<O: Oracle> AcyclicReasoner<O> {
    pub fn new(specification: PreferenceSpecification, oracle: O) -> Self {
        Self::with_config(specification, oracle, ReasonerConfig::default())
    }

    pub fn with_config(specification: PreferenceSpecification, oracle: O, config: ReasonerConfig) -> Self {
        Self {
            core: ReasonerCore::new(specification, oracle, config),
        }
    }

    pub fn oracle(&self) -> &O {
        self.core.oracle.inner()
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        self.core.oracle.inner_mut()
    }

    pub fn into_oracle(self) -> O {
        self.core.oracle.into_inner()
    }
}

impl<O: Oracle> Reasoner for AcyclicReasoner<O> {
    fn specification(&self) -> &PreferenceSpecification {
        &self.core.specification
    }

    fn config(&self) -> &ReasonerConfig {
        &self.core.config
    }

    fn dominates(
        &mut self,
        session: &mut Session,
        better: &Outcome,
        worse: &Outcome,
    ) -> Result<QueryResult, ReasonError> {
        self.core.dominates(session, better, worse)
    }

    fn is_consistent(&mut self, session: &mut Session) -> Result<QueryResult, ReasonError> {
        self.core.is_consistent(session)
    }

    fn next_preferred(&mut self, session: &mut Session) -> Result<Option<Outcome>, ReasonError> {
        self.core.next_preferred(session)
    }

    fn compute_current_preferred_set(&mut self, session: &mut Session) -> Result<Level, ReasonError> {
        self.core.compute_current_preferred_set(session)
    }

    fn compute_next_preferred_set_ignoring(
        &mut self,
        session: &mut Session,
        ignored: &[Outcome],
    ) -> Result<Level, ReasonError> {
        self.core.compute_next_preferred_set_ignoring(session, ignored)
    }

    fn generate_weak_order(&mut self, session: &mut Session) -> Result<Vec<Level>, ReasonError> {
        self.core.generate_weak_order(session)
    }

    fn remove_outcomes(&mut self, session: &mut Session, outcomes: &[Outcome]) -> Result<(), ReasonError> {
        self.core.remove_outcomes(session, outcomes)
    }
}
