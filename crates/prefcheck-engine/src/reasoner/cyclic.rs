//! Weak orders over preference graphs that may contain cycles.
//!
//! Level `i` consists of the terminal strongly connected components of the
//! graph left after removing levels `0..i`. Those split into two kinds:
//!
//! - **Type I**: single outcomes with no improving flip at all. Found like
//!   acyclic maxima, with levels `0..i` excluded.
//! - **Type II**: cyclic components nothing escapes from. Found one
//!   candidate at a time near level `i - 1`, verified with `c → AG EF c`, and
//!   grown to the full component by [`CyclicReasoner::find_cycle_containing`].

use prefcheck_model::{ExclusionSet, Level, Outcome, PreferenceSpecification};
use prefcheck_oracle::Oracle;
use tracing::{debug, info, warn};

use crate::config::{ReasonerConfig, TopLevelPolicy};
use crate::error::{ReasonError, ReconstructionError};
use crate::protocol::{
    candidate_verification_query, cycle_closure_query, render_level, type_ii_candidate_query,
    ReasonerCore,
};
use crate::query::QueryResult;
use crate::reasoner::Reasoner;
use crate::reconstruction::{first_outcome, reconstruct_trace};
use crate::session::{Activity, Session};

/// One level of a cyclic weak order, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CyclicLevel {
    pub type_i: Level,
    pub type_ii: Vec<Level>,
}

impl CyclicLevel {
    /// Every outcome of the level, Type I first.
    pub fn outcomes(&self) -> Level {
        let mut all = self.type_i.clone();
        for component in &self.type_ii {
            all.extend(component);
        }
        all
    }

    pub fn len(&self) -> usize {
        self.type_i.len() + self.type_ii.iter().map(Level::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reasoner that orders outcomes even when the preference graph is cyclic.
///
/// Dominance, consistency and the next-preferred family behave as in the
/// acyclic reasoner; [`Reasoner::generate_weak_order`] uses the cyclic
/// level classification.
#[derive(Debug)]
pub struct CyclicReasoner<O> {
    core: ReasonerCore<O>,
}

impl<O: Oracle> CyclicReasoner<O> {
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

    /// Classifies the level after `previous`, given the union `earlier` of
    /// all levels before it. Both empty means the top level.
    pub fn next_preferred_with_cycles(
        &mut self,
        session: &mut Session,
        previous: &Level,
        earlier: &Level,
    ) -> Result<CyclicLevel, ReasonError> {
        session.begin(Activity::CyclicLevels)?;
        let top = previous.is_empty() && earlier.is_empty();

        let mut search_exclusions = session.exclusions().clone();
        search_exclusions.exclude_all(earlier);
        let mut level_exclusions = search_exclusions.clone();
        level_exclusions.exclude_all(previous);

        let mut level = CyclicLevel::default();
        let mut dropped = Level::new();

        if !top || self.core.config.top_level_type_i == TopLevelPolicy::Search {
            while let Some(outcome) =
                self.core
                    .find_unimprovable(session, &level.type_i, &level_exclusions)?
            {
                debug!(%outcome, "type I outcome");
                dropped.insert(outcome.clone());
                level.type_i.insert(outcome);
            }
        }

        while let Some(candidate) =
            self.find_candidate(session, previous, &level, &dropped, &search_exclusions)?
        {
            if self.verify_candidate(session, &candidate, &level_exclusions)? {
                let component = self.find_cycle_within(session, &candidate, &level_exclusions)?;
                debug!(size = component.len(), "type II component");
                dropped.extend(&component);
                level.type_ii.push(component);
            } else {
                dropped.insert(candidate);
            }
        }

        if top && self.core.config.top_level_type_i == TopLevelPolicy::AssumeNone {
            self.reclassify_top_level_singletons(&mut level);
        }
        info!(
            type_i = level.type_i.len(),
            type_ii = level.type_ii.len(),
            size = level.len(),
            "cyclic level classified"
        );
        Ok(level)
    }

    /// Classifies the level after the one last recorded in `session` and
    /// advances the session's level history. Returns `None` once no outcomes
    /// remain, and on every later call.
    pub fn next_level_with_cycles(&mut self, session: &mut Session) -> Result<Option<CyclicLevel>, ReasonError> {
        session.begin(Activity::CyclicLevels)?;
        if session.is_exhausted() {
            return Ok(None);
        }
        if session.cap_reached(self.core.config.max_outcomes) {
            warn!(emitted = session.emitted(), "outcome cap reached; weak order truncated");
            return Ok(None);
        }
        let previous = session.previous_level().clone();
        let earlier = session.earlier_levels().clone();
        let level = self.next_preferred_with_cycles(session, &previous, &earlier)?;
        if level.is_empty() {
            session.mark_exhausted();
            return Ok(None);
        }
        session.advance_cyclic(level.outcomes());
        Ok(Some(level))
    }

    /// Levels from most to least preferred, each a union of Type I outcomes
    /// and Type II components.
    pub fn generate_weak_order_with_cycles(&mut self, session: &mut Session) -> Result<Vec<Level>, ReasonError> {
        let mut levels = Vec::new();
        while let Some(level) = self.next_level_with_cycles(session)? {
            info!(
                index = levels.len(),
                outcomes = %render_level(&self.core.specification, &level.outcomes()),
                "cyclic level"
            );
            levels.push(level.outcomes());
        }
        info!(levels = levels.len(), emitted = session.emitted(), "cyclic weak order generated");
        Ok(levels)
    }

    /// Grows `{candidate}` into the closed component containing it, with the
    /// session's exclusions in force.
    ///
    /// `candidate` must lie on a component nothing escapes from; otherwise
    /// the result is whatever the candidate can reach.
    pub fn find_cycle_containing(&mut self, session: &mut Session, candidate: &Outcome) -> Result<Level, ReasonError> {
        self.core.specification.validate(candidate)?;
        session.begin(Activity::CyclicLevels)?;
        let exclusions = session.exclusions().clone();
        self.find_cycle_within(session, candidate, &exclusions)
    }

    fn find_cycle_within(
        &mut self,
        session: &mut Session,
        candidate: &Outcome,
        exclusions: &ExclusionSet,
    ) -> Result<Level, ReasonError> {
        let bound = self.core.specification.outcome_space_size();
        let mut component: Level = std::iter::once(candidate.clone()).collect();
        let mut rounds: u128 = 0;
        loop {
            rounds += 1;
            if rounds > bound {
                return Err(ReconstructionError::CycleBoundExceeded { bound }.into());
            }
            let query = cycle_closure_query(&component);
            let Some(witness) = self.core.ask_for_witness(session, &query, exclusions)? else {
                return Ok(component);
            };
            let trace = reconstruct_trace(&self.core.specification, &witness)?;
            let before = component.len();
            component.extend(&trace);
            if component.len() == before {
                return Err(ReconstructionError::NoProgress {
                    query: query.label,
                    known: component.to_string(),
                }
                .into());
            }
        }
    }

    fn find_candidate(
        &mut self,
        session: &mut Session,
        previous: &Level,
        level: &CyclicLevel,
        dropped: &Level,
        exclusions: &ExclusionSet,
    ) -> Result<Option<Outcome>, ReasonError> {
        let current = level.outcomes();
        let query = type_ii_candidate_query(previous, &current, dropped);
        let Some(witness) = self.core.ask_for_witness(session, &query, exclusions)? else {
            return Ok(None);
        };
        let candidate = first_outcome(&self.core.specification, &witness)?;
        if dropped.contains(&candidate) || current.contains(&candidate) || previous.contains(&candidate) {
            return Err(ReconstructionError::NoProgress {
                query: query.label,
                known: dropped.union(&current).to_string(),
            }
            .into());
        }
        Ok(Some(candidate))
    }

    fn verify_candidate(
        &mut self,
        session: &mut Session,
        candidate: &Outcome,
        exclusions: &ExclusionSet,
    ) -> Result<bool, ReasonError> {
        let verdict = self
            .core
            .ask(session, &candidate_verification_query(candidate), exclusions)?;
        Ok(verdict.holds)
    }

    /// A singleton "component" at the top level is a plain maximal outcome:
    /// the specification has top-level Type I outcomes after all.
    fn reclassify_top_level_singletons(&self, level: &mut CyclicLevel) {
        let (singletons, cycles): (Vec<Level>, Vec<Level>) =
            std::mem::take(&mut level.type_ii)
                .into_iter()
                .partition(|component| component.len() == 1);
        level.type_ii = cycles;
        for singleton in singletons {
            for outcome in singleton {
                warn!(
                    specification = self.core.specification.name(),
                    %outcome,
                    "top level holds an outcome outside any cycle; treating it as type I"
                );
                level.type_i.insert(outcome);
            }
        }
    }
}

impl<O: Oracle> Reasoner for CyclicReasoner<O> {
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
        self.generate_weak_order_with_cycles(session)
    }

    fn remove_outcomes(&mut self, session: &mut Session, outcomes: &[Outcome]) -> Result<(), ReasonError> {
        self.core.remove_outcomes(session, outcomes)
    }
}
