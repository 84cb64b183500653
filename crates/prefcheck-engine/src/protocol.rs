//! The oracle protocol: how each question becomes a formula, and how
//! verdicts come back.
//!
//! All properties are phrased against the oracle's transition system: a
//! state is an outcome plus the variables changed by the step into it, runs
//! start from every non-excluded outcome with nothing changed, and each step
//! is an improving flip or a stutter.

use std::time::Instant;

use prefcheck_model::{ExclusionSet, Level, Outcome, PreferenceSpecification};
use prefcheck_oracle::backends::deadline::DeadlineOracle;
use prefcheck_oracle::backends::smv_printer::{exclusions_to_smv, query_to_smv};
use prefcheck_oracle::{Formula, Oracle, OracleQuery, QueryKind, Verdict, Witness};
use tracing::{debug, info, warn};

use crate::config::ReasonerConfig;
use crate::error::{ReasonError, ReconstructionError};
use crate::query::QueryResult;
use crate::reconstruction::{first_outcome, proof_between, reconstruct_trace};
use crate::session::{Activity, Session};

// ---------------------------------------------------------------------------
// Query builders
// ---------------------------------------------------------------------------

fn starting_at(outcome: &Outcome) -> Formula {
    Formula::and(vec![Formula::outcome(outcome), Formula::unchanged()])
}

/// `(worse ∧ unchanged) → EX EF better`
pub fn dominance_query(better: &Outcome, worse: &Outcome) -> OracleQuery {
    let property = starting_at(worse).implies(Formula::outcome(better).ef().ex());
    OracleQuery::new(QueryKind::Reachability, "dominance", property)
}

/// `(worse ∧ unchanged) → ¬EX EF better`; falsified exactly when
/// [`dominance_query`] holds, with the improving path as witness.
pub fn dominance_negation(better: &Outcome, worse: &Outcome) -> OracleQuery {
    let property = starting_at(worse).implies(Formula::outcome(better).ef().ex().not());
    OracleQuery::new(QueryKind::Reachability, "dominance-negation", property)
}

/// `start → ¬EX (changed ∧ EF start)`
pub fn consistency_query() -> OracleQuery {
    let property = Formula::Start.implies(
        Formula::and(vec![Formula::AnyChanged, Formula::Start.ef()])
            .ex()
            .not(),
    );
    OracleQuery::new(QueryKind::CycleAbsence, "consistency", property)
}

/// `EF changed ∨ m1 ∨ … ∨ mk`: falsified by an outcome with no improving
/// flip that is not yet among the `known` maxima.
pub fn next_preferred_query(known: &Level) -> OracleQuery {
    let mut disjuncts = vec![Formula::AnyChanged.ef()];
    disjuncts.extend(known.iter().map(Formula::outcome));
    OracleQuery::new(QueryKind::Containment, "next-preferred", Formula::or(disjuncts))
}

/// `¬EX EX prev ∨ prev ∨ EF current ∨ drop`, or `EF current ∨ drop` at the
/// top level: falsified by an outcome near the previous level that cannot
/// reach the current one and has not been ruled out.
pub fn type_ii_candidate_query(previous: &Level, current: &Level, dropped: &Level) -> OracleQuery {
    let mut disjuncts = Vec::new();
    if !previous.is_empty() {
        let prev = Formula::any_of(previous);
        disjuncts.push(prev.clone().ex().ex().not());
        disjuncts.push(prev);
    }
    disjuncts.push(Formula::any_of(current).ef());
    disjuncts.push(Formula::any_of(dropped));
    OracleQuery::new(QueryKind::Containment, "type-ii-candidate", Formula::or(disjuncts))
}

/// `c → AG EF c`: everything reachable from the candidate leads back to it.
pub fn candidate_verification_query(candidate: &Outcome) -> OracleQuery {
    let c = Formula::outcome(candidate);
    let property = c.clone().implies(c.ef().ag());
    OracleQuery::new(QueryKind::Reachability, "candidate-verification", property)
}

/// `S → AG S`: no run leaves the component.
pub fn cycle_closure_query(component: &Level) -> OracleQuery {
    let s = Formula::any_of(component);
    let property = s.clone().implies(s.ag());
    OracleQuery::new(QueryKind::Containment, "cycle-closure", property)
}

/// Bit strings for all-binary specifications, outcome tuples otherwise.
pub(crate) fn render_level(spec: &PreferenceSpecification, level: &Level) -> String {
    let binary = spec
        .variables()
        .all(|v| v.domain_size() == 2 && v.admits("0") && v.admits("1"));
    if binary {
        level.binary_encoding(&spec.variable_names())
    } else {
        level.to_string()
    }
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

/// State shared by both reasoners: the specification, the (deadline-wrapped)
/// oracle and the configuration.
#[derive(Debug)]
pub(crate) struct ReasonerCore<O> {
    pub(crate) specification: PreferenceSpecification,
    pub(crate) oracle: DeadlineOracle<O>,
    pub(crate) config: ReasonerConfig,
}

impl<O: Oracle> ReasonerCore<O> {
    pub(crate) fn new(specification: PreferenceSpecification, oracle: O, config: ReasonerConfig) -> Self {
        let oracle = DeadlineOracle::new(oracle);
        Self {
            specification,
            oracle,
            config,
        }
    }

    /// One oracle round trip, bounded by the session deadline.
    pub(crate) fn ask(
        &mut self,
        session: &mut Session,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Verdict, ReasonError> {
        self.oracle.set_deadline(session.deadline(self.config.timeout()));
        if self.config.log_queries {
            debug!(
                backend = self.oracle.name(),
                query = %query.label,
                kind = %query.kind,
                exclusions = exclusions.len(),
                spec = %query_to_smv(query),
                "oracle query"
            );
            if !exclusions.is_empty() {
                debug!(
                    query = %query.label,
                    invariants = %exclusions_to_smv(exclusions),
                    "excluded outcomes"
                );
            }
        }
        let started = Instant::now();
        let verdict = self
            .oracle
            .verify(query, exclusions)
            .map_err(|e| ReasonError::oracle(&query.label, e.to_string()))?;
        session.stats_mut().record(started.elapsed(), verdict.holds);
        if self.config.log_queries {
            debug!(
                query = %query.label,
                holds = verdict.holds,
                witness_len = verdict.witness.as_ref().map_or(0, Witness::len),
                "oracle verdict"
            );
        }
        Ok(verdict)
    }

    /// Asks `query` and returns its witness when falsified, `None` when it
    /// holds.
    pub(crate) fn ask_for_witness(
        &mut self,
        session: &mut Session,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Option<Witness>, ReasonError> {
        let verdict = self.ask(session, query, exclusions)?;
        if verdict.holds {
            return Ok(None);
        }
        let witness = verdict
            .witness
            .ok_or_else(|| ReconstructionError::MissingWitness {
                query: query.label.clone(),
            })?;
        Ok(Some(witness))
    }

    /// Proves a verified property by asking for its negation, which must be
    /// falsified; the falsifying witness is the proof.
    pub(crate) fn refute_negation(
        &mut self,
        session: &mut Session,
        negation: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Witness, ReasonError> {
        self.ask_for_witness(session, negation, exclusions)?
            .ok_or_else(|| {
                ReasonError::oracle(
                    &negation.label,
                    "property and its negation both verified; verdicts contradict",
                )
            })
    }

    // -----------------------------------------------------------------------
    // Operations shared by both reasoners
    // -----------------------------------------------------------------------

    pub(crate) fn dominates(
        &mut self,
        session: &mut Session,
        better: &Outcome,
        worse: &Outcome,
    ) -> Result<QueryResult, ReasonError> {
        self.specification.validate(better)?;
        self.specification.validate(worse)?;
        if better == worse {
            info!(outcome = %better, "dominance: an outcome never dominates itself");
            return Ok(QueryResult::negative());
        }
        session.begin(Activity::RawQuery)?;

        let exclusions = session.exclusions().clone();
        let verdict = self.ask(session, &dominance_query(better, worse), &exclusions)?;
        if !verdict.holds {
            info!(%better, %worse, "dominance: no improving path");
            return Ok(QueryResult::negative());
        }
        if !self.config.obtain_proof {
            info!(%better, %worse, "dominance: holds");
            return Ok(QueryResult::positive(None));
        }

        let negation = dominance_negation(better, worse);
        let witness = self.refute_negation(session, &negation, &exclusions)?;
        let trace = reconstruct_trace(&self.specification, &witness)?;
        let proof = proof_between(trace, &negation.label, worse, better)?;
        info!(%better, %worse, proof_len = proof.len(), "dominance: holds");
        Ok(QueryResult::positive(Some(proof)))
    }

    pub(crate) fn is_consistent(&mut self, session: &mut Session) -> Result<QueryResult, ReasonError> {
        session.begin(Activity::RawQuery)?;
        let exclusions = session.exclusions().clone();
        let Some(witness) = self.ask_for_witness(session, &consistency_query(), &exclusions)? else {
            info!(specification = self.specification.name(), "consistency: acyclic");
            return Ok(QueryResult::positive(None));
        };
        let cycle = reconstruct_trace(&self.specification, &witness)?;
        info!(
            specification = self.specification.name(),
            cycle_len = cycle.len(),
            "consistency: cycle found"
        );
        Ok(QueryResult {
            holds: false,
            proof: Some(cycle),
            error: None,
        })
    }

    /// One outcome with no improving flip outside `known`, under `exclusions`.
    pub(crate) fn find_unimprovable(
        &mut self,
        session: &mut Session,
        known: &Level,
        exclusions: &ExclusionSet,
    ) -> Result<Option<Outcome>, ReasonError> {
        let query = next_preferred_query(known);
        let Some(witness) = self.ask_for_witness(session, &query, exclusions)? else {
            return Ok(None);
        };
        let outcome = first_outcome(&self.specification, &witness)?;
        if known.contains(&outcome) || exclusions.is_excluded(&outcome) {
            return Err(ReconstructionError::NoProgress {
                query: query.label,
                known: known.to_string(),
            }
            .into());
        }
        Ok(Some(outcome))
    }

    pub(crate) fn next_preferred(&mut self, session: &mut Session) -> Result<Option<Outcome>, ReasonError> {
        session.begin(Activity::PreferredSets)?;
        if session.cap_reached(self.config.max_outcomes) {
            let level = session.close_current_level();
            if !level.is_empty() {
                warn!(
                    emitted = session.emitted(),
                    size = level.len(),
                    "outcome cap reached; ordering truncated"
                );
            }
            return Ok(None);
        }
        let known = session.current_maximal().clone();
        let exclusions = session.exclusions().clone();
        match self.find_unimprovable(session, &known, &exclusions)? {
            Some(outcome) => {
                session.record_maximal(outcome.clone());
                Ok(Some(outcome))
            }
            None => {
                let level = session.close_current_level();
                debug!(size = level.len(), "level exhausted");
                Ok(None)
            }
        }
    }

    pub(crate) fn compute_current_preferred_set(&mut self, session: &mut Session) -> Result<Level, ReasonError> {
        session.begin(Activity::PreferredSets)?;
        let mut level = session.current_maximal().clone();
        while let Some(outcome) = self.next_preferred(session)? {
            level.insert(outcome);
        }
        info!(
            size = level.len(),
            outcomes = %render_level(&self.specification, &level),
            "preferred set computed"
        );
        Ok(level)
    }

    pub(crate) fn compute_next_preferred_set_ignoring(
        &mut self,
        session: &mut Session,
        ignored: &[Outcome],
    ) -> Result<Level, ReasonError> {
        self.remove_outcomes(session, ignored)?;
        self.compute_current_preferred_set(session)
    }

    pub(crate) fn generate_weak_order(&mut self, session: &mut Session) -> Result<Vec<Level>, ReasonError> {
        session.begin(Activity::PreferredSets)?;
        let mut levels = Vec::new();
        loop {
            let level = self.compute_current_preferred_set(session)?;
            if level.is_empty() {
                break;
            }
            session.exclude_all(&level);
            session.push_level(level.clone());
            levels.push(level);
            if session.cap_reached(self.config.max_outcomes) {
                warn!(
                    emitted = session.emitted(),
                    levels = levels.len(),
                    "outcome cap reached; weak order truncated"
                );
                break;
            }
        }
        info!(levels = levels.len(), emitted = session.emitted(), "weak order generated");
        Ok(levels)
    }

    pub(crate) fn remove_outcomes(&mut self, session: &mut Session, outcomes: &[Outcome]) -> Result<(), ReasonError> {
        for outcome in outcomes {
            self.specification.validate(outcome)?;
        }
        session.exclude_all(outcomes);
        Ok(())
    }
}
