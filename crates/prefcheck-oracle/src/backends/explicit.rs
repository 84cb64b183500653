//! Explicit-state reference oracle.
//!
//! Enumerates the outcome space of a small specification, takes the
//! improving flips as an explicit edge list, and answers queries by labelling
//! the reachable transition system state by state. Intended for tests, small
//! models and cross-checking a symbolic backend.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use prefcheck_model::{ExclusionSet, Outcome, PreferenceSpecification, ValidationError};
use tracing::debug;

use crate::formula::Formula;
use crate::oracle::{Oracle, OracleQuery, Verdict, Witness, WitnessStep};

/// Largest outcome space the explicit backend will enumerate.
pub const MAX_EXPLICIT_OUTCOMES: usize = 1 << 16;

/// Change flags are packed into a `u64`.
const MAX_EXPLICIT_VARIABLES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExplicitOracleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("flip from {outcome} to itself")]
    SelfFlip { outcome: String },
    #[error("outcome {outcome} is not part of specification '{specification}'")]
    UnknownOutcome {
        outcome: String,
        specification: String,
    },
    #[error("specification declares {count} variables; at most 64 are supported")]
    TooManyVariables { count: usize },
    #[error("outcome space of {size} exceeds the explicit limit of 65536")]
    OutcomeSpaceTooLarge { size: u128 },
    #[error("{query} timed out before completion")]
    Timeout { query: String },
}

/// Which falsifying initial state is reported when several exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOrder {
    /// First in enumeration order.
    #[default]
    Forward,
    /// Last in enumeration order.
    Reverse,
}

/// Reference oracle over an explicit improving-flip graph.
#[derive(Debug, Clone)]
pub struct ExplicitOracle {
    specification: PreferenceSpecification,
    variables: Vec<String>,
    outcomes: Vec<Outcome>,
    index: HashMap<Outcome, usize>,
    /// Improving successors of each outcome with the change mask of the flip.
    flips: Vec<Vec<(usize, u64)>>,
    order: SearchOrder,
    timeout: Option<Duration>,
    calls: usize,
}

impl ExplicitOracle {
    pub fn new(specification: PreferenceSpecification) -> Result<Self, ExplicitOracleError> {
        let count = specification.num_variables();
        if count > MAX_EXPLICIT_VARIABLES {
            return Err(ExplicitOracleError::TooManyVariables { count });
        }
        let size = specification.outcome_space_size();
        if size > MAX_EXPLICIT_OUTCOMES as u128 {
            return Err(ExplicitOracleError::OutcomeSpaceTooLarge { size });
        }
        let variables = specification
            .variable_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let outcomes = specification.enumerate_outcomes();
        let index = outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| (o.clone(), i))
            .collect();
        let flips = vec![Vec::new(); outcomes.len()];
        Ok(Self {
            specification,
            variables,
            outcomes,
            index,
            flips,
            order: SearchOrder::Forward,
            timeout: None,
            calls: 0,
        })
    }

    /// Builder-style [`ExplicitOracle::add_flip`].
    pub fn with_flip(mut self, worse: &Outcome, better: &Outcome) -> Result<Self, ExplicitOracleError> {
        self.add_flip(worse, better)?;
        Ok(self)
    }

    pub fn with_search_order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    /// Declares that moving from `worse` to `better` is an improving flip.
    /// Repeated declarations are ignored.
    pub fn add_flip(&mut self, worse: &Outcome, better: &Outcome) -> Result<(), ExplicitOracleError> {
        let from = self.outcome_index(worse)?;
        let to = self.outcome_index(better)?;
        if from == to {
            return Err(ExplicitOracleError::SelfFlip {
                outcome: worse.to_string(),
            });
        }
        let mask = self.change_mask(from, to);
        if !self.flips[from].iter().any(|&(t, _)| t == to) {
            self.flips[from].push((to, mask));
        }
        Ok(())
    }

    pub fn specification(&self) -> &PreferenceSpecification {
        &self.specification
    }

    /// Improving successors of `outcome`, in declaration order.
    pub fn flips_from(&self, outcome: &Outcome) -> Vec<&Outcome> {
        match self.index.get(outcome) {
            Some(&i) => self.flips[i].iter().map(|&(t, _)| &self.outcomes[t]).collect(),
            None => Vec::new(),
        }
    }

    /// Number of queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn outcome_index(&self, outcome: &Outcome) -> Result<usize, ExplicitOracleError> {
        self.specification.validate(outcome)?;
        self.lookup(outcome)
    }

    fn lookup(&self, outcome: &Outcome) -> Result<usize, ExplicitOracleError> {
        self.index
            .get(outcome)
            .copied()
            .ok_or_else(|| ExplicitOracleError::UnknownOutcome {
                outcome: outcome.to_string(),
                specification: self.specification.name().to_string(),
            })
    }

    fn change_mask(&self, from: usize, to: usize) -> u64 {
        let (lhs, rhs) = (&self.outcomes[from], &self.outcomes[to]);
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, var)| lhs.get(var) != rhs.get(var))
            .fold(0u64, |mask, (i, _)| mask | (1u64 << i))
    }

    fn check_variables(&self, formula: &Formula) -> Result<(), ExplicitOracleError> {
        for variable in formula.variables() {
            if self.specification.variable(variable).is_none() {
                return Err(ValidationError::UnknownVariable {
                    variable: variable.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn witness(&self, kripke: &Kripke<'_>, path: &[usize]) -> Witness {
        let steps = path
            .iter()
            .enumerate()
            .map(|(position, &state)| {
                let (outcome, mask) = kripke.states[state];
                let mut step = if position == 0 {
                    WitnessStep::full(&self.outcomes[outcome])
                } else {
                    WitnessStep::new()
                };
                for (i, var) in self.variables.iter().enumerate() {
                    if mask & (1u64 << i) != 0 {
                        let value = self.outcomes[outcome].get(var).unwrap_or_default();
                        step = step.change(var.as_str(), value);
                    }
                }
                step
            })
            .collect();
        Witness::new(steps)
    }
}

impl Oracle for ExplicitOracle {
    type Error = ExplicitOracleError;

    fn verify(
        &mut self,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Verdict, Self::Error> {
        self.calls += 1;
        self.check_variables(&query.property)?;

        let mut excluded = vec![false; self.outcomes.len()];
        for outcome in exclusions {
            excluded[self.lookup(outcome)?] = true;
        }
        let mut initial: Vec<usize> = (0..self.outcomes.len()).filter(|&i| !excluded[i]).collect();
        if self.order == SearchOrder::Reverse {
            initial.reverse();
        }

        let started = Instant::now();
        for origin in initial {
            // Checked between origins; one labelling pass is never interrupted.
            if self.timeout.is_some_and(|limit| started.elapsed() >= limit) {
                return Err(ExplicitOracleError::Timeout {
                    query: query.label.clone(),
                });
            }
            let kripke = Kripke::build(self, origin, &excluded);
            let mut cache = HashMap::new();
            if kripke.eval(&query.property, &mut cache)[0] {
                continue;
            }
            let mut path = vec![0];
            kripke.explain(&query.property, false, &mut path, &mut cache);
            let witness = self.witness(&kripke, &path);
            debug!(
                backend = "explicit",
                query = %query.label,
                kind = %query.kind,
                origin = %self.outcomes[origin],
                states = kripke.states.len(),
                witness_len = witness.len(),
                "property falsified"
            );
            return Ok(Verdict::falsified(witness));
        }
        debug!(
            backend = "explicit",
            query = %query.label,
            kind = %query.kind,
            excluded = exclusions.len(),
            "property holds"
        );
        Ok(Verdict::holds())
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    fn name(&self) -> &str {
        "explicit"
    }
}

type SatCache = HashMap<*const Formula, Vec<bool>>;

/// Transition system reachable from one initial state. State 0 is the
/// initial state; every state is `(outcome index, change mask)`.
struct Kripke<'a> {
    oracle: &'a ExplicitOracle,
    origin: usize,
    states: Vec<(usize, u64)>,
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl<'a> Kripke<'a> {
    fn build(oracle: &'a ExplicitOracle, origin: usize, excluded: &[bool]) -> Self {
        let mut ids: HashMap<(usize, u64), usize> = HashMap::new();
        let mut states = vec![(origin, 0u64)];
        let mut succ: Vec<Vec<usize>> = Vec::new();
        ids.insert((origin, 0), 0);

        let mut next = 0;
        while next < states.len() {
            let (outcome, _) = states[next];
            let targets = oracle.flips[outcome]
                .iter()
                .filter(|(t, _)| !excluded[*t])
                .copied()
                .chain(std::iter::once((outcome, 0)));
            let mut out = Vec::new();
            for key in targets {
                let id = *ids.entry(key).or_insert_with(|| {
                    states.push(key);
                    states.len() - 1
                });
                out.push(id);
            }
            succ.push(out);
            next += 1;
        }

        let mut pred = vec![Vec::new(); states.len()];
        for (s, targets) in succ.iter().enumerate() {
            for &t in targets {
                pred[t].push(s);
            }
        }
        Self {
            oracle,
            origin,
            states,
            succ,
            pred,
        }
    }

    fn eval(&self, formula: &Formula, cache: &mut SatCache) -> Vec<bool> {
        let key = formula as *const Formula;
        if let Some(sat) = cache.get(&key) {
            return sat.clone();
        }
        let sat = match formula {
            Formula::True => vec![true; self.states.len()],
            Formula::False => vec![false; self.states.len()],
            Formula::Is { variable, value } => self.atom(|outcome, _| {
                self.oracle.outcomes[outcome].get(variable) == Some(value.as_str())
            }),
            Formula::Changed(variable) => {
                let bit = self.oracle.variables.iter().position(|v| v == variable);
                self.atom(|_, mask| bit.is_some_and(|i| mask & (1u64 << i) != 0))
            }
            Formula::AnyChanged => self.atom(|_, mask| mask != 0),
            Formula::Start => self.atom(|outcome, _| outcome == self.origin),
            Formula::Not(inner) => negate(self.eval(inner, cache)),
            Formula::And(terms) => {
                let mut sat = vec![true; self.states.len()];
                for term in terms {
                    let rhs = self.eval(term, cache);
                    sat.iter_mut().zip(rhs).for_each(|(l, r)| *l &= r);
                }
                sat
            }
            Formula::Or(terms) => {
                let mut sat = vec![false; self.states.len()];
                for term in terms {
                    let rhs = self.eval(term, cache);
                    sat.iter_mut().zip(rhs).for_each(|(l, r)| *l |= r);
                }
                sat
            }
            Formula::Implies(lhs, rhs) => {
                let lhs = self.eval(lhs, cache);
                let rhs = self.eval(rhs, cache);
                lhs.into_iter().zip(rhs).map(|(l, r)| !l || r).collect()
            }
            Formula::Ex(inner) => {
                let inner = self.eval(inner, cache);
                self.succ
                    .iter()
                    .map(|targets| targets.iter().any(|&t| inner[t]))
                    .collect()
            }
            Formula::Ef(inner) => {
                let inner = self.eval(inner, cache);
                self.backward_closure(inner)
            }
            Formula::Ag(inner) => {
                let inner = self.eval(inner, cache);
                negate(self.backward_closure(negate(inner)))
            }
        };
        cache.insert(key, sat.clone());
        sat
    }

    fn atom(&self, holds: impl Fn(usize, u64) -> bool) -> Vec<bool> {
        self.states
            .iter()
            .map(|&(outcome, mask)| holds(outcome, mask))
            .collect()
    }

    /// States that can reach a marked state (least fixpoint of `EF`).
    fn backward_closure(&self, mut marked: Vec<bool>) -> Vec<bool> {
        let mut queue: VecDeque<usize> = (0..marked.len()).filter(|&s| marked[s]).collect();
        while let Some(s) = queue.pop_front() {
            for &p in &self.pred[s] {
                if !marked[p] {
                    marked[p] = true;
                    queue.push_back(p);
                }
            }
        }
        marked
    }

    /// Shortest path from `from` to a state satisfying `target`, inclusive.
    fn shortest_path(&self, from: usize, target: &[bool]) -> Option<Vec<usize>> {
        let mut parent: Vec<Option<usize>> = vec![None; self.states.len()];
        let mut seen = vec![false; self.states.len()];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;
        while let Some(s) = queue.pop_front() {
            if target[s] {
                let mut path = vec![s];
                let mut cur = s;
                while let Some(p) = parent[cur] {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            for &t in &self.succ[s] {
                if !seen[t] {
                    seen[t] = true;
                    parent[t] = Some(s);
                    queue.push_back(t);
                }
            }
        }
        None
    }

    /// Extends `path` (ending at the state being explained) with a run that
    /// demonstrates `formula` has truth value `positive` there.
    fn explain(&self, formula: &Formula, positive: bool, path: &mut Vec<usize>, cache: &mut SatCache) {
        let Some(&s) = path.last() else {
            return;
        };
        match (formula, positive) {
            (
                Formula::True
                | Formula::False
                | Formula::Is { .. }
                | Formula::Changed(_)
                | Formula::AnyChanged
                | Formula::Start,
                _,
            ) => {}
            (Formula::Not(inner), _) => self.explain(inner, !positive, path, cache),
            // Every term has the requested value; follow the first temporal one.
            (Formula::And(terms), true) | (Formula::Or(terms), false) => {
                if let Some(term) = terms.iter().find(|t| t.is_temporal()) {
                    self.explain(term, positive, path, cache);
                }
            }
            // Some term has the requested value; follow the first such one.
            (Formula::Or(terms), true) | (Formula::And(terms), false) => {
                for term in terms {
                    if self.eval(term, cache)[s] == positive {
                        self.explain(term, positive, path, cache);
                        break;
                    }
                }
            }
            (Formula::Implies(lhs, rhs), true) => {
                if self.eval(lhs, cache)[s] {
                    self.explain(rhs, true, path, cache);
                } else {
                    self.explain(lhs, false, path, cache);
                }
            }
            (Formula::Implies(lhs, rhs), false) => {
                if lhs.is_temporal() {
                    self.explain(lhs, true, path, cache);
                } else {
                    self.explain(rhs, false, path, cache);
                }
            }
            (Formula::Ex(inner), true) => {
                let inner_sat = self.eval(inner, cache);
                if let Some(&t) = self.succ[s].iter().find(|&&t| inner_sat[t]) {
                    path.push(t);
                    self.explain(inner, true, path, cache);
                }
            }
            (Formula::Ef(inner), true) => {
                let inner_sat = self.eval(inner, cache);
                if let Some(run) = self.shortest_path(s, &inner_sat) {
                    path.extend(run.into_iter().skip(1));
                    self.explain(inner, true, path, cache);
                }
            }
            (Formula::Ag(inner), false) => {
                let violating = negate(self.eval(inner, cache));
                if let Some(run) = self.shortest_path(s, &violating) {
                    path.extend(run.into_iter().skip(1));
                    self.explain(inner, false, path, cache);
                }
            }
            // Universal claims need no run beyond the current state.
            (Formula::Ex(_) | Formula::Ef(_), false) | (Formula::Ag(_), true) => {}
        }
    }
}

fn negate(sat: Vec<bool>) -> Vec<bool> {
    sat.into_iter().map(|b| !b).collect()
}
