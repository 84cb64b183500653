//! Per-session reasoning state.
//!
//! A [`Session`] records what earlier operations have learned: excluded
//! outcomes, the maximal outcomes accumulated for the level in progress,
//! finished levels, the emitted-outcome count, and the level history the
//! cyclic reasoner advances one level at a time. It also carries the oracle
//! deadline, started by its first oracle call. Reasoner operations take it
//! by `&mut`; nothing is shared between sessions.

use std::time::{Duration, Instant};

use prefcheck_model::{ExclusionSet, Level, Outcome};

use crate::error::SessionMisuse;

/// What the session has been used for since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    #[default]
    Idle,
    /// Dominance or consistency queries.
    RawQuery,
    /// Next-preferred / weak-order iteration by exclusion.
    PreferredSets,
    /// Level-by-level cyclic ordering.
    CyclicLevels,
}

/// Oracle usage accumulated over a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleStats {
    pub calls: usize,
    pub falsified: usize,
    pub elapsed: Duration,
}

impl OracleStats {
    pub(crate) fn record(&mut self, elapsed: Duration, holds: bool) {
        self.calls += 1;
        if !holds {
            self.falsified += 1;
        }
        self.elapsed += elapsed;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    activity: Activity,
    exclusions: ExclusionSet,
    current_maximal: Level,
    levels: Vec<Level>,
    emitted: usize,
    previous: Level,
    earlier: Level,
    exhausted: bool,
    stats: OracleStats,
    deadline: Option<Instant>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session to its freshly created state, deadline included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Maximal outcomes found so far for the level in progress.
    pub fn current_maximal(&self) -> &Level {
        &self.current_maximal
    }

    /// Levels completed in this session, most preferred first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Most recent level of the cyclic ordering.
    pub fn previous_level(&self) -> &Level {
        &self.previous
    }

    /// Union of every cyclic level before [`Session::previous_level`].
    pub fn earlier_levels(&self) -> &Level {
        &self.earlier
    }

    /// True once the cyclic ordering has produced an empty level.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn stats(&self) -> OracleStats {
        self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut OracleStats {
        &mut self.stats
    }

    /// Deadline for the next oracle call. The first call with a budget
    /// starts the clock; later calls share it until [`Session::reset`].
    pub(crate) fn deadline(&mut self, budget: Option<Duration>) -> Option<Instant> {
        if self.deadline.is_none() {
            self.deadline = budget.and_then(|budget| Instant::now().checked_add(budget));
        }
        self.deadline
    }

    /// Checks that `next` may follow what the session has done so far and
    /// records it.
    pub(crate) fn begin(&mut self, next: Activity) -> Result<(), SessionMisuse> {
        use Activity::*;
        match (self.activity, next) {
            (_, Idle) => {}
            (Idle | RawQuery, RawQuery) if self.exclusions.is_empty() => {}
            (Idle | RawQuery, RawQuery) => return Err(SessionMisuse::RawQueryWithExclusions),
            (PreferredSets | CyclicLevels, RawQuery) => {
                return Err(SessionMisuse::RawQueryDuringOrdering)
            }
            (RawQuery, PreferredSets | CyclicLevels) => {
                return Err(SessionMisuse::OrderingAfterRawQuery)
            }
            (PreferredSets, CyclicLevels) | (CyclicLevels, PreferredSets) => {
                return Err(SessionMisuse::MixedOrderings)
            }
            (Idle, PreferredSets | CyclicLevels)
            | (PreferredSets, PreferredSets)
            | (CyclicLevels, CyclicLevels) => {}
        }
        if next != Idle {
            self.activity = next;
        }
        Ok(())
    }

    /// True when `max` outcomes have already been emitted.
    pub(crate) fn cap_reached(&self, max: Option<usize>) -> bool {
        max.is_some_and(|max| self.emitted >= max)
    }

    pub(crate) fn exclude_all<'a>(&mut self, outcomes: impl IntoIterator<Item = &'a Outcome>) {
        self.exclusions.exclude_all(outcomes);
    }

    /// Adds a newly found maximal outcome; false if it was already known.
    pub(crate) fn record_maximal(&mut self, outcome: Outcome) -> bool {
        let added = self.current_maximal.insert(outcome);
        if added {
            self.emitted += 1;
        }
        added
    }

    /// Excludes the accumulated maximal outcomes and clears the accumulator.
    pub(crate) fn close_current_level(&mut self) -> Level {
        let level = std::mem::take(&mut self.current_maximal);
        self.exclusions.exclude_all(&level);
        level
    }

    pub(crate) fn push_level(&mut self, level: Level) {
        self.levels.push(level);
    }

    /// Shifts the cyclic history: `earlier ∪= previous`, `previous := level`.
    pub(crate) fn advance_cyclic(&mut self, level: Level) {
        let previous = std::mem::replace(&mut self.previous, level.clone());
        self.earlier.extend(&previous);
        self.emitted += level.len();
        self.levels.push(level);
    }

    pub(crate) fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}
