use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the cyclic reasoner treats the top level of a weak order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelPolicy {
    /// Assume the top level has no Type I outcomes and skip their discovery.
    /// A singleton component found there is reclassified as Type I with a
    /// warning.
    #[default]
    AssumeNone,
    /// Run Type I discovery at the top level as well.
    Search,
}

/// Knobs fixed at reasoner construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Cap on outcomes emitted per session; `None` means unbounded.
    pub max_outcomes: Option<usize>,
    /// Ask the refutation query so positive dominance answers carry a proof.
    pub obtain_proof: bool,
    /// Log every oracle round trip at debug level.
    pub log_queries: bool,
    pub top_level_type_i: TopLevelPolicy,
    /// Time budget for the oracle calls of one session, counted from its
    /// first call and renewed by a reset. `0` disables the deadline.
    pub timeout_secs: u64,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            max_outcomes: None,
            obtain_proof: true,
            log_queries: false,
            top_level_type_i: TopLevelPolicy::AssumeNone,
            timeout_secs: 0,
        }
    }
}

impl ReasonerConfig {
    pub fn with_max_outcomes(mut self, max_outcomes: usize) -> Self {
        self.max_outcomes = Some(max_outcomes);
        self
    }

    pub fn with_obtain_proof(mut self, obtain_proof: bool) -> Self {
        self.obtain_proof = obtain_proof;
        self
    }

    pub fn with_log_queries(mut self, log_queries: bool) -> Self {
        self.log_queries = log_queries;
        self
    }

    pub fn with_top_level_type_i(mut self, policy: TopLevelPolicy) -> Self {
        self.top_level_type_i = policy;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The per-session budget, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
