//! Overall deadline for a sequence of oracle calls.

use std::time::{Duration, Instant};

use prefcheck_model::ExclusionSet;

use crate::oracle::{Oracle, OracleQuery, Verdict};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeadlineError {
    #[error("{query} timed out before completion")]
    Expired { query: String },
    #[error("{0}")]
    Backend(String),
}

/// Bounds every call to the wrapped oracle by a shared deadline.
///
/// Calls starting after the deadline are refused. Otherwise the time left is
/// handed to the backend through [`Oracle::set_timeout`] before each call.
#[derive(Debug)]
pub struct DeadlineOracle<O> {
    inner: O,
    deadline: Option<Instant>,
}

impl<O: Oracle> DeadlineOracle<O> {
    /// No deadline until [`DeadlineOracle::set_deadline`] installs one.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            deadline: None,
        }
    }

    pub fn with_deadline(inner: O, deadline: Option<Instant>) -> Self {
        Self { inner, deadline }
    }

    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `Some(Duration::ZERO)` once it has
    /// passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut O {
        &mut self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Oracle> Oracle for DeadlineOracle<O> {
    type Error = DeadlineError;

    fn verify(
        &mut self,
        query: &OracleQuery,
        exclusions: &ExclusionSet,
    ) -> Result<Verdict, Self::Error> {
        let remaining = self.remaining();
        if remaining == Some(Duration::ZERO) {
            return Err(DeadlineError::Expired {
                query: query.label.clone(),
            });
        }
        self.inner.set_timeout(remaining);
        self.inner
            .verify(query, exclusions)
            .map_err(|e| DeadlineError::Backend(e.to_string()))
    }

    /// A caller-supplied budget narrows the deadline, never extends it.
    fn set_timeout(&mut self, timeout: Option<Duration>) {
        if let Some(limit) = timeout.and_then(|t| Instant::now().checked_add(t)) {
            self.deadline = Some(self.deadline.map_or(limit, |d| d.min(limit)));
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
