#![doc = include_str!("../README.md")]

//! Reasoning engine for preference specifications.
//!
//! Turns dominance, consistency and ordering questions into sequences of
//! oracle queries and rebuilds outcomes, proofs, cycles and levels from the
//! verdicts and witness traces that come back.

pub mod config;
pub mod error;
pub mod protocol;
pub mod query;
pub mod reasoner;
pub mod reconstruction;
pub mod session;

pub use config::{ReasonerConfig, TopLevelPolicy};
pub use error::{ReasonError, ReconstructionError, SessionMisuse};
pub use query::{PreferenceQuery, QueryResult, QueryType};
pub use reasoner::acyclic::AcyclicReasoner;
pub use reasoner::cyclic::{CyclicLevel, CyclicReasoner};
pub use reasoner::Reasoner;
pub use session::{Activity, OracleStats, Session};
