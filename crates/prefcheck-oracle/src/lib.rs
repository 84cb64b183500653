#![doc = include_str!("../README.md")]

//! Verification-oracle boundary for preference reasoning.
//!
//! The reasoning engine never sees the induced preference graph. It phrases
//! every question as a [`formula::Formula`] over the oracle's transition
//! system and reads back a boolean verdict plus, on falsification, a
//! compressed [`oracle::Witness`].

pub mod backends;
pub mod formula;
pub mod oracle;

pub use formula::Formula;
pub use oracle::{Oracle, OracleQuery, QueryKind, Verdict, Witness, WitnessStep};
