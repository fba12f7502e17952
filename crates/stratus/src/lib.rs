//! Stratus: a multi-strategy saturation theorem prover
//!
//! This library implements saturation-based proof search for first-order
//! logic with equality: a perfectly shared term representation, simplification
//! orderings, term indexing, the given-clause algorithm, and a cooperative
//! multi-strategy scheduler.

pub mod batch;
pub mod fol;
pub mod generating;
pub mod index;
pub mod problem;
pub mod proof;
pub mod saturation;
pub mod schedule;
pub mod simplifying;
pub mod statistics;

// Re-export commonly used types from fol
pub use fol::{
    ArgOrder, AuxScope, Clause, Color, Inference, InputKind, Kbo, KboConfig, Literal, Ordering,
    PredicateId, Rule, Signature, Store, Term, TermStore,
};

// Re-export saturation types
pub use saturation::{
    Outcome, ProverContext, Saturation, SelectionFn, StrategyOptions, TerminationReason,
};

// Re-export scheduler types
pub use schedule::{exit_code, Schedule, ScheduleOutcome, Strategy};

pub use problem::{InLiteral, InTerm, Problem, Unit};
pub use proof::Derivation;
pub use statistics::Statistics;
