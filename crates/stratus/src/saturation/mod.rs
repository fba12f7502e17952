//! The saturation engine: given-clause loop over three clause stores
//!
//! `Saturation` drives one fully parameterized proof attempt. New clauses
//! are forward-simplified against the active set, survivors wait in the
//! passive queue, and the given clause selected from passive is activated,
//! used for backward simplification, and fed to the generating rules.

pub mod algorithm;
pub mod context;
pub mod limits;
pub mod passive;
pub mod rule;
pub mod selection;

pub use algorithm::{Outcome, Saturation};
pub use context::{ActiveSet, ProverContext, StrategyOptions};
pub use limits::Limits;
pub use passive::PassiveQueue;
pub use rule::{BackwardChange, BackwardRule, ForwardOutcome, ForwardRule, GeneratingRule};
pub use selection::SelectionFn;

pub use crate::statistics::TerminationReason;
