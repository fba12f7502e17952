//! Inference engine traits
//!
//! Rules are pure in their inputs: a generating rule reads the given clause
//! and whatever active clauses its indices reach, and returns fresh
//! conclusions; a simplification rule either keeps, replaces, or deletes a
//! clause, recording the parents used. Rules declare the index kinds they
//! need; the saturation algorithm requests them from the `IndexManager` on
//! attach and releases them on teardown.

use crate::fol::Clause;
use crate::index::{IndexKind, IndexManager};
use crate::saturation::context::{ActiveSet, ProverContext};
use std::sync::Arc;

/// Result of one forward-simplification attempt.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// The clause survives unchanged
    Keep,
    /// The clause is redundant and is discarded
    Deleted,
    /// The clause is replaced by a strictly simpler clause
    Replaced(Arc<Clause>),
}

/// One effect of a backward-simplification pass.
#[derive(Debug)]
pub struct BackwardChange {
    /// Active clause simplified away
    pub target: Arc<Clause>,
    /// Its replacement, if any; `None` deletes the target outright
    pub replacement: Option<Arc<Clause>>,
}

/// A rule producing new clauses from the given clause and the active set.
pub trait GeneratingRule {
    fn name(&self) -> &'static str;

    /// Index kinds this rule queries.
    fn required_indices(&self) -> &'static [IndexKind] {
        &[]
    }

    /// Generate all conclusions with `given`, whose selected literal indices
    /// are `selected`.
    fn generate(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> Vec<Arc<Clause>>;
}

/// A rule simplifying a new clause against the active set.
pub trait ForwardRule {
    fn name(&self) -> &'static str;

    fn required_indices(&self) -> &'static [IndexKind] {
        &[]
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> ForwardOutcome;
}

/// A rule using the given clause to simplify active clauses.
pub trait BackwardRule {
    fn name(&self) -> &'static str;

    fn required_indices(&self) -> &'static [IndexKind] {
        &[]
    }

    fn simplify(
        &self,
        given: &Arc<Clause>,
        ctx: &mut ProverContext,
        active: &ActiveSet,
        indices: &IndexManager,
    ) -> Vec<BackwardChange>;
}
