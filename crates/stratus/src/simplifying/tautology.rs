//! Tautology deletion

use crate::fol::Clause;
use crate::index::IndexManager;
use crate::saturation::context::ProverContext;
use crate::saturation::rule::{ForwardOutcome, ForwardRule};
use std::sync::Arc;

/// Deletes clauses containing complementary literals or a reflexive
/// equality `t = t`.
pub struct TautologyDeletion;

impl TautologyDeletion {
    pub fn is_tautology(ctx: &ProverContext, clause: &Clause) -> bool {
        let store = &ctx.store;
        for (i, &li) in clause.literals.iter().enumerate() {
            let a = store.lit(li);
            if a.polarity && a.is_equality() && a.args[0] == a.args[1] {
                return true;
            }
            for &lj in &clause.literals[i + 1..] {
                let b = store.lit(lj);
                if a.polarity != b.polarity && a.predicate == b.predicate && a.args == b.args {
                    return true;
                }
            }
        }
        false
    }
}

impl ForwardRule for TautologyDeletion {
    fn name(&self) -> &'static str {
        "tautology deletion"
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        _indices: &IndexManager,
    ) -> ForwardOutcome {
        if Self::is_tautology(ctx, clause) {
            ctx.statistics.tautologies_deleted += 1;
            ForwardOutcome::Deleted
        } else {
            ForwardOutcome::Keep
        }
    }
}
