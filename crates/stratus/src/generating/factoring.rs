//! Factoring

use super::common::{apply_clause, cut_literal_admissible};
use crate::fol::{BankedSubst, Clause, Inference, Rule, VarRenamer};
use crate::index::IndexManager;
use crate::saturation::context::ProverContext;
use crate::saturation::rule::GeneratingRule;
use std::sync::Arc;

const BANK: u8 = 0;

/// Factoring: unify two selected literals of the same polarity and keep one
/// copy under the unifier.
pub struct Factoring;

impl GeneratingRule for Factoring {
    fn name(&self) -> &'static str {
        "factoring"
    }

    fn generate(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        _indices: &IndexManager,
    ) -> Vec<Arc<Clause>> {
        let mut conclusions = Vec::new();
        if given.literals.len() < 2 {
            return conclusions;
        }

        for (si, &i) in selected.iter().enumerate() {
            for &j in &selected[si + 1..] {
                let (lit_i, lit_j) = (given.literals[i], given.literals[j]);
                {
                    let (a, b) = (ctx.store.lit(lit_i), ctx.store.lit(lit_j));
                    if a.polarity != b.polarity || a.predicate != b.predicate || a.is_equality() {
                        continue;
                    }
                }

                let mut subst = BankedSubst::new();
                if !subst.unify_literal_args(&ctx.store, lit_i, BANK, lit_j, BANK) {
                    continue;
                }

                let mut renamer = VarRenamer::new();
                let applied = apply_clause(ctx, given, BANK, &subst, &mut renamer);
                if !cut_literal_admissible(ctx, &applied, i) {
                    continue;
                }

                // Drop the second copy; the dedup in clause construction
                // catches any further collapses.
                let literals: Vec<_> = applied
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != j)
                    .map(|(_, &lit)| lit)
                    .collect();

                let inference = Inference::new(Rule::Factoring, vec![Arc::clone(given)]);
                if let Some(conclusion) = ctx.derived_clause(inference, literals) {
                    ctx.statistics.factorings += 1;
                    conclusions.push(conclusion);
                }
            }
        }
        conclusions
    }
}
