//! Equality resolution and equality factoring

use super::common::{apply_clause, cut_literal_admissible, rewrite_admissible, side_literals};
use crate::fol::{BankedSubst, Clause, Inference, Rule, VarRenamer};
use crate::index::IndexManager;
use crate::saturation::context::ProverContext;
use crate::saturation::rule::GeneratingRule;
use std::sync::Arc;

const BANK: u8 = 0;

/// Equality resolution: a selected negative equality `s != t` is resolved
/// away by unifying its sides.
pub struct EqualityResolution;

impl GeneratingRule for EqualityResolution {
    fn name(&self) -> &'static str {
        "equality resolution"
    }

    fn generate(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        _indices: &IndexManager,
    ) -> Vec<Arc<Clause>> {
        let mut conclusions = Vec::new();
        for &i in selected {
            let lit_id = given.literals[i];
            let (is_neg_eq, lhs, rhs) = {
                let lit = ctx.store.lit(lit_id);
                if lit.polarity || !lit.is_equality() {
                    (false, None, None)
                } else {
                    (true, Some(lit.args[0]), Some(lit.args[1]))
                }
            };
            if !is_neg_eq {
                continue;
            }

            let mut subst = BankedSubst::new();
            if !subst.unify(&ctx.store, lhs.unwrap(), BANK, rhs.unwrap(), BANK) {
                continue;
            }

            let mut renamer = VarRenamer::new();
            let applied = apply_clause(ctx, given, BANK, &subst, &mut renamer);
            if !cut_literal_admissible(ctx, &applied, i) {
                continue;
            }

            let literals: Vec<_> = side_literals(&applied, i).collect();
            let inference = Inference::new(Rule::EqualityResolution, vec![Arc::clone(given)]);
            if let Some(conclusion) = ctx.derived_clause(inference, literals) {
                ctx.statistics.equality_resolutions += 1;
                conclusions.push(conclusion);
            }
        }
        conclusions
    }
}

/// Equality factoring: from `s = t | s' = t' | C` with `σ = mgu(s, s')`,
/// derive `(t != t' | s' = t' | C)σ`.
pub struct EqualityFactoring;

impl GeneratingRule for EqualityFactoring {
    fn name(&self) -> &'static str {
        "equality factoring"
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

        for &i in selected {
            let lit_i = given.literals[i];
            {
                let l = ctx.store.lit(lit_i);
                if !l.polarity || !l.is_equality() {
                    continue;
                }
            }
            for j in 0..given.literals.len() {
                if i == j {
                    continue;
                }
                let lit_j = given.literals[j];
                {
                    let l = ctx.store.lit(lit_j);
                    if !l.polarity || !l.is_equality() {
                        continue;
                    }
                }

                // Try every orientation pair of the two equalities.
                for (si, ti) in [(0usize, 1usize), (1, 0)] {
                    for (sj, tj) in [(0usize, 1usize), (1, 0)] {
                        let (s, t, sort) = {
                            let l = ctx.store.lit(lit_i);
                            (l.args[si], l.args[ti], l.sort)
                        };
                        let (s2, t2) = {
                            let l = ctx.store.lit(lit_j);
                            (l.args[sj], l.args[tj])
                        };

                        let mut subst = BankedSubst::new();
                        if !subst.unify(&ctx.store, s, BANK, s2, BANK) {
                            continue;
                        }

                        let mut renamer = VarRenamer::new();
                        let s_applied = subst.apply(&mut ctx.store, s, BANK, &mut renamer);
                        let t_applied = subst.apply(&mut ctx.store, t, BANK, &mut renamer);
                        if !rewrite_admissible(ctx, s_applied, t_applied) {
                            continue;
                        }
                        let t2_applied = subst.apply(&mut ctx.store, t2, BANK, &mut renamer);

                        let applied = apply_clause(ctx, given, BANK, &subst, &mut renamer);
                        let mut literals: Vec<_> = side_literals(&applied, i).collect();
                        let disequation =
                            ctx.store.equality(false, t_applied, t2_applied, sort);
                        literals.push(disequation);

                        let inference =
                            Inference::new(Rule::EqualityFactoring, vec![Arc::clone(given)]);
                        if let Some(conclusion) = ctx.derived_clause(inference, literals) {
                            ctx.statistics.equality_factorings += 1;
                            conclusions.push(conclusion);
                        }
                    }
                }
            }
        }
        conclusions
    }
}
