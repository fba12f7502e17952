//! Demodulation: simplifying rewriting by unit equalities
//!
//! Forward demodulation rewrites a new clause with active unit equalities
//! found through the demodulation-lhs index; backward demodulation uses a
//! freshly activated unit equality to rewrite active clauses through the
//! rewritable-subterm index. A rewrite `u -> rσ` is accepted only when
//! `u ≻ rσ` — skipped entirely for pre-ordered equations, whose cached
//! argument-order tag already guarantees it — and, when `u` is a side of an
//! equality literal, only when the top-level redundancy check passes.

use crate::fol::{
    ArgOrder, BankedSubst, Clause, Inference, LiteralId, Ordering, Rule, Term, VarId, VarRenamer,
};
use crate::index::{IndexKind, IndexManager, Retrieval, QUERY_BANK, RESULT_BANK};
use crate::saturation::context::{ActiveSet, ProverContext};
use crate::saturation::rule::{BackwardChange, BackwardRule, ForwardOutcome, ForwardRule};
use std::collections::HashSet;
use std::sync::Arc;

/// Forward demodulation against active unit equalities.
pub struct ForwardDemodulation;

impl ForwardRule for ForwardDemodulation {
    fn name(&self) -> &'static str {
        "forward demodulation"
    }

    fn required_indices(&self) -> &'static [IndexKind] {
        &[IndexKind::DemodulationLhs]
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> ForwardOutcome {
        if indices.demodulation_lhs().is_none() {
            return ForwardOutcome::Keep;
        }

        let next_fresh = clause.max_var(&ctx.store).map_or(0, |VarId(i)| i + 1);
        let mut attempted: HashSet<Term> = HashSet::new();

        for (li, &lit_id) in clause.literals.iter().enumerate() {
            let mut subterms = Vec::new();
            for &arg in ctx.store.lit(lit_id).args.iter() {
                ctx.store.non_var_subterms(arg, &mut subterms);
            }

            for &u in &subterms {
                // Shared handles make the attempted set catch every repeated
                // occurrence of the same subterm across the clause.
                if !attempted.insert(u) {
                    continue;
                }

                let hits: Vec<(Arc<Clause>, LiteralId, Term, BankedSubst)> = {
                    let index = indices.demodulation_lhs().unwrap();
                    index
                        .query(&ctx.store, u, Retrieval::Generalizations)
                        .map(|(entry, subst)| {
                            (
                                Arc::clone(&entry.clause),
                                entry.clause.literals[entry.lit_index],
                                entry.term,
                                subst,
                            )
                        })
                        .collect()
                };

                for (unit, eq_lit, lhs, subst) in hits {
                    if unit.id == clause.id {
                        continue;
                    }
                    let (rhs, sort) = {
                        let eq = ctx.store.lit(eq_lit);
                        let rhs = if eq.args[0] == lhs { eq.args[1] } else { eq.args[0] };
                        (rhs, eq.sort)
                    };

                    let mut renamer = VarRenamer::keeping(QUERY_BANK, next_fresh);
                    let r_applied = subst.apply(&mut ctx.store, rhs, RESULT_BANK, &mut renamer);

                    // Pre-ordered equations need no per-instance check.
                    let preordered = matches!(
                        ctx.store.lit(eq_lit).arg_order(),
                        ArgOrder::Greater | ArgOrder::Less
                    );
                    if !preordered
                        && ctx.ordering.compare(&ctx.store, u, r_applied) != Ordering::Greater
                    {
                        continue;
                    }

                    if !self.toplevel_check(ctx, clause, li, lit_id, u, r_applied, sort) {
                        continue;
                    }

                    let rewritten = ctx.store.replace_in_literal(lit_id, u, r_applied);
                    if rewritten == lit_id {
                        continue;
                    }

                    // A rewrite producing t = t makes the clause a tautology.
                    {
                        let r = ctx.store.lit(rewritten);
                        if r.polarity && r.is_equality() && r.args[0] == r.args[1] {
                            ctx.statistics.forward_demodulations_to_tautology += 1;
                            return ForwardOutcome::Deleted;
                        }
                    }

                    let literals: Vec<LiteralId> = clause
                        .literals
                        .iter()
                        .enumerate()
                        .map(|(k, &l)| if k == li { rewritten } else { l })
                        .collect();
                    let inference = Inference::new(
                        Rule::ForwardDemodulation,
                        vec![Arc::clone(clause), unit],
                    );
                    if let Some(replacement) = ctx.derived_clause(inference, literals) {
                        ctx.statistics.forward_demodulations += 1;
                        return ForwardOutcome::Replaced(replacement);
                    }
                }
            }
        }
        ForwardOutcome::Keep
    }
}

impl ForwardDemodulation {
    /// Top-level redundancy check: rewriting one side of an equality literal
    /// is refused when the instantiated equation would be maximal in the
    /// clause, because
    ///
    /// ```text
    /// s = t     s = t1 \/ C
    /// ---------------------
    ///      t = t1 \/ C
    /// ```
    ///
    /// with `t > t1` and `s = t > C` does not preserve completeness.
    #[allow(clippy::too_many_arguments)]
    fn toplevel_check(
        &self,
        ctx: &mut ProverContext,
        clause: &Clause,
        li: usize,
        lit_id: LiteralId,
        u: Term,
        r_applied: Term,
        sort: crate::fol::SortId,
    ) -> bool {
        let (is_eq, other) = {
            let lit = ctx.store.lit(lit_id);
            if !lit.is_equality() || (lit.args[0] != u && lit.args[1] != u) {
                return true;
            }
            let other = if lit.args[0] == u { lit.args[1] } else { lit.args[0] };
            (true, other)
        };
        debug_assert!(is_eq);

        if ctx.ordering.compare(&ctx.store, r_applied, other) == Ordering::Less {
            return true;
        }

        let eq_inst = ctx.store.equality(true, u, r_applied, sort);
        for (k, &l2) in clause.literals.iter().enumerate() {
            if k == li {
                continue;
            }
            if ctx.ordering.compare_literals(&ctx.store, eq_inst, l2) == Ordering::Less {
                return true;
            }
        }
        false
    }
}

/// Backward demodulation: a freshly activated unit equality rewrites active
/// clauses.
pub struct BackwardDemodulation;

impl BackwardRule for BackwardDemodulation {
    fn name(&self) -> &'static str {
        "backward demodulation"
    }

    fn required_indices(&self) -> &'static [IndexKind] {
        &[IndexKind::RewritableSubterms]
    }

    fn simplify(
        &self,
        given: &Arc<Clause>,
        ctx: &mut ProverContext,
        _active: &ActiveSet,
        indices: &IndexManager,
    ) -> Vec<BackwardChange> {
        let mut changes = Vec::new();
        if indices.rewritable_subterms().is_none() {
            return changes;
        }
        if given.literals.len() != 1 {
            return changes;
        }
        let eq_lit = given.literals[0];
        {
            let lit = ctx.store.lit(eq_lit);
            if !lit.polarity || !lit.is_equality() {
                return changes;
            }
        }
        let (lhs, rhs) = match ctx.ordering.greater_side(&ctx.store, eq_lit) {
            Some(sides) => sides,
            None => return changes,
        };
        if lhs.is_var() {
            return changes;
        }

        let hits: Vec<(Arc<Clause>, usize, Term, BankedSubst)> = {
            let index = indices.rewritable_subterms().unwrap();
            index
                .query(&ctx.store, lhs, Retrieval::Instances)
                .map(|(entry, subst)| {
                    (
                        Arc::clone(&entry.clause),
                        entry.lit_index,
                        entry.term,
                        subst,
                    )
                })
                .collect()
        };

        let mut touched: HashSet<u32> = HashSet::new();
        for (target, li, u, subst) in hits {
            if target.id == given.id || touched.contains(&target.id) {
                continue;
            }
            let next_fresh = target.max_var(&ctx.store).map_or(0, |VarId(i)| i + 1);
            let mut renamer = VarRenamer::keeping(RESULT_BANK, next_fresh);
            let r_applied = subst.apply(&mut ctx.store, rhs, QUERY_BANK, &mut renamer);

            if ctx.ordering.compare(&ctx.store, u, r_applied) != Ordering::Greater {
                continue;
            }

            let lit_id = target.literals[li];
            let rewritten = ctx.store.replace_in_literal(lit_id, u, r_applied);
            if rewritten == lit_id {
                continue;
            }
            let literals: Vec<LiteralId> = target
                .literals
                .iter()
                .enumerate()
                .map(|(k, &l)| if k == li { rewritten } else { l })
                .collect();
            let inference = Inference::new(
                Rule::BackwardDemodulation,
                vec![Arc::clone(&target), Arc::clone(given)],
            );
            if let Some(replacement) = ctx.derived_clause(inference, literals) {
                ctx.statistics.backward_demodulations += 1;
                touched.insert(target.id);
                changes.push(BackwardChange {
                    target,
                    replacement: Some(replacement),
                });
            }
        }
        changes
    }
}
