//! Superposition
//!
//! The equality-handling analogue of resolution: a selected positive
//! equality `l = r` rewrites a unifiable non-variable subterm in a selected
//! literal of another clause. Both directions are driven by the term
//! indices: the given clause acts as the equation against the active
//! rewritable-subterm index, and as the rewritten clause against the active
//! equation-side index.

use super::common::{apply_clause, rewrite_admissible, side_literals};
use crate::fol::{ArgOrder, Bank, BankedSubst, Clause, Inference, Rule, Term, VarRenamer};
use crate::index::{IndexKind, IndexManager, Retrieval, QUERY_BANK, RESULT_BANK};
use crate::saturation::context::ProverContext;
use crate::saturation::rule::GeneratingRule;
use std::sync::Arc;

pub struct Superposition;

impl GeneratingRule for Superposition {
    fn name(&self) -> &'static str {
        "superposition"
    }

    fn required_indices(&self) -> &'static [IndexKind] {
        &[IndexKind::SuperpositionLhs, IndexKind::SuperpositionSubterms]
    }

    fn generate(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> Vec<Arc<Clause>> {
        let mut conclusions = Vec::new();
        self.given_as_equation(given, selected, ctx, indices, &mut conclusions);
        self.given_as_target(given, selected, ctx, indices, &mut conclusions);
        conclusions
    }
}

impl Superposition {
    /// Direction 1: a selected equation of the given clause rewrites
    /// subterms of active clauses.
    fn given_as_equation(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        indices: &IndexManager,
        conclusions: &mut Vec<Arc<Clause>>,
    ) {
        let subterm_index = match indices.superposition_subterms() {
            Some(index) => index,
            None => return,
        };

        for &i in selected {
            let lit_id = given.literals[i];
            let lit = ctx.store.lit(lit_id);
            if !lit.polarity || !lit.is_equality() {
                continue;
            }
            let sides: Vec<(Term, Term)> = match ctx.ordering.orient_equality(&ctx.store, lit_id) {
                ArgOrder::Greater => vec![(lit.args[0], lit.args[1])],
                ArgOrder::Less => vec![(lit.args[1], lit.args[0])],
                ArgOrder::Incomparable => {
                    vec![(lit.args[0], lit.args[1]), (lit.args[1], lit.args[0])]
                }
                ArgOrder::Equal | ArgOrder::Unknown => continue,
            };

            for (lhs, rhs) in sides {
                if lhs.is_var() {
                    continue;
                }
                let hits: Vec<_> = subterm_index
                    .query(&ctx.store, lhs, Retrieval::Unifications)
                    .map(|(entry, subst)| (entry.clone(), subst))
                    .collect();
                for (entry, subst) in hits {
                    self.build_conclusion(
                        ctx,
                        given,
                        i,
                        lhs,
                        rhs,
                        QUERY_BANK,
                        &entry.clause,
                        entry.lit_index,
                        entry.term,
                        RESULT_BANK,
                        &subst,
                        conclusions,
                    );
                }
            }
        }
    }

    /// Direction 2: active equations rewrite subterms of the given clause.
    fn given_as_target(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        indices: &IndexManager,
        conclusions: &mut Vec<Arc<Clause>>,
    ) {
        let lhs_index = match indices.superposition_lhs() {
            Some(index) => index,
            None => return,
        };

        for &i in selected {
            let mut subterms = Vec::new();
            for &arg in ctx.store.lit(given.literals[i]).args.iter() {
                ctx.store.non_var_subterms(arg, &mut subterms);
            }

            for &u in &subterms {
                let hits: Vec<_> = lhs_index
                    .query(&ctx.store, u, Retrieval::Unifications)
                    .map(|(entry, subst)| (entry.clone(), subst))
                    .collect();
                for (entry, subst) in hits {
                    // The indexed side is the equation's lhs; its partner in
                    // the same literal is the rhs.
                    let eq_lit = ctx.store.lit(entry.clause.literals[entry.lit_index]);
                    let rhs = if eq_lit.args[0] == entry.term {
                        eq_lit.args[1]
                    } else {
                        eq_lit.args[0]
                    };
                    // Skip the degenerate self-overlap of an equation with
                    // its own indexed side at the root.
                    if entry.clause.id == given.id && entry.lit_index == i && u == entry.term {
                        continue;
                    }
                    self.build_conclusion(
                        ctx,
                        &entry.clause.clone(),
                        entry.lit_index,
                        entry.term,
                        rhs,
                        RESULT_BANK,
                        given,
                        i,
                        u,
                        QUERY_BANK,
                        &subst,
                        conclusions,
                    );
                }
            }
        }
    }

    /// Assemble one superposition conclusion, enforcing the ordering
    /// constraints after the unifier is known.
    #[allow(clippy::too_many_arguments)]
    fn build_conclusion(
        &self,
        ctx: &mut ProverContext,
        from_clause: &Arc<Clause>,
        from_idx: usize,
        lhs: Term,
        rhs: Term,
        from_bank: Bank,
        into_clause: &Arc<Clause>,
        into_idx: usize,
        u: Term,
        into_bank: Bank,
        subst: &BankedSubst,
        conclusions: &mut Vec<Arc<Clause>>,
    ) {
        debug_assert!(!u.is_var());
        let mut renamer = VarRenamer::new();

        let lhs_applied = subst.apply(&mut ctx.store, lhs, from_bank, &mut renamer);
        let rhs_applied = subst.apply(&mut ctx.store, rhs, from_bank, &mut renamer);
        if !rewrite_admissible(ctx, lhs_applied, rhs_applied) {
            return;
        }

        // Superposition into an equality: the rewritten side must not be
        // smaller than the other side after the unifier.
        let into_lit_id = into_clause.literals[into_idx];
        {
            let into_lit = ctx.store.lit(into_lit_id);
            if into_lit.is_equality() {
                let (s0, s1) = (into_lit.args[0], into_lit.args[1]);
                let in0 = ctx.store.contains_subterm(s0, u);
                let in1 = ctx.store.contains_subterm(s1, u);
                let s0_applied = subst.apply(&mut ctx.store, s0, into_bank, &mut renamer);
                let s1_applied = subst.apply(&mut ctx.store, s1, into_bank, &mut renamer);
                let ok0 = in0 && rewrite_admissible(ctx, s0_applied, s1_applied);
                let ok1 = in1 && rewrite_admissible(ctx, s1_applied, s0_applied);
                if !ok0 && !ok1 {
                    return;
                }
            }
        }

        // Rewrite: apply the unifier to the target literal, then replace the
        // instantiated redex by the instantiated right-hand side.
        let into_lit_applied =
            subst.apply_literal(&mut ctx.store, into_lit_id, into_bank, &mut renamer);
        let rewritten =
            ctx.store
                .replace_in_literal(into_lit_applied, lhs_applied, rhs_applied);
        if rewritten == into_lit_applied {
            return;
        }

        let applied_from = apply_clause(ctx, from_clause, from_bank, subst, &mut renamer);
        let applied_into = apply_clause(ctx, into_clause, into_bank, subst, &mut renamer);

        let mut literals: Vec<_> = side_literals(&applied_from, from_idx).collect();
        literals.push(rewritten);
        literals.extend(side_literals(&applied_into, into_idx));

        let inference = Inference::new(
            Rule::Superposition,
            vec![Arc::clone(from_clause), Arc::clone(into_clause)],
        );
        if let Some(conclusion) = ctx.derived_clause(inference, literals) {
            ctx.statistics.superpositions += 1;
            conclusions.push(conclusion);
        }
    }
}
