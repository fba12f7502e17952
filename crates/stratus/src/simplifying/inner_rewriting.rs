//! Inner rewriting
//!
//! A negative equality literal with a strictly greater side is used as a
//! rewrite rule inside its own clause: the first such equality rewrites
//! every other literal. If any rewrite produces a reflexive equality the
//! whole clause is a tautology and is deleted.

use crate::fol::{Inference, LiteralId, Rule};
use crate::index::IndexManager;
use crate::saturation::context::ProverContext;
use crate::saturation::rule::{ForwardOutcome, ForwardRule};
use crate::fol::Clause;
use std::sync::Arc;

pub struct InnerRewriting;

impl ForwardRule for InnerRewriting {
    fn name(&self) -> &'static str {
        "inner rewriting"
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        _indices: &IndexManager,
    ) -> ForwardOutcome {
        if clause.literals.len() < 2 {
            return ForwardOutcome::Keep;
        }

        for (i, &rw_lit) in clause.literals.iter().enumerate() {
            {
                let lit = ctx.store.lit(rw_lit);
                if lit.polarity || !lit.is_equality() {
                    continue;
                }
            }
            let (lhs, rhs) = match ctx.ordering.greater_side(&ctx.store, rw_lit) {
                Some(sides) => sides,
                None => continue,
            };

            let mut changed = false;
            let mut literals: Vec<LiteralId> = Vec::with_capacity(clause.literals.len());
            for (j, &lit) in clause.literals.iter().enumerate() {
                if j == i {
                    literals.push(lit);
                    continue;
                }
                let rewritten = ctx.store.replace_in_literal(lit, lhs, rhs);
                if rewritten != lit {
                    changed = true;
                    let r = ctx.store.lit(rewritten);
                    if r.polarity && r.is_equality() && r.args[0] == r.args[1] {
                        ctx.statistics.inner_rewrites_to_tautology += 1;
                        return ForwardOutcome::Deleted;
                    }
                }
                literals.push(rewritten);
            }

            if changed {
                let inference = Inference::new(Rule::InnerRewriting, vec![Arc::clone(clause)]);
                if let Some(replacement) = ctx.derived_clause(inference, literals) {
                    ctx.statistics.inner_rewrites += 1;
                    return ForwardOutcome::Replaced(replacement);
                }
            }
        }
        ForwardOutcome::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Color, InputKind, SortId};
    use crate::saturation::context::StrategyOptions;

    #[test]
    fn test_negative_equality_rewrites_siblings() {
        // f(a) != a | p(f(a)) rewrites to f(a) != a | p(a)
        let mut ctx = ProverContext::new(StrategyOptions::default());
        let indices = IndexManager::new();
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let f = ctx.signature.intern_function("f", 1);
        let fa = ctx.store.app(f, &[a]);
        let p = ctx.signature.intern_predicate("p", 1);

        let diseq = ctx.store.equality(false, fa, a, SortId::INDIVIDUAL);
        let pfa = ctx.store.literal(p, true, &[fa]);
        let clause = ctx.input_clause(vec![diseq, pfa], InputKind::Axiom, Color::Transparent);

        match InnerRewriting.simplify(&clause, &mut ctx, &indices) {
            ForwardOutcome::Replaced(replacement) => {
                let pa = ctx.store.literal(p, true, &[a]);
                assert_eq!(replacement.literals, vec![diseq, pa]);
                assert_eq!(ctx.statistics.inner_rewrites, 1);
            }
            other => panic!("expected replacement, got {:?}", other),
        }
    }

    #[test]
    fn test_rewrite_to_tautology_deletes_clause() {
        // f(a) != a | f(a) = a: rewriting the positive literal gives a = a
        let mut ctx = ProverContext::new(StrategyOptions::default());
        let indices = IndexManager::new();
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let f = ctx.signature.intern_function("f", 1);
        let fa = ctx.store.app(f, &[a]);

        let diseq = ctx.store.equality(false, fa, a, SortId::INDIVIDUAL);
        let eq = ctx.store.equality(true, fa, a, SortId::INDIVIDUAL);
        let clause = ctx.input_clause(vec![diseq, eq], InputKind::Axiom, Color::Transparent);

        assert!(matches!(
            InnerRewriting.simplify(&clause, &mut ctx, &indices),
            ForwardOutcome::Deleted
        ));
        assert_eq!(ctx.statistics.inner_rewrites_to_tautology, 1);
    }

    #[test]
    fn test_unoriented_equality_does_not_rewrite() {
        // X != Y has no greater side
        let mut ctx = ProverContext::new(StrategyOptions::default());
        let indices = IndexManager::new();
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let p = ctx.signature.intern_predicate("p", 1);

        let diseq = ctx.store.equality(false, x, y, SortId::INDIVIDUAL);
        let px = ctx.store.literal(p, true, &[x]);
        let clause = ctx.input_clause(vec![diseq, px], InputKind::Axiom, Color::Transparent);

        assert!(matches!(
            InnerRewriting.simplify(&clause, &mut ctx, &indices),
            ForwardOutcome::Keep
        ));
    }
}
