//! Interpreted evaluation: constant folding over theory symbols
//!
//! Ground interpreted function applications over numerals are folded to
//! their values, and decidable interpreted relation literals are simplified
//! away (a true literal makes the clause valid; a false literal is
//! dropped). Checked arithmetic makes overflow a recoverable condition: the
//! affected rewrite is abandoned and counted.

use crate::fol::theory::{self, Interpreted};
use crate::fol::{Clause, Inference, LiteralId, Rule, Term};
use crate::index::IndexManager;
use crate::saturation::context::ProverContext;
use crate::saturation::rule::{ForwardOutcome, ForwardRule};
use std::sync::Arc;

pub struct InterpretedEvaluation;

impl ForwardRule for InterpretedEvaluation {
    fn name(&self) -> &'static str {
        "interpreted evaluation"
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        _indices: &IndexManager,
    ) -> ForwardOutcome {
        let mut changed = false;
        let mut literals: Vec<LiteralId> = Vec::with_capacity(clause.literals.len());

        for &lit_id in &clause.literals {
            let folded = self.fold_literal(ctx, lit_id);
            if folded != lit_id {
                changed = true;
            }

            // Decide interpreted relations over numerals.
            let decided = {
                let lit = ctx.store.lit(folded);
                match ctx.signature.predicate_interpretation(lit.predicate) {
                    Some(op) if op.is_relation() && lit.args.len() == 2 => {
                        theory::evaluate_relation(op, &lit.args, &ctx.store, &ctx.signature)
                            .map(|v| v == lit.polarity)
                    }
                    _ => None,
                }
            };
            match decided {
                Some(true) => {
                    // The literal is valid, hence so is the clause.
                    ctx.statistics.evaluations += 1;
                    return ForwardOutcome::Deleted;
                }
                Some(false) => {
                    changed = true;
                    continue;
                }
                None => literals.push(folded),
            }
        }

        if !changed {
            return ForwardOutcome::Keep;
        }
        let inference = Inference::new(Rule::Evaluation, vec![Arc::clone(clause)]);
        match ctx.derived_clause(inference, literals) {
            Some(replacement) => {
                ctx.statistics.evaluations += 1;
                ForwardOutcome::Replaced(replacement)
            }
            None => ForwardOutcome::Keep,
        }
    }
}

impl InterpretedEvaluation {
    fn fold_literal(&self, ctx: &mut ProverContext, lit_id: LiteralId) -> LiteralId {
        let (predicate, polarity, args, sort, is_eq) = {
            let lit = ctx.store.lit(lit_id);
            (
                lit.predicate,
                lit.polarity,
                lit.args.to_vec(),
                lit.sort,
                lit.is_equality(),
            )
        };
        let folded: Vec<Term> = args.iter().map(|&a| self.fold_term(ctx, a)).collect();
        if folded == args {
            return lit_id;
        }
        if is_eq {
            ctx.store.equality(polarity, folded[0], folded[1], sort)
        } else {
            ctx.store.literal(predicate, polarity, &folded)
        }
    }

    /// Fold interpreted applications bottom-up. Overflow abandons the
    /// affected application only.
    fn fold_term(&self, ctx: &mut ProverContext, term: Term) -> Term {
        let id = match term {
            Term::Var(_) => return term,
            Term::App(id) => id,
        };
        let (functor, args) = {
            let node = ctx.store.node(id);
            (node.functor, node.args.to_vec())
        };
        let folded: Vec<Term> = args.iter().map(|&a| self.fold_term(ctx, a)).collect();
        let rebuilt = if folded == args {
            term
        } else {
            ctx.store.app(functor, &folded)
        };

        let op = match ctx.signature.function_interpretation(functor) {
            Some(op) if !op.is_relation() => op,
            _ => return rebuilt,
        };
        match theory::evaluate_function(op, &folded, &ctx.store, &ctx.signature) {
            Some(value) => theory::numeral_term(value, &mut ctx.store, &mut ctx.signature),
            None => {
                if is_integer_op(op)
                    && folded
                        .iter()
                        .all(|&a| theory::numeral(a, &ctx.store, &ctx.signature).is_some())
                {
                    // All-numeral arguments with no result: checked
                    // arithmetic refused the operation.
                    ctx.statistics.arithmetic_overflow += 1;
                }
                rebuilt
            }
        }
    }
}

fn is_integer_op(op: Interpreted) -> bool {
    matches!(
        op,
        Interpreted::IntSum
            | Interpreted::IntDifference
            | Interpreted::IntProduct
            | Interpreted::IntUnaryMinus
            | Interpreted::IntSuccessor
            | Interpreted::IntQuotient
            | Interpreted::IntRemainder
    )
}
