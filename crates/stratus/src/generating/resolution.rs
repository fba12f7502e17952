//! Binary resolution

use super::common::{apply_clause, cut_literal_admissible, side_literals};
use crate::fol::{BankedSubst, Clause, Inference, Rule, VarRenamer};
use crate::index::{IndexKind, IndexManager};
use crate::saturation::context::ProverContext;
use crate::saturation::rule::GeneratingRule;
use std::sync::Arc;

const GIVEN_BANK: u8 = 0;
const PARTNER_BANK: u8 = 1;

/// Binary resolution over selected literals.
///
/// Equality literals are left to superposition and equality resolution.
pub struct BinaryResolution;

impl GeneratingRule for BinaryResolution {
    fn name(&self) -> &'static str {
        "binary resolution"
    }

    fn required_indices(&self) -> &'static [IndexKind] {
        &[IndexKind::UnifiableLiterals]
    }

    fn generate(
        &self,
        given: &Arc<Clause>,
        selected: &[usize],
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> Vec<Arc<Clause>> {
        let mut conclusions = Vec::new();
        let literal_index = match indices.unifiable_literals() {
            Some(index) => index,
            None => return conclusions,
        };

        for &i in selected {
            let given_lit = given.literals[i];
            let (predicate, polarity, is_eq) = {
                let l = ctx.store.lit(given_lit);
                (l.predicate, l.polarity, l.is_equality())
            };
            if is_eq {
                continue;
            }

            // Partners carry the complementary literal among their selection.
            let partners: Vec<_> = literal_index
                .candidates(predicate, !polarity)
                .map(|e| (Arc::clone(&e.clause), e.lit_index))
                .collect();

            for (partner, j) in partners {
                let partner_lit = partner.literals[j];
                let mut subst = BankedSubst::new();
                if !subst.unify_literal_args(
                    &ctx.store,
                    given_lit,
                    GIVEN_BANK,
                    partner_lit,
                    PARTNER_BANK,
                ) {
                    continue;
                }

                let mut renamer = VarRenamer::new();
                let applied_given = apply_clause(ctx, given, GIVEN_BANK, &subst, &mut renamer);
                let applied_partner =
                    apply_clause(ctx, &partner, PARTNER_BANK, &subst, &mut renamer);

                if !cut_literal_admissible(ctx, &applied_given, i)
                    || !cut_literal_admissible(ctx, &applied_partner, j)
                {
                    continue;
                }

                let mut literals: Vec<_> = side_literals(&applied_given, i).collect();
                literals.extend(side_literals(&applied_partner, j));

                let inference =
                    Inference::new(Rule::Resolution, vec![Arc::clone(given), partner]);
                if let Some(conclusion) = ctx.derived_clause(inference, literals) {
                    ctx.statistics.resolutions += 1;
                    conclusions.push(conclusion);
                }
            }
        }
        conclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Color, InputKind};
    use crate::saturation::context::StrategyOptions;
    use crate::saturation::selection::SelectionFn;

    fn setup() -> (ProverContext, IndexManager) {
        let ctx = ProverContext::new(StrategyOptions::default());
        let mut indices = IndexManager::new();
        indices.request(IndexKind::UnifiableLiterals, &ctx.store, &ctx.ordering);
        (ctx, indices)
    }

    fn select_all(ctx: &ProverContext, clause: &Clause) -> Box<[usize]> {
        SelectionFn::All.select(&ctx.store, &ctx.ordering, clause)
    }

    #[test]
    fn test_ground_resolution() {
        let (mut ctx, mut indices) = setup();
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let p = ctx.signature.intern_predicate("p", 1);

        let pa = ctx.store.literal(p, true, &[a]);
        let npa = ctx.store.literal(p, false, &[a]);

        let c1 = ctx.input_clause(vec![pa], InputKind::Axiom, Color::Transparent);
        let c2 = ctx.input_clause(vec![npa], InputKind::Axiom, Color::Transparent);

        let sel2 = select_all(&ctx, &c2);
        indices.insert(&ctx.store, &ctx.ordering, &c2, &sel2);

        let sel1 = select_all(&ctx, &c1);
        let conclusions = BinaryResolution.generate(&c1, &sel1, &mut ctx, &indices);
        assert_eq!(conclusions.len(), 1);
        assert!(conclusions[0].is_empty());
    }

    #[test]
    fn test_resolution_instantiates() {
        // p(X) | q(X) against ~p(a) gives q(a)
        let (mut ctx, mut indices) = setup();
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let x = ctx.store.var(0);
        let p = ctx.signature.intern_predicate("p", 1);
        let q = ctx.signature.intern_predicate("q", 1);

        let px = ctx.store.literal(p, true, &[x]);
        let qx = ctx.store.literal(q, true, &[x]);
        let npa = ctx.store.literal(p, false, &[a]);

        let c1 = ctx.input_clause(vec![px, qx], InputKind::Axiom, Color::Transparent);
        let c2 = ctx.input_clause(vec![npa], InputKind::NegatedConjecture, Color::Transparent);

        let sel2 = select_all(&ctx, &c2);
        indices.insert(&ctx.store, &ctx.ordering, &c2, &sel2);

        let sel1 = select_all(&ctx, &c1);
        let conclusions = BinaryResolution.generate(&c1, &sel1, &mut ctx, &indices);
        assert_eq!(conclusions.len(), 1);
        let conclusion = &conclusions[0];
        assert_eq!(conclusion.literals.len(), 1);
        let qa = ctx.store.literal(q, true, &[a]);
        assert_eq!(conclusion.literals[0], qa);
        assert_eq!(conclusion.kind, InputKind::NegatedConjecture);
    }

    #[test]
    fn test_ordering_constraint_blocks_non_maximal_cut() {
        // In p(a) | q(f(a)), the literal p(a) is dominated by q(f(a)):
        // resolving on p must be skipped.
        let (mut ctx, mut indices) = setup();
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let f = ctx.signature.intern_function("f", 1);
        let fa = ctx.store.app(f, &[a]);
        let p = ctx.signature.intern_predicate("p", 1);
        let q = ctx.signature.intern_predicate("q", 1);

        let pa = ctx.store.literal(p, true, &[a]);
        let qfa = ctx.store.literal(q, true, &[fa]);
        let npa = ctx.store.literal(p, false, &[a]);

        let c1 = ctx.input_clause(vec![pa, qfa], InputKind::Axiom, Color::Transparent);
        let c2 = ctx.input_clause(vec![npa], InputKind::Axiom, Color::Transparent);

        let sel2 = select_all(&ctx, &c2);
        indices.insert(&ctx.store, &ctx.ordering, &c2, &sel2);

        // Force both literals eligible so only the ordering constraint decides
        let conclusions = BinaryResolution.generate(&c1, &[0, 1], &mut ctx, &indices);
        assert!(conclusions.is_empty());
    }

    #[test]
    fn test_shared_variable_names_need_no_renaming() {
        // p(X) against ~p(f(X)): the two X are different variables because
        // the premises live in different banks.
        let (mut ctx, mut indices) = setup();
        let x = ctx.store.var(0);
        let f = ctx.signature.intern_function("f", 1);
        let fx = ctx.store.app(f, &[x]);
        let p = ctx.signature.intern_predicate("p", 1);

        let px = ctx.store.literal(p, true, &[x]);
        let npfx = ctx.store.literal(p, false, &[fx]);

        let c1 = ctx.input_clause(vec![px], InputKind::Axiom, Color::Transparent);
        let c2 = ctx.input_clause(vec![npfx], InputKind::Axiom, Color::Transparent);

        let sel2 = select_all(&ctx, &c2);
        indices.insert(&ctx.store, &ctx.ordering, &c2, &sel2);

        let sel1 = select_all(&ctx, &c1);
        let conclusions = BinaryResolution.generate(&c1, &sel1, &mut ctx, &indices);
        assert_eq!(conclusions.len(), 1);
        assert!(conclusions[0].is_empty());
    }
}
