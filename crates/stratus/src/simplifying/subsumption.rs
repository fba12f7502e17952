//! Subsumption and subsumption resolution
//!
//! The forward direction runs the new clause through the compiled
//! subsumption code tree once, harvesting both plain subsumption (delete
//! the clause) and subsumption resolution (strip one resolved literal).
//! The backward direction uses the freshly activated clause as the
//! subsumer against the active set with a backtracking multi-literal
//! matcher.

use crate::fol::{BankedSubst, Clause, Inference, Rule, TermStore};
use crate::index::{CodeMatch, IndexKind, IndexManager};
use crate::saturation::context::{ActiveSet, ProverContext};
use crate::saturation::rule::{BackwardChange, BackwardRule, ForwardOutcome, ForwardRule};
use std::sync::Arc;

const SUBJECT_BANK: u8 = 0;
const PATTERN_BANK: u8 = 1;

/// Code-tree forward subsumption and subsumption resolution.
pub struct ForwardSubsumption;

impl ForwardRule for ForwardSubsumption {
    fn name(&self) -> &'static str {
        "forward subsumption"
    }

    fn required_indices(&self) -> &'static [IndexKind] {
        &[IndexKind::Subsumption]
    }

    fn simplify(
        &self,
        clause: &Arc<Clause>,
        ctx: &mut ProverContext,
        indices: &IndexManager,
    ) -> ForwardOutcome {
        let tree = match indices.subsumption() {
            Some(tree) => tree,
            None => return ForwardOutcome::Keep,
        };

        match tree.query(&ctx.store, &clause.literals, clause.color) {
            Some(CodeMatch::Subsumption { subsumer }) => {
                debug_assert!(subsumer.id != clause.id);
                ctx.statistics.forward_subsumed += 1;
                ForwardOutcome::Deleted
            }
            Some(CodeMatch::SubsumptionResolution { subsumer, resolved }) => {
                let literals: Vec<_> = clause
                    .literals
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != resolved)
                    .map(|(_, &lit)| lit)
                    .collect();
                let inference = Inference::new(
                    Rule::SubsumptionResolution,
                    vec![Arc::clone(clause), subsumer],
                );
                match ctx.derived_clause(inference, literals) {
                    Some(replacement) => {
                        ctx.statistics.subsumption_resolutions += 1;
                        ForwardOutcome::Replaced(replacement)
                    }
                    None => ForwardOutcome::Keep,
                }
            }
            None => ForwardOutcome::Keep,
        }
    }
}

/// Backward subsumption: the given clause deletes subsumed active clauses.
pub struct BackwardSubsumption;

impl BackwardRule for BackwardSubsumption {
    fn name(&self) -> &'static str {
        "backward subsumption"
    }

    fn simplify(
        &self,
        given: &Arc<Clause>,
        ctx: &mut ProverContext,
        active: &ActiveSet,
        _indices: &IndexManager,
    ) -> Vec<BackwardChange> {
        let mut changes = Vec::new();
        if given.is_empty() {
            return changes;
        }
        for target in active.iter() {
            if target.id == given.id || target.literals.len() < given.literals.len() {
                continue;
            }
            if given.color.join(target.color).is_none() {
                continue;
            }
            if subsumes(&ctx.store, given, target) {
                ctx.statistics.backward_subsumed += 1;
                changes.push(BackwardChange {
                    target: Arc::clone(target),
                    replacement: None,
                });
            }
        }
        changes
    }
}

/// Does `subsumer` subsume `subsumee`: is there a substitution σ with
/// `subsumer·σ` a sub-multiset of `subsumee`?
pub fn subsumes(store: &TermStore, subsumer: &Clause, subsumee: &Clause) -> bool {
    if subsumer.literals.len() > subsumee.literals.len() {
        return false;
    }
    let mut used = vec![false; subsumee.literals.len()];
    let subst = BankedSubst::new();
    find_mapping(store, subsumer, subsumee, 0, &subst, &mut used)
}

/// Backtracking search assigning each subsumer literal to a distinct
/// subsumee literal under one consistent matching substitution.
fn find_mapping(
    store: &TermStore,
    subsumer: &Clause,
    subsumee: &Clause,
    li: usize,
    subst: &BankedSubst,
    used: &mut [bool],
) -> bool {
    if li == subsumer.literals.len() {
        return true;
    }
    let pattern = subsumer.literals[li];
    let (pred, pol) = {
        let p = store.lit(pattern);
        (p.predicate, p.polarity)
    };

    for (j, &candidate) in subsumee.literals.iter().enumerate() {
        if used[j] {
            continue;
        }
        {
            let c = store.lit(candidate);
            if c.predicate != pred || c.polarity != pol {
                continue;
            }
        }
        let mut attempt = subst.clone();
        let n = store.lit(pattern).args.len();
        let mut ok = true;
        for k in 0..n {
            let pa = store.lit(pattern).args[k];
            let ca = store.lit(candidate).args[k];
            if !attempt.match_term(store, pa, PATTERN_BANK, ca, SUBJECT_BANK) {
                ok = false;
                break;
            }
        }
        if ok {
            used[j] = true;
            if find_mapping(store, subsumer, subsumee, li + 1, &attempt, used) {
                return true;
            }
            used[j] = false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Color, InputKind};
    use crate::saturation::context::StrategyOptions;

    fn setup() -> (ProverContext, IndexManager) {
        let ctx = ProverContext::new(StrategyOptions::default());
        let mut indices = IndexManager::new();
        indices.request(IndexKind::Subsumption, &ctx.store, &ctx.ordering);
        (ctx, indices)
    }

    #[test]
    fn test_forward_subsumption_deletes() {
        let (mut ctx, mut indices) = setup();
        let x = ctx.store.var(0);
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let p = ctx.signature.intern_predicate("p", 1);
        let q = ctx.signature.intern_predicate("q", 1);

        let px = ctx.store.literal(p, true, &[x]);
        let subsumer = ctx.input_clause(vec![px], InputKind::Axiom, Color::Transparent);
        indices.insert(&ctx.store, &ctx.ordering, &subsumer, &[0]);

        let pa = ctx.store.literal(p, true, &[a]);
        let qa = ctx.store.literal(q, true, &[a]);
        let clause = ctx.input_clause(vec![pa, qa], InputKind::Axiom, Color::Transparent);

        assert!(matches!(
            ForwardSubsumption.simplify(&clause, &mut ctx, &indices),
            ForwardOutcome::Deleted
        ));
        assert_eq!(ctx.statistics.forward_subsumed, 1);
    }

    #[test]
    fn test_forward_subsumption_resolution_strips_literal() {
        let (mut ctx, mut indices) = setup();
        let x = ctx.store.var(0);
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let p = ctx.signature.intern_predicate("p", 1);
        let q = ctx.signature.intern_predicate("q", 1);

        let px = ctx.store.literal(p, true, &[x]);
        let subsumer = ctx.input_clause(vec![px], InputKind::Axiom, Color::Transparent);
        indices.insert(&ctx.store, &ctx.ordering, &subsumer, &[0]);

        // ~p(a) | q(a): p(X) resolves the first literal away
        let npa = ctx.store.literal(p, false, &[a]);
        let qa = ctx.store.literal(q, true, &[a]);
        let clause = ctx.input_clause(vec![npa, qa], InputKind::Axiom, Color::Transparent);

        match ForwardSubsumption.simplify(&clause, &mut ctx, &indices) {
            ForwardOutcome::Replaced(replacement) => {
                assert_eq!(replacement.literals, vec![qa]);
                assert_eq!(replacement.inference.rule, Rule::SubsumptionResolution);
            }
            other => panic!("expected replacement, got {:?}", other),
        }
    }

    #[test]
    fn test_subsumes_multiset_semantics() {
        let mut ctx = ProverContext::new(StrategyOptions::default());
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let b = ctx.signature.intern_function("b", 0);
        let b = ctx.store.app(b, &[]);
        let p = ctx.signature.intern_predicate("p", 2);

        // p(X, Y) subsumes p(a, b)
        let pxy = ctx.store.literal(p, true, &[x, y]);
        let pab = ctx.store.literal(p, true, &[a, b]);
        let general = ctx.input_clause(vec![pxy], InputKind::Axiom, Color::Transparent);
        let specific = ctx.input_clause(vec![pab], InputKind::Axiom, Color::Transparent);
        assert!(subsumes(&ctx.store, &general, &specific));
        assert!(!subsumes(&ctx.store, &specific, &general));

        // p(X, X) does not subsume p(a, b)
        let pxx = ctx.store.literal(p, true, &[x, x]);
        let diag = ctx.input_clause(vec![pxx], InputKind::Axiom, Color::Transparent);
        assert!(!subsumes(&ctx.store, &diag, &specific));
    }

    #[test]
    fn test_backward_subsumption_deletes_active() {
        let (mut ctx, indices) = setup();
        let x = ctx.store.var(0);
        let a = ctx.signature.intern_function("a", 0);
        let a = ctx.store.app(a, &[]);
        let p = ctx.signature.intern_predicate("p", 1);
        let q = ctx.signature.intern_predicate("q", 1);

        let pa = ctx.store.literal(p, true, &[a]);
        let qa = ctx.store.literal(q, true, &[a]);
        let target = ctx.input_clause(vec![pa, qa], InputKind::Axiom, Color::Transparent);

        let mut active = ActiveSet::new();
        active.insert(Arc::clone(&target), Box::new([0]));

        let px = ctx.store.literal(p, true, &[x]);
        let given = ctx.input_clause(vec![px], InputKind::Axiom, Color::Transparent);

        let changes = BackwardSubsumption.simplify(&given, &mut ctx, &active, &indices);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target.id, target.id);
        assert!(changes[0].replacement.is_none());
    }
}
