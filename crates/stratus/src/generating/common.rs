//! Shared helpers for generating rules

use crate::fol::{Bank, BankedSubst, Clause, LiteralId, Ordering, VarRenamer};
use crate::saturation::context::ProverContext;

/// Apply a substitution to every literal of a clause under one shared
/// renamer, so variables stay consistent across premises.
pub fn apply_clause(
    ctx: &mut ProverContext,
    clause: &Clause,
    bank: Bank,
    subst: &BankedSubst,
    renamer: &mut VarRenamer,
) -> Vec<LiteralId> {
    clause
        .literals
        .iter()
        .map(|&lit| subst.apply_literal(&mut ctx.store, lit, bank, renamer))
        .collect()
}

/// The literal-selection completeness constraint: the inference is skipped
/// when any side literal of a premise is greater (after the substitution)
/// than the cut literal of that premise.
pub fn cut_literal_admissible(ctx: &ProverContext, applied: &[LiteralId], cut: usize) -> bool {
    let cut_lit = applied[cut];
    for (i, &lit) in applied.iter().enumerate() {
        if i == cut {
            continue;
        }
        if ctx.ordering.compare_literals(&ctx.store, lit, cut_lit) == Ordering::Greater {
            return false;
        }
    }
    true
}

/// Collect all applied literals except the excluded index.
pub fn side_literals(applied: &[LiteralId], exclude: usize) -> impl Iterator<Item = LiteralId> + '_ {
    applied
        .iter()
        .enumerate()
        .filter(move |(i, _)| *i != exclude)
        .map(|(_, &lit)| lit)
}

/// A rewrite is only admissible when the instantiated left side is not
/// smaller than (or equal to) the instantiated right side.
pub fn rewrite_admissible(ctx: &ProverContext, lhs: crate::fol::Term, rhs: crate::fol::Term) -> bool {
    !matches!(
        ctx.ordering.compare(&ctx.store, lhs, rhs),
        Ordering::Less | Ordering::Equal
    )
}
