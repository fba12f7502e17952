//! Literal selection functions
//!
//! Selection is applied each time a clause is made active: the selected
//! literals are the only ones eligible as the cut literal in resolution and
//! superposition. The functions range from selecting everything to picking a
//! single heavy negative literal, trading completeness of the rule
//! applications against search-space size.

use crate::fol::{Clause, Kbo, Ordering, TermStore};

/// Available literal selection functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionFn {
    /// Every literal is selected
    All,
    /// All maximal literals under the simplification ordering
    Maximal,
    /// A unique maximal literal, else the heaviest negative, else all maximal
    UniqueMaximalOrNegOrMaximal,
    /// The heaviest negative literal, else all maximal
    NegMaxWeightOrMaximal,
}

impl SelectionFn {
    /// Select literal indices of `clause`.
    pub fn select(self, store: &TermStore, ordering: &Kbo, clause: &Clause) -> Box<[usize]> {
        match self {
            SelectionFn::All => (0..clause.literals.len()).collect(),
            SelectionFn::Maximal => maximal_literals(store, ordering, clause).into_boxed_slice(),
            SelectionFn::UniqueMaximalOrNegOrMaximal => {
                let maximal = maximal_literals(store, ordering, clause);
                if maximal.len() == 1 {
                    return maximal.into_boxed_slice();
                }
                if let Some(neg) = max_weight_negative(store, clause) {
                    return vec![neg].into_boxed_slice();
                }
                maximal.into_boxed_slice()
            }
            SelectionFn::NegMaxWeightOrMaximal => {
                if let Some(neg) = max_weight_negative(store, clause) {
                    return vec![neg].into_boxed_slice();
                }
                maximal_literals(store, ordering, clause).into_boxed_slice()
            }
        }
    }
}

/// Indices of literals not dominated by any other literal of the clause.
fn maximal_literals(store: &TermStore, ordering: &Kbo, clause: &Clause) -> Vec<usize> {
    let n = clause.literals.len();
    let mut maximal = Vec::new();
    for i in 0..n {
        let mut is_maximal = true;
        for j in 0..n {
            if i != j
                && ordering.compare_literals(store, clause.literals[j], clause.literals[i])
                    == Ordering::Greater
            {
                is_maximal = false;
                break;
            }
        }
        if is_maximal {
            maximal.push(i);
        }
    }
    maximal
}

/// Index of the heaviest negative literal, if the clause has one.
fn max_weight_negative(store: &TermStore, clause: &Clause) -> Option<usize> {
    clause
        .literals
        .iter()
        .enumerate()
        .filter(|(_, &lit)| !store.lit(lit).polarity)
        .max_by_key(|(_, &lit)| store.lit(lit).weight)
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Color, Inference, InputKind, LiteralId, Signature, Term};

    struct Ctx {
        store: TermStore,
        sig: Signature,
        kbo: Kbo,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                store: TermStore::new(),
                sig: Signature::new(),
                kbo: Kbo::default(),
            }
        }

        fn const_(&mut self, name: &str) -> Term {
            let f = self.sig.intern_function(name, 0);
            self.store.app(f, &[])
        }

        fn func(&mut self, name: &str, args: &[Term]) -> Term {
            let f = self.sig.intern_function(name, args.len() as u8);
            self.store.app(f, args)
        }

        fn lit(&mut self, name: &str, polarity: bool, args: &[Term]) -> LiteralId {
            let p = self.sig.intern_predicate(name, args.len() as u8);
            self.store.literal(p, polarity, args)
        }

        fn clause(&mut self, literals: Vec<LiteralId>) -> Clause {
            Clause::new(
                0,
                literals,
                InputKind::Axiom,
                Color::Transparent,
                Inference::input(),
                &self.store,
            )
        }
    }

    #[test]
    fn test_select_all() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let l0 = ctx.lit("p", true, &[a]);
        let l1 = ctx.lit("q", false, &[a]);
        let clause = ctx.clause(vec![l0, l1]);

        let selected = SelectionFn::All.select(&ctx.store, &ctx.kbo, &clause);
        assert_eq!(&*selected, &[0, 1]);
    }

    #[test]
    fn test_maximal_by_weight() {
        // p(a) vs q(f(g(a))): the heavier ground literal is uniquely maximal
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let ga = ctx.func("g", &[a]);
        let fga = ctx.func("f", &[ga]);
        let l0 = ctx.lit("p", true, &[a]);
        let l1 = ctx.lit("q", true, &[fga]);
        let clause = ctx.clause(vec![l0, l1]);

        let selected = SelectionFn::Maximal.select(&ctx.store, &ctx.kbo, &clause);
        assert_eq!(&*selected, &[1]);
    }

    #[test]
    fn test_incomparable_literals_both_maximal() {
        // p(f(X)) vs q(f(Y)): incomparable, both maximal
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let fx = ctx.func("f", &[x]);
        let fy = ctx.func("f", &[y]);
        let l0 = ctx.lit("p", true, &[fx]);
        let l1 = ctx.lit("q", true, &[fy]);
        let clause = ctx.clause(vec![l0, l1]);

        let selected = SelectionFn::Maximal.select(&ctx.store, &ctx.kbo, &clause);
        assert_eq!(&*selected, &[0, 1]);
    }

    #[test]
    fn test_unique_maximal_falls_back_to_negative() {
        // p(f(X)) | q(f(Y)) | ~r(c): no unique maximal, one negative
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let y = ctx.store.var(1);
        let c = ctx.const_("c");
        let fx = ctx.func("f", &[x]);
        let fy = ctx.func("f", &[y]);
        let l0 = ctx.lit("p", true, &[fx]);
        let l1 = ctx.lit("q", true, &[fy]);
        let l2 = ctx.lit("r", false, &[c]);
        let clause = ctx.clause(vec![l0, l1, l2]);

        let selected =
            SelectionFn::UniqueMaximalOrNegOrMaximal.select(&ctx.store, &ctx.kbo, &clause);
        assert_eq!(&*selected, &[2]);
    }

    #[test]
    fn test_neg_max_weight_prefers_heavy_negative() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let fa = ctx.func("f", &[a]);
        let x = ctx.store.var(0);
        let l0 = ctx.lit("p", true, &[x]);
        let l1 = ctx.lit("q", false, &[fa]);
        let l2 = ctx.lit("r", false, &[a]);
        let clause = ctx.clause(vec![l0, l1, l2]);

        let selected = SelectionFn::NegMaxWeightOrMaximal.select(&ctx.store, &ctx.kbo, &clause);
        assert_eq!(&*selected, &[1]);
    }
}
