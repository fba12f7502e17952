//! Property tests for the term store and the simplification ordering

use proptest::prelude::*;
use stratus::{Kbo, Ordering, ProverContext, StrategyOptions, Term};

/// Abstract term over a tiny signature, interned per test case.
#[derive(Debug, Clone, PartialEq, Eq)]
enum T {
    X,
    A,
    B,
    F(Box<T>),
    G(Box<T>, Box<T>),
}

fn arb_term() -> impl Strategy<Value = T> {
    let leaf = prop_oneof![Just(T::X), Just(T::A), Just(T::B)];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| T::F(Box::new(t))),
            (inner.clone(), inner).prop_map(|(a, b)| T::G(Box::new(a), Box::new(b))),
        ]
    })
}

fn arb_ground_term() -> impl Strategy<Value = T> {
    let leaf = prop_oneof![Just(T::A), Just(T::B)];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| T::F(Box::new(t))),
            (inner.clone(), inner).prop_map(|(a, b)| T::G(Box::new(a), Box::new(b))),
        ]
    })
}

fn intern(ctx: &mut ProverContext, t: &T) -> Term {
    match t {
        T::X => ctx.store.var(0),
        T::A => {
            let a = ctx.signature.intern_function("a", 0);
            ctx.store.app(a, &[])
        }
        T::B => {
            let b = ctx.signature.intern_function("b", 0);
            ctx.store.app(b, &[])
        }
        T::F(arg) => {
            let inner = intern(ctx, arg);
            let f = ctx.signature.intern_function("f", 1);
            ctx.store.app(f, &[inner])
        }
        T::G(lhs, rhs) => {
            let (l, r) = (intern(ctx, lhs), intern(ctx, rhs));
            let g = ctx.signature.intern_function("g", 2);
            ctx.store.app(g, &[l, r])
        }
    }
}

/// Substitute every X in the abstract term by `g`.
fn substitute(t: &T, g: &T) -> T {
    match t {
        T::X => g.clone(),
        T::A => T::A,
        T::B => T::B,
        T::F(arg) => T::F(Box::new(substitute(arg, g))),
        T::G(l, r) => T::G(Box::new(substitute(l, g)), Box::new(substitute(r, g))),
    }
}

fn fresh() -> (ProverContext, Kbo) {
    (ProverContext::new(StrategyOptions::default()), Kbo::default())
}

proptest! {
    #[test]
    fn prop_interning_is_idempotent(t in arb_term()) {
        let (mut ctx, _) = fresh();
        let first = intern(&mut ctx, &t);
        let second = intern(&mut ctx, &t);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_equal_shape_iff_same_handle(s in arb_term(), t in arb_term()) {
        let (mut ctx, _) = fresh();
        let hs = intern(&mut ctx, &s);
        let ht = intern(&mut ctx, &t);
        prop_assert_eq!(hs == ht, s == t);
    }

    #[test]
    fn prop_ordering_total_on_ground(s in arb_ground_term(), t in arb_ground_term()) {
        let (mut ctx, kbo) = fresh();
        let hs = intern(&mut ctx, &s);
        let ht = intern(&mut ctx, &t);
        let r = kbo.compare(&ctx.store, hs, ht);
        prop_assert_ne!(r, Ordering::Incomparable);
        prop_assert_eq!(r == Ordering::Equal, hs == ht);
    }

    #[test]
    fn prop_ordering_antisymmetric(s in arb_term(), t in arb_term()) {
        let (mut ctx, kbo) = fresh();
        let hs = intern(&mut ctx, &s);
        let ht = intern(&mut ctx, &t);
        let forward = kbo.compare(&ctx.store, hs, ht);
        let backward = kbo.compare(&ctx.store, ht, hs);
        prop_assert_eq!(forward, backward.reverse());
    }

    #[test]
    fn prop_ordering_stable_under_substitution(
        s in arb_term(),
        t in arb_term(),
        g in arb_ground_term(),
    ) {
        let (mut ctx, kbo) = fresh();
        let hs = intern(&mut ctx, &s);
        let ht = intern(&mut ctx, &t);
        if kbo.compare(&ctx.store, hs, ht) == Ordering::Greater {
            let hs_inst = intern(&mut ctx, &substitute(&s, &g));
            let ht_inst = intern(&mut ctx, &substitute(&t, &g));
            prop_assert_eq!(
                kbo.compare(&ctx.store, hs_inst, ht_inst),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn prop_subterm_always_smaller(t in arb_ground_term()) {
        let (mut ctx, kbo) = fresh();
        let whole = intern(&mut ctx, &t);
        let mut subterms = Vec::new();
        ctx.store.non_var_subterms(whole, &mut subterms);
        for &sub in &subterms {
            if sub != whole {
                prop_assert_eq!(kbo.compare(&ctx.store, whole, sub), Ordering::Greater);
            }
        }
    }
}
