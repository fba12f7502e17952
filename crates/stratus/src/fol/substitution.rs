//! Banked substitutions: unification and matching without renaming
//!
//! Variables from different premises are kept apart by pairing each
//! variable with a *bank* tag instead of renaming one premise before every
//! unification attempt. A clause can therefore be unified against itself
//! (query bank vs. result bank) directly. Bindings map `(var, bank)` pairs
//! to a term in some bank; application rebuilds through the term store, so
//! identical instances dedupe to the same shared node.

use crate::fol::term::{LiteralId, Term, TermStore, VarId};
use std::collections::HashMap;

/// Bank tag distinguishing the variable spaces of premises.
pub type Bank = u8;

/// A variable tagged with its bank.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BankedVar {
    pub var: VarId,
    pub bank: Bank,
}

/// Renaming applied to variables that survive substitution application.
///
/// By default every surviving variable is mapped to a fresh output index,
/// normalizing conclusion variables to `X0..Xn`. `keeping(bank, next)`
/// instead leaves variables of one bank untouched (used when rewriting
/// inside an existing clause) and numbers foreign variables from `next`.
#[derive(Debug)]
pub struct VarRenamer {
    map: HashMap<BankedVar, VarId>,
    next: u32,
    identity_bank: Option<Bank>,
}

impl Default for VarRenamer {
    fn default() -> Self {
        Self::new()
    }
}

impl VarRenamer {
    pub fn new() -> Self {
        VarRenamer {
            map: HashMap::new(),
            next: 0,
            identity_bank: None,
        }
    }

    /// Keep variables of `bank` unchanged; rename others starting at `next`.
    pub fn keeping(bank: Bank, next: u32) -> Self {
        VarRenamer {
            map: HashMap::new(),
            next,
            identity_bank: Some(bank),
        }
    }

    fn rename(&mut self, bv: BankedVar) -> VarId {
        if Some(bv.bank) == self.identity_bank {
            return bv.var;
        }
        if let Some(&v) = self.map.get(&bv) {
            return v;
        }
        let v = VarId(self.next);
        self.next += 1;
        self.map.insert(bv, v);
        v
    }
}

/// A substitution over banked variables.
#[derive(Debug, Clone, Default)]
pub struct BankedSubst {
    bindings: HashMap<BankedVar, (Term, Bank)>,
}

impl BankedSubst {
    pub fn new() -> Self {
        BankedSubst::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Follow variable bindings to the representative term.
    fn resolve(&self, mut term: Term, mut bank: Bank) -> (Term, Bank) {
        while let Term::Var(v) = term {
            match self.bindings.get(&BankedVar { var: v, bank }) {
                Some(&(t, b)) => {
                    term = t;
                    bank = b;
                }
                None => break,
            }
        }
        (term, bank)
    }

    fn occurs(&self, bv: BankedVar, term: Term, bank: Bank, store: &TermStore) -> bool {
        let (term, bank) = self.resolve(term, bank);
        match term {
            Term::Var(v) => v == bv.var && bank == bv.bank,
            Term::App(id) => {
                let node = store.node(id);
                // Ground nodes contain no variables in any bank.
                !node.ground
                    && node
                        .args
                        .iter()
                        .any(|&arg| self.occurs(bv, arg, bank, store))
            }
        }
    }

    /// Robinson unification with occurs check.
    ///
    /// Extends the current bindings; on failure the substitution is left in
    /// a partially extended state and must be discarded by the caller.
    pub fn unify(&mut self, store: &TermStore, t1: Term, b1: Bank, t2: Term, b2: Bank) -> bool {
        let (t1, b1) = self.resolve(t1, b1);
        let (t2, b2) = self.resolve(t2, b2);

        if t1 == t2 && (b1 == b2 || store.term_ground(t1)) {
            return true;
        }

        match (t1, t2) {
            (Term::Var(v), _) => {
                let bv = BankedVar { var: v, bank: b1 };
                if self.occurs(bv, t2, b2, store) {
                    return false;
                }
                self.bindings.insert(bv, (t2, b2));
                true
            }
            (_, Term::Var(v)) => {
                let bv = BankedVar { var: v, bank: b2 };
                if self.occurs(bv, t1, b1, store) {
                    return false;
                }
                self.bindings.insert(bv, (t1, b1));
                true
            }
            (Term::App(id1), Term::App(id2)) => {
                let (f1, f2) = (store.node(id1).functor, store.node(id2).functor);
                if f1 != f2 {
                    return false;
                }
                let n = store.node(id1).args.len();
                for i in 0..n {
                    let a1 = store.node(id1).args[i];
                    let a2 = store.node(id2).args[i];
                    if !self.unify(store, a1, b1, a2, b2) {
                        return false;
                    }
                }
                true
            }
        }
    }

    /// One-way matching: only variables of the pattern bank are bound; the
    /// subject is treated as fixed.
    pub fn match_term(
        &mut self,
        store: &TermStore,
        pattern: Term,
        pattern_bank: Bank,
        subject: Term,
        subject_bank: Bank,
    ) -> bool {
        match pattern {
            Term::Var(v) => {
                let bv = BankedVar {
                    var: v,
                    bank: pattern_bank,
                };
                match self.bindings.get(&bv) {
                    Some(&(bound, bound_bank)) => {
                        bound == subject && (bound_bank == subject_bank || store.term_ground(bound))
                    }
                    None => {
                        self.bindings.insert(bv, (subject, subject_bank));
                        true
                    }
                }
            }
            Term::App(pid) => match subject {
                Term::Var(_) => false,
                Term::App(sid) => {
                    if pid == sid && store.node(pid).ground {
                        return true;
                    }
                    let (pf, sf) = (store.node(pid).functor, store.node(sid).functor);
                    if pf != sf {
                        return false;
                    }
                    let n = store.node(pid).args.len();
                    for i in 0..n {
                        let pa = store.node(pid).args[i];
                        let sa = store.node(sid).args[i];
                        if !self.match_term(store, pa, pattern_bank, sa, subject_bank) {
                            return false;
                        }
                    }
                    true
                }
            },
        }
    }

    /// Unify the argument lists of two literals pairwise.
    pub fn unify_literal_args(
        &mut self,
        store: &TermStore,
        lit1: LiteralId,
        b1: Bank,
        lit2: LiteralId,
        b2: Bank,
    ) -> bool {
        let n = store.lit(lit1).args.len();
        if n != store.lit(lit2).args.len() {
            return false;
        }
        for i in 0..n {
            let a1 = store.lit(lit1).args[i];
            let a2 = store.lit(lit2).args[i];
            if !self.unify(store, a1, b1, a2, b2) {
                return false;
            }
        }
        true
    }

    /// Apply the substitution to a term of the given bank, rebuilding shared
    /// nodes. Unbound variables are routed through the renamer.
    pub fn apply(
        &self,
        store: &mut TermStore,
        term: Term,
        bank: Bank,
        renamer: &mut VarRenamer,
    ) -> Term {
        let (term, bank) = self.resolve(term, bank);
        match term {
            Term::Var(v) => Term::Var(renamer.rename(BankedVar { var: v, bank })),
            Term::App(id) => {
                if store.node(id).ground {
                    return term;
                }
                let (functor, args) = {
                    let node = store.node(id);
                    (node.functor, node.args.to_vec())
                };
                let new_args: Vec<Term> = args
                    .iter()
                    .map(|&a| self.apply(store, a, bank, renamer))
                    .collect();
                store.app(functor, &new_args)
            }
        }
    }

    /// Apply the substitution to a literal of the given bank.
    pub fn apply_literal(
        &self,
        store: &mut TermStore,
        lit: LiteralId,
        bank: Bank,
        renamer: &mut VarRenamer,
    ) -> LiteralId {
        let (predicate, polarity, args, sort) = {
            let l = store.lit(lit);
            (l.predicate, l.polarity, l.args.to_vec(), l.sort)
        };
        let new_args: Vec<Term> = args
            .iter()
            .map(|&a| self.apply(store, a, bank, renamer))
            .collect();
        if predicate == crate::fol::signature::PredicateId::EQUALITY {
            store.equality(polarity, new_args[0], new_args[1], sort)
        } else {
            store.literal(predicate, polarity, &new_args)
        }
    }
}

/// Are two terms of the same bank unifiable?
pub fn are_unifiable(store: &TermStore, a: Term, b: Term) -> bool {
    mgu(store, a, b).is_some()
}

/// Most general unifier of two terms of the same bank.
pub fn mgu(store: &TermStore, a: Term, b: Term) -> Option<BankedSubst> {
    let mut subst = BankedSubst::new();
    if subst.unify(store, a, 0, b, 0) {
        Some(subst)
    } else {
        None
    }
}
