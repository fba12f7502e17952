//! Perfectly shared terms and literals
//!
//! Every function application and every literal is interned in a
//! `TermStore`: two structurally identical nodes are the same node, so
//! handle equality is syntactic equality and weight/groundness are computed
//! once. Variables are not interned; they are inline integers carried in the
//! `Term` handle itself.
//!
//! The store is append-only for the lifetime of a saturation instance;
//! nothing is ever deallocated per clause.

use crate::fol::signature::{FunctionId, PredicateId, Signature, SortId};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;

/// An inline variable (index into the clause's variable space)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// Handle of an interned function application
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(pub(crate) u32);

/// Handle of an interned literal
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiteralId(pub(crate) u32);

/// A term handle: an inline variable or a shared application node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Var(VarId),
    App(TermId),
}

impl Term {
    pub fn is_var(self) -> bool {
        matches!(self, Term::Var(_))
    }
}

/// Cached ordering between the two sides of an equality literal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArgOrder {
    Unknown,
    Greater,
    Less,
    Equal,
    Incomparable,
}

/// Shared node of a function application.
#[derive(Debug)]
pub struct TermNode {
    pub functor: FunctionId,
    pub args: Box<[Term]>,
    /// Symbol count with variables counted as 1
    pub weight: u32,
    pub ground: bool,
}

/// Shared node of a literal. Positive and negative forms are distinct nodes.
#[derive(Debug)]
pub struct Literal {
    pub predicate: PredicateId,
    pub polarity: bool,
    pub args: Box<[Term]>,
    /// Symbol count: 1 for the predicate plus argument weights
    pub weight: u32,
    pub ground: bool,
    /// Common argument sort, recorded once per equality literal
    pub sort: SortId,
    /// Lazily cached KBO comparison of the two equality sides
    arg_order: Cell<ArgOrder>,
}

impl Literal {
    pub fn is_equality(&self) -> bool {
        self.predicate == PredicateId::EQUALITY
    }

    pub fn arg_order(&self) -> ArgOrder {
        self.arg_order.get()
    }

    pub(crate) fn set_arg_order(&self, order: ArgOrder) {
        self.arg_order.set(order);
    }
}

/// Hash-consing store for terms and literals.
#[derive(Debug, Default)]
pub struct TermStore {
    apps: Vec<TermNode>,
    app_lookup: HashMap<(FunctionId, Box<[Term]>), u32>,
    literals: Vec<Literal>,
    literal_lookup: HashMap<(PredicateId, bool, Box<[Term]>), u32>,
}

impl TermStore {
    pub fn new() -> Self {
        TermStore::default()
    }

    /// The variable with the given index. Variables are inline; no interning.
    pub fn var(&self, index: u32) -> Term {
        Term::Var(VarId(index))
    }

    /// Intern an application, returning the shared handle (get-or-create).
    pub fn app(&mut self, functor: FunctionId, args: &[Term]) -> Term {
        let key = (functor, args.to_vec().into_boxed_slice());
        if let Some(&id) = self.app_lookup.get(&key) {
            return Term::App(TermId(id));
        }
        let weight = 1 + args.iter().map(|&a| self.term_weight(a)).sum::<u32>();
        let ground = args.iter().all(|&a| self.term_ground(a));
        let id = self.apps.len() as u32;
        self.apps.push(TermNode {
            functor,
            args: key.1.clone(),
            weight,
            ground,
        });
        self.app_lookup.insert(key, id);
        Term::App(TermId(id))
    }

    pub fn node(&self, id: TermId) -> &TermNode {
        &self.apps[id.0 as usize]
    }

    /// Intern a literal, returning the shared handle (get-or-create).
    pub fn literal(&mut self, predicate: PredicateId, polarity: bool, args: &[Term]) -> LiteralId {
        self.literal_sorted(predicate, polarity, args, SortId::INDIVIDUAL)
    }

    /// Intern an equality literal over the given argument sort.
    pub fn equality(&mut self, polarity: bool, lhs: Term, rhs: Term, sort: SortId) -> LiteralId {
        self.literal_sorted(PredicateId::EQUALITY, polarity, &[lhs, rhs], sort)
    }

    fn literal_sorted(
        &mut self,
        predicate: PredicateId,
        polarity: bool,
        args: &[Term],
        sort: SortId,
    ) -> LiteralId {
        let key = (predicate, polarity, args.to_vec().into_boxed_slice());
        if let Some(&id) = self.literal_lookup.get(&key) {
            return LiteralId(id);
        }
        let weight = 1 + args.iter().map(|&a| self.term_weight(a)).sum::<u32>();
        let ground = args.iter().all(|&a| self.term_ground(a));
        let id = self.literals.len() as u32;
        self.literals.push(Literal {
            predicate,
            polarity,
            args: key.2.clone(),
            weight,
            ground,
            sort,
            arg_order: Cell::new(ArgOrder::Unknown),
        });
        self.literal_lookup.insert(key, id);
        LiteralId(id)
    }

    pub fn lit(&self, id: LiteralId) -> &Literal {
        &self.literals[id.0 as usize]
    }

    /// The shared node of the opposite polarity.
    pub fn complement(&mut self, id: LiteralId) -> LiteralId {
        let (predicate, polarity, args, sort) = {
            let lit = self.lit(id);
            (lit.predicate, lit.polarity, lit.args.to_vec(), lit.sort)
        };
        self.literal_sorted(predicate, !polarity, &args, sort)
    }

    // === Cached attributes ===

    pub fn term_weight(&self, term: Term) -> u32 {
        match term {
            Term::Var(_) => 1,
            Term::App(id) => self.node(id).weight,
        }
    }

    pub fn term_ground(&self, term: Term) -> bool {
        match term {
            Term::Var(_) => false,
            Term::App(id) => self.node(id).ground,
        }
    }

    // === Traversal ===

    /// Collect the variables of a term into `out` (with repetitions).
    pub fn term_vars(&self, term: Term, out: &mut Vec<VarId>) {
        match term {
            Term::Var(v) => out.push(v),
            Term::App(id) => {
                for &arg in self.node(id).args.iter() {
                    self.term_vars(arg, out);
                }
            }
        }
    }

    /// Collect all non-variable subterms of `term` in top-down order.
    pub fn non_var_subterms(&self, term: Term, out: &mut Vec<Term>) {
        if let Term::App(id) = term {
            out.push(term);
            for &arg in self.node(id).args.iter() {
                self.non_var_subterms(arg, out);
            }
        }
    }

    /// Does `v` occur in `term`?
    pub fn occurs(&self, v: VarId, term: Term) -> bool {
        match term {
            Term::Var(w) => v == w,
            Term::App(id) => {
                // A ground node cannot contain a variable.
                let node = self.node(id);
                !node.ground && node.args.iter().any(|&arg| self.occurs(v, arg))
            }
        }
    }

    /// Does `sub` occur as a subterm of `term` (including `term` itself)?
    pub fn contains_subterm(&self, term: Term, sub: Term) -> bool {
        if term == sub {
            return true;
        }
        match term {
            Term::Var(_) => false,
            Term::App(id) => self
                .node(id)
                .args
                .iter()
                .any(|&arg| self.contains_subterm(arg, sub)),
        }
    }

    /// Rewrite every occurrence of `from` in `term` to `to`.
    ///
    /// Sharing makes the identity check a handle comparison, so untouched
    /// subtrees are returned as-is.
    pub fn replace(&mut self, term: Term, from: Term, to: Term) -> Term {
        if term == from {
            return to;
        }
        match term {
            Term::Var(_) => term,
            Term::App(id) => {
                if !self.contains_subterm(term, from) {
                    return term;
                }
                let (functor, args) = {
                    let node = self.node(id);
                    (node.functor, node.args.to_vec())
                };
                let new_args: Vec<Term> =
                    args.iter().map(|&a| self.replace(a, from, to)).collect();
                self.app(functor, &new_args)
            }
        }
    }

    /// Rewrite every occurrence of `from` in the literal's arguments.
    pub fn replace_in_literal(&mut self, lit: LiteralId, from: Term, to: Term) -> LiteralId {
        let (predicate, polarity, args, sort) = {
            let l = self.lit(lit);
            (l.predicate, l.polarity, l.args.to_vec(), l.sort)
        };
        let new_args: Vec<Term> = args.iter().map(|&a| self.replace(a, from, to)).collect();
        self.literal_sorted(predicate, polarity, &new_args, sort)
    }

    pub fn app_count(&self) -> usize {
        self.apps.len()
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    // === Display ===

    pub fn display_term<'a>(&'a self, signature: &'a Signature, term: Term) -> TermDisplay<'a> {
        TermDisplay {
            store: self,
            signature,
            term,
        }
    }

    pub fn display_literal<'a>(
        &'a self,
        signature: &'a Signature,
        lit: LiteralId,
    ) -> LiteralDisplay<'a> {
        LiteralDisplay {
            store: self,
            signature,
            lit,
        }
    }
}

pub struct TermDisplay<'a> {
    store: &'a TermStore,
    signature: &'a Signature,
    term: Term,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Var(VarId(i)) => write!(f, "X{}", i),
            Term::App(id) => {
                let node = self.store.node(id);
                write!(f, "{}", self.signature.function_name(node.functor))?;
                if !node.args.is_empty() {
                    write!(f, "(")?;
                    for (i, &arg) in node.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", self.store.display_term(self.signature, arg))?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

pub struct LiteralDisplay<'a> {
    store: &'a TermStore,
    signature: &'a Signature,
    lit: LiteralId,
}

impl fmt::Display for LiteralDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.store.lit(self.lit);
        if lit.is_equality() {
            let op = if lit.polarity { "=" } else { "!=" };
            return write!(
                f,
                "{} {} {}",
                self.store.display_term(self.signature, lit.args[0]),
                op,
                self.store.display_term(self.signature, lit.args[1])
            );
        }
        if !lit.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}", self.signature.predicate_name(lit.predicate))?;
        if !lit.args.is_empty() {
            write!(f, "(")?;
            for (i, &arg) in lit.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", self.store.display_term(self.signature, arg))?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        store: TermStore,
        sig: Signature,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                store: TermStore::new(),
                sig: Signature::new(),
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
    }

    #[test]
    fn test_interning_twice_returns_same_handle() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let fa1 = ctx.func("f", &[a]);
        let fa2 = ctx.func("f", &[a]);
        assert_eq!(fa1, fa2);
    }

    #[test]
    fn test_equal_shape_iff_same_handle() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let x = ctx.store.var(0);

        let t1 = ctx.func("f", &[a, x]);
        let t2 = ctx.func("f", &[a, ctx.store.var(0)]);
        let t3 = ctx.func("f", &[b, x]);

        assert_eq!(t1, t2);
        assert_ne!(t1, t3);
    }

    #[test]
    fn test_weight_and_ground_cached() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let x = ctx.store.var(0);
        let fa = ctx.func("f", &[a]);
        let fx = ctx.func("f", &[x]);

        assert_eq!(ctx.store.term_weight(fa), 2);
        assert_eq!(ctx.store.term_weight(fx), 2);
        assert!(ctx.store.term_ground(fa));
        assert!(!ctx.store.term_ground(fx));
    }

    #[test]
    fn test_literal_sharing_and_complement() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let p = ctx.sig.intern_predicate("p", 1);

        let l1 = ctx.store.literal(p, true, &[a]);
        let l2 = ctx.store.literal(p, true, &[a]);
        assert_eq!(l1, l2);

        let neg = ctx.store.complement(l1);
        assert_ne!(l1, neg);
        assert_eq!(ctx.store.complement(neg), l1);
    }

    #[test]
    fn test_replace_rebuilds_shared() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");
        let fa = ctx.func("f", &[a]);
        let gfa = ctx.func("g", &[fa, a]);

        let rewritten = ctx.store.replace(gfa, a, b);
        let fb = ctx.func("f", &[b]);
        let expected = ctx.func("g", &[fb, b]);
        assert_eq!(rewritten, expected);

        // Untouched terms come back as the same handle
        assert_eq!(ctx.store.replace(gfa, b, a), gfa);
    }

    #[test]
    fn test_occurs() {
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let fxa = ctx.func("f", &[x, a]);

        assert!(ctx.store.occurs(VarId(0), fxa));
        assert!(!ctx.store.occurs(VarId(1), fxa));
        assert!(!ctx.store.occurs(VarId(0), a));
    }

    #[test]
    fn test_display() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let x = ctx.store.var(0);
        let fxa = ctx.func("f", &[x, a]);
        assert_eq!(ctx.store.display_term(&ctx.sig, fxa).to_string(), "f(X0,a)");

        let l = ctx.store.equality(false, fxa, a, SortId::INDIVIDUAL);
        assert_eq!(
            ctx.store.display_literal(&ctx.sig, l).to_string(),
            "f(X0,a) != a"
        );
    }
}
