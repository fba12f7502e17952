//! Knuth-Bendix simplification ordering on shared terms and literals
//!
//! Weight-then-lexicographic comparison with the KBO variable-balance
//! condition. The ordering is total on ground terms, stable under
//! substitution, and well-founded. One `Kbo` is constructed per saturation
//! instance; distinct strategies may install distinct parameters.

use crate::fol::signature::{FunctionId, PredicateId};
use crate::fol::term::{ArgOrder, LiteralId, Term, TermId, TermStore, VarId};
use std::collections::HashMap;

/// Result of comparing two terms or literals.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Ordering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl Ordering {
    pub fn reverse(self) -> Ordering {
        match self {
            Ordering::Greater => Ordering::Less,
            Ordering::Less => Ordering::Greater,
            other => other,
        }
    }
}

/// Parameters of the ordering, fixed at construction for a whole run.
#[derive(Debug, Clone, Default)]
pub struct KboConfig {
    /// Per-function weight; symbols absent from the map weigh 1
    pub function_weights: HashMap<FunctionId, u32>,
    /// Per-function precedence; defaults to interning order
    pub function_precedence: HashMap<FunctionId, u32>,
    /// Per-predicate precedence; defaults to interning order
    pub predicate_precedence: HashMap<PredicateId, u32>,
    /// Per-predicate level; higher-level atoms dominate lower-level ones
    pub predicate_levels: HashMap<PredicateId, u32>,
}

/// Knuth-Bendix ordering instance.
#[derive(Debug, Clone, Default)]
pub struct Kbo {
    config: KboConfig,
}

impl Kbo {
    pub fn new(config: KboConfig) -> Self {
        Kbo { config }
    }

    fn function_weight(&self, f: FunctionId) -> u32 {
        self.config.function_weights.get(&f).copied().unwrap_or(1)
    }

    fn function_precedence(&self, f: FunctionId) -> u32 {
        self.config
            .function_precedence
            .get(&f)
            .copied()
            .unwrap_or(f.as_u32())
    }

    fn predicate_precedence(&self, p: PredicateId) -> u32 {
        self.config
            .predicate_precedence
            .get(&p)
            .copied()
            .unwrap_or(p.as_u32())
    }

    fn predicate_level(&self, p: PredicateId) -> u32 {
        self.config.predicate_levels.get(&p).copied().unwrap_or(0)
    }

    /// KBO weight of a term. Variables weigh 1; the cached node weight is
    /// reused when no symbol carries a custom weight.
    pub fn term_weight(&self, store: &TermStore, term: Term) -> u64 {
        if self.config.function_weights.is_empty() {
            return store.term_weight(term) as u64;
        }
        match term {
            Term::Var(_) => 1,
            Term::App(id) => {
                let node = store.node(id);
                self.function_weight(node.functor) as u64
                    + node
                        .args
                        .iter()
                        .map(|&a| self.term_weight(store, a))
                        .sum::<u64>()
            }
        }
    }

    fn count_vars(&self, store: &TermStore, term: Term, counts: &mut HashMap<VarId, i64>) {
        match term {
            Term::Var(v) => {
                *counts.entry(v).or_insert(0) += 1;
            }
            Term::App(id) => {
                let node = store.node(id);
                if node.ground {
                    return;
                }
                for &arg in node.args.iter() {
                    self.count_vars(store, arg, counts);
                }
            }
        }
    }

    /// Compare two terms.
    pub fn compare(&self, store: &TermStore, s: Term, t: Term) -> Ordering {
        if s == t {
            return Ordering::Equal;
        }
        match (s, t) {
            (Term::Var(v), _) => {
                if store.occurs(v, t) {
                    Ordering::Less
                } else {
                    Ordering::Incomparable
                }
            }
            (_, Term::Var(v)) => {
                if store.occurs(v, s) {
                    Ordering::Greater
                } else {
                    Ordering::Incomparable
                }
            }
            (Term::App(sid), Term::App(tid)) => self.compare_apps(store, sid, tid),
        }
    }

    fn compare_apps(&self, store: &TermStore, s: TermId, t: TermId) -> Ordering {
        // Variable balance: s > t requires #(x, s) >= #(x, t) for all x.
        let mut vars_s = HashMap::new();
        let mut vars_t = HashMap::new();
        self.count_vars(store, Term::App(s), &mut vars_s);
        self.count_vars(store, Term::App(t), &mut vars_t);

        let s_covers_t = vars_t
            .iter()
            .all(|(v, n)| vars_s.get(v).copied().unwrap_or(0) >= *n);
        let t_covers_s = vars_s
            .iter()
            .all(|(v, n)| vars_t.get(v).copied().unwrap_or(0) >= *n);

        let ws = self.term_weight(store, Term::App(s));
        let wt = self.term_weight(store, Term::App(t));

        if ws > wt {
            return if s_covers_t {
                Ordering::Greater
            } else {
                Ordering::Incomparable
            };
        }
        if wt > ws {
            return if t_covers_s {
                Ordering::Less
            } else {
                Ordering::Incomparable
            };
        }

        // Equal weight: lexicographic tie-break, gated by the variable condition.
        let lex = self.compare_lex(store, s, t);
        match lex {
            Ordering::Greater if s_covers_t => Ordering::Greater,
            Ordering::Less if t_covers_s => Ordering::Less,
            Ordering::Equal => Ordering::Equal,
            _ => Ordering::Incomparable,
        }
    }

    fn compare_lex(&self, store: &TermStore, s: TermId, t: TermId) -> Ordering {
        let (sf, tf) = (store.node(s).functor, store.node(t).functor);
        if sf != tf {
            let (ps, pt) = (self.function_precedence(sf), self.function_precedence(tf));
            return if ps > pt || (ps == pt && sf > tf) {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        let n = store.node(s).args.len();
        for i in 0..n {
            let sa = store.node(s).args[i];
            let ta = store.node(t).args[i];
            match self.compare(store, sa, ta) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    // === Literals ===

    /// Lift the ordering to literals: predicate level, then precedence, then
    /// the same weight/variable-balance/lexicographic scheme over arguments.
    /// On the same atom, the negative literal is the greater one.
    pub fn compare_literals(&self, store: &TermStore, l1: LiteralId, l2: LiteralId) -> Ordering {
        if l1 == l2 {
            return Ordering::Equal;
        }
        let (p1, p2) = (store.lit(l1).predicate, store.lit(l2).predicate);
        if p1 != p2 {
            let (lv1, lv2) = (self.predicate_level(p1), self.predicate_level(p2));
            if lv1 != lv2 {
                return if lv1 > lv2 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
            let (pr1, pr2) = (self.predicate_precedence(p1), self.predicate_precedence(p2));
            return if pr1 > pr2 || (pr1 == pr2 && p1 > p2) {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        // Same predicate: variable balance and weight over the argument lists.
        let mut vars1 = HashMap::new();
        let mut vars2 = HashMap::new();
        for &a in store.lit(l1).args.iter() {
            self.count_vars(store, a, &mut vars1);
        }
        for &a in store.lit(l2).args.iter() {
            self.count_vars(store, a, &mut vars2);
        }
        let covers_12 = vars2
            .iter()
            .all(|(v, n)| vars1.get(v).copied().unwrap_or(0) >= *n);
        let covers_21 = vars1
            .iter()
            .all(|(v, n)| vars2.get(v).copied().unwrap_or(0) >= *n);

        let w1: u64 = store
            .lit(l1)
            .args
            .iter()
            .map(|&a| self.term_weight(store, a))
            .sum();
        let w2: u64 = store
            .lit(l2)
            .args
            .iter()
            .map(|&a| self.term_weight(store, a))
            .sum();

        if w1 > w2 {
            return if covers_12 {
                Ordering::Greater
            } else {
                Ordering::Incomparable
            };
        }
        if w2 > w1 {
            return if covers_21 {
                Ordering::Less
            } else {
                Ordering::Incomparable
            };
        }

        let n = store.lit(l1).args.len();
        for i in 0..n {
            let a1 = store.lit(l1).args[i];
            let a2 = store.lit(l2).args[i];
            match self.compare(store, a1, a2) {
                Ordering::Equal => continue,
                Ordering::Greater if covers_12 => return Ordering::Greater,
                Ordering::Less if covers_21 => return Ordering::Less,
                _ => return Ordering::Incomparable,
            }
        }

        // Same atom, differing polarity: the negative literal is greater.
        let (pol1, pol2) = (store.lit(l1).polarity, store.lit(l2).polarity);
        match (pol1, pol2) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    // === Equality orientation ===

    /// Compare the two sides of an equality literal, caching the result in
    /// the shared node as the argument-order tag.
    pub fn orient_equality(&self, store: &TermStore, lit: LiteralId) -> ArgOrder {
        let l = store.lit(lit);
        debug_assert!(l.is_equality());
        let cached = l.arg_order();
        if cached != ArgOrder::Unknown {
            return cached;
        }
        let order = match self.compare(store, l.args[0], l.args[1]) {
            Ordering::Greater => ArgOrder::Greater,
            Ordering::Less => ArgOrder::Less,
            Ordering::Equal => ArgOrder::Equal,
            Ordering::Incomparable => ArgOrder::Incomparable,
        };
        l.set_arg_order(order);
        order
    }

    /// The (lhs, rhs) of an equality literal with lhs strictly greater,
    /// or `None` when the sides are unordered.
    pub fn greater_side(&self, store: &TermStore, lit: LiteralId) -> Option<(Term, Term)> {
        let l = store.lit(lit);
        match self.orient_equality(store, lit) {
            ArgOrder::Greater => Some((l.args[0], l.args[1])),
            ArgOrder::Less => Some((l.args[1], l.args[0])),
            _ => None,
        }
    }
}
