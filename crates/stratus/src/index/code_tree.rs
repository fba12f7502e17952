//! Clause subsumption index: compiled matching code
//!
//! Every indexed clause is compiled once into a sequence of matching
//! instructions (check-symbol / bind-var / compare-var) per literal, with
//! variable slots shared across the clause. A query clause is run against
//! the whole tree in one pass, harvesting both subsumption and
//! subsumption-resolution candidates: the multi-literal assignment is a
//! backtracking search over which query literal each compiled literal
//! matches, with at most one polarity-flipped match for the resolution case.
//!
//! Candidates are gathered through per-predicate buckets and deduplicated
//! with the auxiliary clause mark, so each indexed clause runs at most once
//! per query.

use crate::fol::{AuxScope, Clause, Color, FunctionId, LiteralId, PredicateId, Term, TermStore, VarId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One matching instruction over the preorder symbol string of a literal's
/// arguments.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Instr {
    /// The current position must be an application of this symbol; descend
    CheckSym(FunctionId),
    /// Bind slot to the whole subterm at the current position; skip it
    BindVar(u16),
    /// The subterm at the current position must equal the slot binding; skip
    CompareVar(u16),
}

/// Compiled form of one literal.
#[derive(Debug)]
struct LitCode {
    predicate: PredicateId,
    polarity: bool,
    instrs: Vec<Instr>,
}

/// Compiled form of one indexed clause.
#[derive(Debug)]
struct ClauseCode {
    clause: Arc<Clause>,
    lits: Vec<LitCode>,
    slots: usize,
}

/// Outcome of running a query clause through the tree.
#[derive(Debug, Clone)]
pub enum CodeMatch {
    /// The query clause is subsumed by `subsumer`
    Subsumption { subsumer: Arc<Clause> },
    /// One query literal resolves against `subsumer`; the rest is subsumed
    SubsumptionResolution {
        subsumer: Arc<Clause>,
        /// Index of the resolved literal in the query clause
        resolved: usize,
    },
}

/// Subsumption code tree over active clauses.
#[derive(Debug, Default)]
pub struct CodeTree {
    codes: Vec<ClauseCode>,
    /// Candidate buckets: predicate and polarity of the first compiled literal
    buckets: HashMap<(PredicateId, bool), Vec<usize>>,
    live: HashSet<u32>,
}

impl CodeTree {
    pub fn new() -> Self {
        CodeTree::default()
    }

    /// Compile and insert a clause. Empty clauses are never indexed.
    pub fn insert(&mut self, store: &TermStore, clause: Arc<Clause>) {
        if clause.is_empty() {
            return;
        }
        let mut slots: HashMap<VarId, u16> = HashMap::new();
        let mut lits = Vec::with_capacity(clause.literals.len());
        for &lit in &clause.literals {
            let l = store.lit(lit);
            let mut instrs = Vec::new();
            for &arg in l.args.iter() {
                compile_term(store, arg, &mut slots, &mut instrs);
            }
            lits.push(LitCode {
                predicate: l.predicate,
                polarity: l.polarity,
                instrs,
            });
        }
        let key = (lits[0].predicate, lits[0].polarity);
        let code_idx = self.codes.len();
        self.live.insert(clause.id);
        self.codes.push(ClauseCode {
            clause,
            lits,
            slots: slots.len(),
        });
        self.buckets.entry(key).or_default().push(code_idx);
    }

    pub fn remove(&mut self, clause_id: u32) {
        self.live.remove(&clause_id);
    }

    /// Run a query clause through the tree once.
    ///
    /// Returns the first accepted candidate: a subsumer no larger than the
    /// query, or a subsumption-resolution partner. `query_color` gates
    /// acceptance: a candidate whose color cannot combine with the query's
    /// is skipped.
    pub fn query(
        &self,
        store: &TermStore,
        literals: &[LiteralId],
        query_color: Color,
    ) -> Option<CodeMatch> {
        if literals.is_empty() {
            return None;
        }
        let lits: Vec<&crate::fol::Literal> = literals.iter().map(|&l| store.lit(l)).collect();

        // Gather candidate codes whose first literal could match any query
        // literal, either directly (subsumption) or flipped (resolution).
        let scope = AuxScope::acquire();
        let mut candidates: Vec<usize> = Vec::new();
        for lit in &lits {
            for flip in [false, true] {
                if let Some(bucket) = self.buckets.get(&(lit.predicate, lit.polarity ^ flip)) {
                    for &idx in bucket {
                        let code = &self.codes[idx];
                        if self.live.contains(&code.clause.id) && scope.mark(&code.clause) {
                            candidates.push(idx);
                        }
                    }
                }
            }
        }
        drop(scope);

        for &idx in &candidates {
            let code = &self.codes[idx];
            if code.lits.len() > lits.len() {
                continue;
            }
            if code.clause.color.join(query_color).is_none() {
                continue;
            }
            let mut machine = Machine::new(store, &lits, code.slots);

            // Plain subsumption first
            if machine.search(&code.lits, 0, None) {
                return Some(CodeMatch::Subsumption {
                    subsumer: Arc::clone(&code.clause),
                });
            }

            // Then subsumption resolution: one compiled literal matches a
            // query literal of opposite polarity.
            for flip_lit in 0..code.lits.len() {
                machine.reset();
                if machine.search(&code.lits, 0, Some(flip_lit)) {
                    let resolved = machine.flipped_target.expect("flipped match recorded");
                    return Some(CodeMatch::SubsumptionResolution {
                        subsumer: Arc::clone(&code.clause),
                        resolved,
                    });
                }
            }
        }
        None
    }
}

fn compile_term(
    store: &TermStore,
    term: Term,
    slots: &mut HashMap<VarId, u16>,
    instrs: &mut Vec<Instr>,
) {
    match term {
        Term::Var(v) => {
            if let Some(&slot) = slots.get(&v) {
                instrs.push(Instr::CompareVar(slot));
            } else {
                let slot = slots.len() as u16;
                slots.insert(v, slot);
                instrs.push(Instr::BindVar(slot));
            }
        }
        Term::App(id) => {
            let node = store.node(id);
            instrs.push(Instr::CheckSym(node.functor));
            for &arg in node.args.iter() {
                compile_term(store, arg, slots, instrs);
            }
        }
    }
}

/// Execution state of the multi-literal match.
struct Machine<'a> {
    store: &'a TermStore,
    query: &'a [&'a crate::fol::Literal],
    /// Preorder node streams of each query literal's arguments
    streams: Vec<Vec<Term>>,
    slots: Vec<Option<Term>>,
    used: Vec<bool>,
    /// Query literal matched with flipped polarity, when resolution applies
    flipped_target: Option<usize>,
}

impl<'a> Machine<'a> {
    fn new(store: &'a TermStore, query: &'a [&'a crate::fol::Literal], nslots: usize) -> Self {
        let streams = query
            .iter()
            .map(|l| {
                let mut stream = Vec::new();
                for &arg in l.args.iter() {
                    preorder(store, arg, &mut stream);
                }
                stream
            })
            .collect();
        Machine {
            store,
            query,
            streams,
            slots: vec![None; nslots],
            used: vec![false; query.len()],
            flipped_target: None,
        }
    }

    fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.used.iter_mut().for_each(|u| *u = false);
        self.flipped_target = None;
    }

    /// Assign compiled literal `li` and the rest to distinct query literals.
    ///
    /// `flip` names the one compiled literal allowed (and required) to match
    /// with opposite polarity; `None` is plain subsumption.
    fn search(&mut self, lits: &[LitCode], li: usize, flip: Option<usize>) -> bool {
        if li == lits.len() {
            return flip.is_none() || self.flipped_target.is_some();
        }
        let code = &lits[li];
        let want_flip = flip == Some(li);
        for qi in 0..self.query.len() {
            if self.used[qi] {
                continue;
            }
            let q = self.query[qi];
            if q.predicate != code.predicate {
                continue;
            }
            if (q.polarity == code.polarity) == want_flip {
                continue;
            }
            let saved: Vec<Option<Term>> = self.slots.clone();
            if self.run_program(&code.instrs, qi) {
                self.used[qi] = true;
                if want_flip {
                    self.flipped_target = Some(qi);
                }
                if self.search(lits, li + 1, flip) {
                    return true;
                }
                self.used[qi] = false;
                if want_flip {
                    self.flipped_target = None;
                }
            }
            self.slots = saved;
        }
        false
    }

    /// Run one literal program against one query literal.
    fn run_program(&mut self, instrs: &[Instr], qi: usize) -> bool {
        let stream = &self.streams[qi];
        let mut pos = 0usize;
        for &instr in instrs {
            if pos >= stream.len() {
                return false;
            }
            match instr {
                Instr::CheckSym(f) => match stream[pos] {
                    Term::App(id) if self.store.node(id).functor == f => {
                        pos += 1;
                    }
                    _ => return false,
                },
                Instr::BindVar(slot) => {
                    let sub = stream[pos];
                    self.slots[slot as usize] = Some(sub);
                    pos += self.subterm_len(sub);
                }
                Instr::CompareVar(slot) => {
                    let sub = stream[pos];
                    if self.slots[slot as usize] != Some(sub) {
                        return false;
                    }
                    pos += self.subterm_len(sub);
                }
            }
        }
        pos == stream.len()
    }

    fn subterm_len(&self, term: Term) -> usize {
        match term {
            Term::Var(_) => 1,
            Term::App(id) => {
                1 + self
                    .store
                    .node(id)
                    .args
                    .iter()
                    .map(|&a| self.subterm_len(a))
                    .sum::<usize>()
            }
        }
    }
}

fn preorder(store: &TermStore, term: Term, out: &mut Vec<Term>) {
    out.push(term);
    if let Term::App(id) = term {
        for &arg in store.node(id).args.iter() {
            preorder(store, arg, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Inference, InputKind, Signature};

    struct Ctx {
        store: TermStore,
        sig: Signature,
        next_id: u32,
    }

    impl Ctx {
        fn new() -> Self {
            Ctx {
                store: TermStore::new(),
                sig: Signature::new(),
                next_id: 0,
            }
        }

        fn const_(&mut self, name: &str) -> Term {
            let f = self.sig.intern_function(name, 0);
            self.store.app(f, &[])
        }

        fn lit(&mut self, name: &str, polarity: bool, args: &[Term]) -> LiteralId {
            let p = self.sig.intern_predicate(name, args.len() as u8);
            self.store.literal(p, polarity, args)
        }

        fn clause(&mut self, literals: Vec<LiteralId>) -> Arc<Clause> {
            self.clause_colored(literals, Color::Transparent)
        }

        fn clause_colored(&mut self, literals: Vec<LiteralId>, color: Color) -> Arc<Clause> {
            let id = self.next_id;
            self.next_id += 1;
            Arc::new(Clause::new(
                id,
                literals,
                InputKind::Axiom,
                color,
                Inference::input(),
                &self.store,
            ))
        }
    }

    #[test]
    fn test_unit_subsumption() {
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        // p(X) subsumes p(a) | q(b)
        let px = ctx.lit("p", true, &[x]);
        let subsumer = ctx.clause(vec![px]);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, Arc::clone(&subsumer));

        let pa = ctx.lit("p", true, &[a]);
        let qb = ctx.lit("q", true, &[b]);
        let result = tree.query(&ctx.store, &[pa, qb], Color::Transparent);
        assert!(matches!(result, Some(CodeMatch::Subsumption { subsumer: s }) if s.id == subsumer.id));
    }

    #[test]
    fn test_subsumer_must_not_be_larger() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let pa = ctx.lit("p", true, &[a]);
        let qb = ctx.lit("q", true, &[b]);
        let big = ctx.clause(vec![pa, qb]);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, big);

        // The two-literal clause cannot subsume the unit p(a)
        let result = tree.query(&ctx.store, &[pa], Color::Transparent);
        assert!(result.is_none());
    }

    #[test]
    fn test_shared_variable_consistency() {
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        // p(X, X) must not subsume p(a, b)
        let pxx = ctx.lit("p", true, &[x, x]);
        let subsumer = ctx.clause(vec![pxx]);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, subsumer);

        let pab = ctx.lit("p", true, &[a, b]);
        assert!(tree.query(&ctx.store, &[pab], Color::Transparent).is_none());

        let paa = ctx.lit("p", true, &[a, a]);
        assert!(tree.query(&ctx.store, &[paa], Color::Transparent).is_some());
    }

    #[test]
    fn test_multi_literal_backtracking() {
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        // p(X) | q(X) subsumes q(b) | p(a) ... only with X := a for p and
        // X := a for q? No — q(a) is absent, so it must fail.
        let px = ctx.lit("p", true, &[x]);
        let qx = ctx.lit("q", true, &[x]);
        let subsumer = ctx.clause(vec![px, qx]);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, subsumer);

        let pa = ctx.lit("p", true, &[a]);
        let qb = ctx.lit("q", true, &[b]);
        assert!(tree
            .query(&ctx.store, &[qb, pa], Color::Transparent)
            .is_none());

        // With q(a) present the assignment succeeds in any literal order
        let qa = ctx.lit("q", true, &[a]);
        assert!(tree
            .query(&ctx.store, &[qa, pa], Color::Transparent)
            .is_some());
    }

    #[test]
    fn test_subsumption_resolution() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");

        // Indexed: p(a) | q(a); query: ~p(a) | q(a) | r(a)
        // Resolution on p removes ~p(a) from the query.
        let pa = ctx.lit("p", true, &[a]);
        let qa = ctx.lit("q", true, &[a]);
        let subsumer = ctx.clause(vec![pa, qa]);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, Arc::clone(&subsumer));

        let npa = ctx.lit("p", false, &[a]);
        let ra = ctx.lit("r", true, &[a]);
        let result = tree.query(&ctx.store, &[npa, qa, ra], Color::Transparent);
        match result {
            Some(CodeMatch::SubsumptionResolution { subsumer: s, resolved }) => {
                assert_eq!(s.id, subsumer.id);
                assert_eq!(resolved, 0);
            }
            other => panic!("expected subsumption resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_color_incompatibility_blocks() {
        let mut ctx = Ctx::new();
        let x = ctx.store.var(0);
        let a = ctx.const_("a");

        let px = ctx.lit("p", true, &[x]);
        let subsumer = ctx.clause_colored(vec![px], Color::Left);

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, subsumer);

        let pa = ctx.lit("p", true, &[a]);
        assert!(tree.query(&ctx.store, &[pa], Color::Right).is_none());
        assert!(tree.query(&ctx.store, &[pa], Color::Left).is_some());
        assert!(tree.query(&ctx.store, &[pa], Color::Transparent).is_some());
    }

    #[test]
    fn test_removal() {
        let mut ctx = Ctx::new();
        let a = ctx.const_("a");
        let pa = ctx.lit("p", true, &[a]);
        let subsumer = ctx.clause(vec![pa]);
        let id = subsumer.id;

        let mut tree = CodeTree::new();
        tree.insert(&ctx.store, subsumer);
        assert!(tree.query(&ctx.store, &[pa], Color::Transparent).is_some());

        tree.remove(id);
        assert!(tree.query(&ctx.store, &[pa], Color::Transparent).is_none());
    }
}
