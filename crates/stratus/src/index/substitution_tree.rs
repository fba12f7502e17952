//! Term index: a discrimination tree with substitution-producing queries
//!
//! Indexed terms are flattened into their preorder symbol string and stored
//! in a trie; variables become wildcards. One tree answers the three query
//! roles — generalizations, instances, and unifications — through a shared
//! lazy iterator that walks the trie as an explicit state machine (a stack
//! of node frames advanced by `next()`), so a partially drained query can be
//! dropped at any point.
//!
//! The trie is a pre-filter: every candidate reaching a leaf is confirmed by
//! the banked substitution (match or unify), and the confirming substitution
//! is yielded with the entry. Query terms live in bank 0, indexed terms in
//! bank 1. Deletion is lazy through a live-clause set.

use crate::fol::{Bank, BankedSubst, Clause, FunctionId, Term, TermStore};
use std::collections::HashSet;
use std::sync::Arc;

/// Bank of query terms in yielded substitutions.
pub const QUERY_BANK: Bank = 0;
/// Bank of indexed terms in yielded substitutions.
pub const RESULT_BANK: Bank = 1;

/// One indexed occurrence: a term inside a literal of a clause.
#[derive(Debug, Clone)]
pub struct TermEntry {
    pub clause: Arc<Clause>,
    /// Index of the literal within the clause
    pub lit_index: usize,
    pub term: Term,
}

/// Retrieval mode of a query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Indexed `s` with σ such that `sσ = query`
    Generalizations,
    /// Indexed `s` with σ such that `queryσ = s`
    Instances,
    /// Indexed `s` with σ unifying `s` and the query
    Unifications,
}

/// Flattened key of one preorder position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FlatKey {
    /// Application symbol; the arity drives wildcard skip counts
    App(FunctionId, u8),
    /// Any variable
    Var,
}

impl FlatKey {
    fn arity(self) -> usize {
        match self {
            FlatKey::App(_, n) => n as usize,
            FlatKey::Var => 0,
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    children: Vec<(FlatKey, usize)>,
    entries: Vec<TermEntry>,
}

/// Discrimination tree over term shapes.
#[derive(Debug)]
pub struct TermIndex {
    nodes: Vec<Node>,
    live: HashSet<u32>,
    len: usize,
}

impl Default for TermIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TermIndex {
    pub fn new() -> Self {
        TermIndex {
            nodes: vec![Node::default()],
            live: HashSet::new(),
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn flatten(store: &TermStore, term: Term, keys: &mut Vec<FlatKey>) {
        match term {
            Term::Var(_) => keys.push(FlatKey::Var),
            Term::App(id) => {
                let node = store.node(id);
                keys.push(FlatKey::App(node.functor, node.args.len() as u8));
                for &arg in node.args.iter() {
                    Self::flatten(store, arg, keys);
                }
            }
        }
    }

    /// Insert an occurrence; the owning clause becomes live.
    pub fn insert(&mut self, store: &TermStore, entry: TermEntry) {
        let mut keys = Vec::new();
        Self::flatten(store, entry.term, &mut keys);

        let mut node = 0usize;
        for key in keys {
            node = match self.nodes[node].children.iter().find(|(k, _)| *k == key) {
                Some(&(_, child)) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.push((key, child));
                    child
                }
            };
        }
        self.live.insert(entry.clause.id);
        self.nodes[node].entries.push(entry);
        self.len += 1;
    }

    /// Retract all occurrences of a clause (lazy: hides them from queries).
    pub fn remove(&mut self, clause_id: u32) {
        self.live.remove(&clause_id);
    }

    /// Open a lazy query in the given retrieval mode.
    pub fn query<'a, 'b>(
        &'a self,
        store: &'b TermStore,
        query: Term,
        mode: Retrieval,
    ) -> QueryIter<'a, 'b> {
        let mut qkeys = Vec::new();
        Self::flatten(store, query, &mut qkeys);
        let qsizes = subterm_sizes(&qkeys);
        QueryIter {
            index: self,
            store,
            query,
            qkeys,
            qsizes,
            mode,
            stack: vec![Frame {
                node: 0,
                qpos: 0,
                pending: 0,
                cursor: 0,
            }],
            leaf: None,
        }
    }
}

/// Precompute the flattened length of the subterm starting at each position.
fn subterm_sizes(keys: &[FlatKey]) -> Vec<usize> {
    let mut sizes = vec![0usize; keys.len()];
    for start in (0..keys.len()).rev() {
        let mut size = 1;
        let mut remaining = keys[start].arity();
        while remaining > 0 {
            let child = start + size;
            size += sizes[child];
            remaining -= 1;
        }
        sizes[start] = size;
    }
    sizes
}

/// Position inside the trie walk.
#[derive(Debug, Copy, Clone)]
struct Frame {
    node: usize,
    /// Next query key to consume
    qpos: usize,
    /// Remaining trie keys of a skipped indexed subterm (0 = aligned)
    pending: usize,
    /// Next child branch of `node` to try
    cursor: usize,
}

/// Lazy query iterator: an explicit stack machine over the trie.
pub struct QueryIter<'a, 'b> {
    index: &'a TermIndex,
    store: &'b TermStore,
    query: Term,
    qkeys: Vec<FlatKey>,
    qsizes: Vec<usize>,
    mode: Retrieval,
    stack: Vec<Frame>,
    /// Leaf currently being drained: (node, next entry)
    leaf: Option<(usize, usize)>,
}

impl QueryIter<'_, '_> {
    /// Confirm a trie candidate and produce the binding substitution.
    fn confirm(&self, entry: &TermEntry) -> Option<BankedSubst> {
        let mut subst = BankedSubst::new();
        let ok = match self.mode {
            Retrieval::Generalizations => {
                subst.match_term(self.store, entry.term, RESULT_BANK, self.query, QUERY_BANK)
            }
            Retrieval::Instances => {
                subst.match_term(self.store, self.query, QUERY_BANK, entry.term, RESULT_BANK)
            }
            Retrieval::Unifications => {
                subst.unify(self.store, self.query, QUERY_BANK, entry.term, RESULT_BANK)
            }
        };
        if ok {
            Some(subst)
        } else {
            None
        }
    }

    /// Push the successor frame for taking child `(key, child)` from `frame`.
    fn step_into(&mut self, frame: Frame, key: FlatKey, child: usize) {
        if frame.pending > 0 {
            // Inside a skipped indexed subterm: consume trie keys until the
            // subterm is complete, then move past the query wildcard.
            let pending = frame.pending - 1 + key.arity();
            let qpos = if pending == 0 { frame.qpos + 1 } else { frame.qpos };
            self.stack.push(Frame {
                node: child,
                qpos,
                pending,
                cursor: 0,
            });
            return;
        }

        let qkey = self.qkeys[frame.qpos];
        match self.mode {
            Retrieval::Generalizations => {
                if key == FlatKey::Var {
                    // Indexed wildcard swallows one whole query subterm
                    self.stack.push(Frame {
                        node: child,
                        qpos: frame.qpos + self.qsizes[frame.qpos],
                        pending: 0,
                        cursor: 0,
                    });
                } else if key == qkey {
                    self.stack.push(Frame {
                        node: child,
                        qpos: frame.qpos + 1,
                        pending: 0,
                        cursor: 0,
                    });
                }
            }
            Retrieval::Instances => {
                if qkey == FlatKey::Var {
                    // Query wildcard swallows one whole indexed subterm
                    let pending = key.arity();
                    let qpos = if pending == 0 { frame.qpos + 1 } else { frame.qpos };
                    self.stack.push(Frame {
                        node: child,
                        qpos,
                        pending,
                        cursor: 0,
                    });
                } else if key == qkey {
                    self.stack.push(Frame {
                        node: child,
                        qpos: frame.qpos + 1,
                        pending: 0,
                        cursor: 0,
                    });
                }
            }
            Retrieval::Unifications => {
                if key == qkey {
                    self.stack.push(Frame {
                        node: child,
                        qpos: frame.qpos + 1,
                        pending: 0,
                        cursor: 0,
                    });
                } else if key == FlatKey::Var {
                    self.stack.push(Frame {
                        node: child,
                        qpos: frame.qpos + self.qsizes[frame.qpos],
                        pending: 0,
                        cursor: 0,
                    });
                } else if qkey == FlatKey::Var {
                    let pending = key.arity();
                    let qpos = if pending == 0 { frame.qpos + 1 } else { frame.qpos };
                    self.stack.push(Frame {
                        node: child,
                        qpos,
                        pending,
                        cursor: 0,
                    });
                }
            }
        }
    }
}

impl<'a> Iterator for QueryIter<'a, '_> {
    type Item = (&'a TermEntry, BankedSubst);

    fn next(&mut self) -> Option<Self::Item> {
        // Copy of the shared index reference, so yielded entries borrow the
        // index for 'a rather than this iterator.
        let index: &'a TermIndex = self.index;
        loop {
            // Drain the current leaf first
            if let Some((node, cursor)) = self.leaf {
                let entries = &index.nodes[node].entries;
                if cursor < entries.len() {
                    self.leaf = Some((node, cursor + 1));
                    let entry = &entries[cursor];
                    if !index.live.contains(&entry.clause.id) {
                        continue;
                    }
                    if let Some(subst) = self.confirm(entry) {
                        return Some((entry, subst));
                    }
                    continue;
                }
                self.leaf = None;
            }

            let frame = match self.stack.last_mut() {
                Some(f) => {
                    let copy = *f;
                    f.cursor += 1;
                    copy
                }
                None => return None,
            };

            // Aligned at the end of the query: this node is a candidate leaf
            if frame.pending == 0 && frame.qpos == self.qkeys.len() {
                self.stack.pop();
                self.leaf = Some((frame.node, 0));
                continue;
            }

            match index.nodes[frame.node].children.get(frame.cursor) {
                Some(&(key, child)) => self.step_into(frame, key, child),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
