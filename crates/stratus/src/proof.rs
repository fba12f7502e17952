//! Derivation extraction and printing
//!
//! A refutation is the inference DAG rooted at the empty clause. Parent
//! pointers are shared, so extraction is a single walk from the root
//! collecting every ancestor, printed oldest-first.

use crate::fol::{Clause, Signature, TermStore};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An inference DAG rooted at one clause, in topological order.
#[derive(Debug, Clone)]
pub struct Derivation {
    steps: Vec<Arc<Clause>>,
}

/// One derivation step in the wire format.
#[derive(Debug, Clone, Serialize)]
pub struct WireStep {
    pub id: u32,
    pub clause: String,
    pub rule: String,
    pub parents: Vec<u32>,
}

impl Derivation {
    /// Collect all ancestors of `root` (the root included).
    pub fn from_clause(root: &Arc<Clause>) -> Derivation {
        let mut seen: HashSet<u32> = HashSet::new();
        let mut steps: Vec<Arc<Clause>> = Vec::new();
        let mut stack = vec![Arc::clone(root)];
        while let Some(clause) = stack.pop() {
            if !seen.insert(clause.id) {
                continue;
            }
            for parent in &clause.inference.parents {
                stack.push(Arc::clone(parent));
            }
            steps.push(clause);
        }
        steps.sort_by_key(|c| c.id);
        Derivation { steps }
    }

    /// Number of non-input inference steps.
    pub fn length(&self) -> usize {
        self.steps
            .iter()
            .filter(|c| !c.inference.parents.is_empty())
            .count()
    }

    pub fn steps(&self) -> &[Arc<Clause>] {
        &self.steps
    }

    pub fn display<'a>(
        &'a self,
        store: &'a TermStore,
        signature: &'a Signature,
    ) -> DerivationDisplay<'a> {
        DerivationDisplay {
            derivation: self,
            store,
            signature,
        }
    }

    pub fn to_wire(&self, store: &TermStore, signature: &Signature) -> Vec<WireStep> {
        self.steps
            .iter()
            .map(|clause| WireStep {
                id: clause.id,
                clause: clause.display(store, signature).to_string(),
                rule: clause.inference.rule.name().to_string(),
                parents: clause.inference.parents.iter().map(|p| p.id).collect(),
            })
            .collect()
    }
}

pub struct DerivationDisplay<'a> {
    derivation: &'a Derivation,
    store: &'a TermStore,
    signature: &'a Signature,
}

impl fmt::Display for DerivationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for clause in &self.derivation.steps {
            write!(
                f,
                "{}. {} [{}",
                clause.id,
                clause.display(self.store, self.signature),
                clause.inference.rule.name()
            )?;
            for (i, parent) in clause.inference.parents.iter().enumerate() {
                if i == 0 {
                    write!(f, " ")?;
                } else {
                    write!(f, ",")?;
                }
                write!(f, "{}", parent.id)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
