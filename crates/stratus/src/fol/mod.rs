//! First-order logic data structures
//!
//! Terms and literals live in a perfectly shared store; clauses are
//! reference-counted multisets of literal handles carrying derivation
//! metadata. The simplification ordering (KBO) and banked substitutions
//! operate directly on shared handles.

pub mod clause;
pub mod ordering;
pub mod signature;
pub mod substitution;
pub mod term;
pub mod theory;

pub use clause::{AuxScope, Clause, Color, Inference, InputKind, Rule, Store};
pub use ordering::{Kbo, KboConfig, Ordering};
pub use signature::{FunctionId, PredicateId, Signature, SortId};
pub use substitution::{are_unifiable, mgu, Bank, BankedSubst, BankedVar, VarRenamer};
pub use term::{ArgOrder, Literal, LiteralId, Term, TermId, TermStore, VarId};
