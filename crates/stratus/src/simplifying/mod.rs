//! Simplifying inference rules
//!
//! Forward rules simplify a new clause against the active set; backward
//! rules use a freshly activated clause to simplify the active set. A rule
//! either keeps the clause, replaces it with a strictly simpler one, or
//! deletes it, always recording the parents used.

pub mod demodulation;
pub mod evaluation;
pub mod inner_rewriting;
pub mod subsumption;
pub mod tautology;

pub use demodulation::{BackwardDemodulation, ForwardDemodulation};
pub use evaluation::InterpretedEvaluation;
pub use inner_rewriting::InnerRewriting;
pub use subsumption::{subsumes, BackwardSubsumption, ForwardSubsumption};
pub use tautology::TautologyDeletion;
