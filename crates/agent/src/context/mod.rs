//! Context window assembly.
//!
//! Before each question the orchestrator selects which history messages the
//! planner gets to see: the most recent N, optionally filtered by lexical
//! relevance to the question. Selection is pure and deterministic — the same
//! history and question always produce the same context.

pub mod similarity;
pub mod window;

pub use similarity::similarity_score;
pub use window::ContextWindow;
