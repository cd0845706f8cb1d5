//! The orchestration layer: context assembly and the tool-call loop.

pub mod context;
pub mod orchestrator;

pub use context::{ContextWindow, similarity_score};
pub use orchestrator::Orchestrator;
