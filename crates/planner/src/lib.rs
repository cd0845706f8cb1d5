//! Planner backends for DataScout.
//!
//! Currently ships a single backend: the Anthropic Messages API. The
//! orchestrator only ever sees the [`datascout_core::Planner`] trait, so
//! adding another backend is a new module here, not a core change.

pub mod anthropic;

pub use anthropic::AnthropicPlanner;
