//! # DataScout Core
//!
//! Domain types, traits, and error definitions for the DataScout data
//! assistant. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (LLM planner, warehouse query service, catalog
//! discovery, chat channel) is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)
//!
//! The two resilience primitives every network call flows through also live
//! here: [`retry::retry`] (bounded retry with exponential backoff and jitter)
//! and [`poll::poll_until`] (poll a remote state until it turns terminal).

pub mod catalog;
pub mod channel;
pub mod error;
pub mod message;
pub mod planner;
pub mod poll;
pub mod query;
pub mod retry;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use catalog::{CatalogService, ColumnSchema, TableSchema};
pub use channel::{Channel, ChannelEvent, EventKind};
pub use error::{Error, Result, Retryable};
pub use message::{Message, Role, Thread, ThreadId};
pub use planner::{Planner, PlannerRequest, PlannerResponse, ToolDefinition};
pub use poll::{PollOutcome, PollPolicy};
pub use query::{QueryId, QueryService, QueryState, ResultPage};
pub use retry::{RetryError, RetryPolicy};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
