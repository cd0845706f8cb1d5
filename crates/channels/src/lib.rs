//! Channel adapters.
//!
//! One adapter today: Slack. The core only sees the
//! [`datascout_core::Channel`] trait, so a Teams or Discord adapter would be
//! a new module here.

pub mod slack;

pub use slack::{SlackChannel, SlackSettings, strip_mentions};
