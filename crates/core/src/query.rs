//! QueryService trait — the abstraction over the remote warehouse.
//!
//! Submit a statement, poll its state, fetch paginated results, best-effort
//! cancel. State transitions are driven only by polling; terminal states are
//! final and immutable.

use crate::error::QueryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the query service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub String);

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote execution state of a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Submitted,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "SUBMITTED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// A status report for a submitted query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStatus {
    pub state: QueryState,

    /// Service-reported reason for FAILED/CANCELLED, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    /// Column names (present on every page; identical across pages).
    pub columns: Vec<String>,

    /// Row values, in order. `None` = NULL.
    pub rows: Vec<Vec<Option<String>>>,

    /// Token for the next page, absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Complete, concatenated results of a successful query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResults {
    pub query_id: QueryId,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResults {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The core QueryService trait.
///
/// Read-only credentials are assumed; DataScout's safety gate guarantees it
/// never submits write/DDL statements regardless.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submit a statement for execution. Returns the assigned query id.
    /// Every invocation submits a new query — no dedup of identical SQL.
    async fn submit(
        &self,
        sql: &str,
        output_location: &str,
    ) -> std::result::Result<QueryId, QueryError>;

    /// Fetch the current execution status.
    async fn status(&self, id: &QueryId) -> std::result::Result<QueryStatus, QueryError>;

    /// Fetch one page of results for a SUCCEEDED query.
    async fn results(
        &self,
        id: &QueryId,
        next_token: Option<&str>,
    ) -> std::result::Result<ResultPage, QueryError>;

    /// Best-effort cancellation of an in-flight query.
    async fn cancel(&self, id: &QueryId) -> std::result::Result<(), QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(QueryState::Succeeded.is_terminal());
        assert!(QueryState::Failed.is_terminal());
        assert!(QueryState::Cancelled.is_terminal());
        assert!(!QueryState::Submitted.is_terminal());
        assert!(!QueryState::Running.is_terminal());
    }

    #[test]
    fn state_wire_format() {
        let json = serde_json::to_string(&QueryState::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");
        let parsed: QueryState = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(parsed, QueryState::Running);
    }

    #[test]
    fn result_page_nulls() {
        let page: ResultPage = serde_json::from_str(
            r#"{"columns": ["date", "revenue"], "rows": [["2025-08-24", null]]}"#,
        )
        .unwrap();
        assert_eq!(page.columns.len(), 2);
        assert_eq!(page.rows[0][1], None);
        assert!(page.next_token.is_none());
    }
}
