//! `run_query` — execute a read-only SQL statement against the warehouse.

use async_trait::async_trait;
use datascout_core::error::ToolError;
use datascout_core::tool::{Tool, ToolResult};
use datascout_warehouse::QueryExecutor;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Rows beyond this are dropped from the tool output so a huge result set
/// cannot blow up the planner's context.
const MAX_OUTPUT_ROWS: usize = 1000;

pub struct RunQueryTool {
    executor: Arc<QueryExecutor>,
}

impl RunQueryTool {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }
}

#[derive(Deserialize)]
struct Args {
    sql: String,
}

#[async_trait]
impl Tool for RunQueryTool {
    fn name(&self) -> &str {
        "run_query"
    }

    fn description(&self) -> &str {
        "Execute a read-only SQL query (SELECT, WITH, or EXPLAIN) against the data warehouse \
         and return the result rows. Write and DDL statements are rejected."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "A single read-only SQL statement"
                }
            },
            "required": ["sql"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("run_query: {e}")))?;

        debug!(sql = %args.sql, "Running query");

        match self.executor.run(&args.sql).await {
            Ok(results) => {
                let row_count = results.row_count();
                let truncated = row_count > MAX_OUTPUT_ROWS;
                let rows: Vec<_> = results.rows.into_iter().take(MAX_OUTPUT_ROWS).collect();

                let output = serde_json::json!({
                    "columns": results.columns,
                    "rows": rows,
                    "row_count": row_count,
                    "truncated": truncated,
                });
                Ok(ToolResult::ok("", output.to_string()))
            }
            // The planner sees the failure and can correct its SQL.
            Err(e) => Ok(ToolResult::error("", format!("Query failed: {e}"))),
        }
    }
}
