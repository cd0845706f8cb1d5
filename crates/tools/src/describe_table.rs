//! `describe_table` — columns and partition keys of one table.

use async_trait::async_trait;
use datascout_core::catalog::CatalogService;
use datascout_core::error::ToolError;
use datascout_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::sync::Arc;

pub struct DescribeTableTool {
    catalog: Arc<dyn CatalogService>,
}

impl DescribeTableTool {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }
}

#[derive(Deserialize)]
struct Args {
    database: String,
    table: String,
}

#[async_trait]
impl Tool for DescribeTableTool {
    fn name(&self) -> &str {
        "describe_table"
    }

    fn description(&self) -> &str {
        "Get the full schema of a table: column names, types, and partition keys."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "database": {
                    "type": "string",
                    "description": "Database name"
                },
                "table": {
                    "type": "string",
                    "description": "Table name"
                }
            },
            "required": ["database", "table"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("describe_table: {e}")))?;

        match self.catalog.describe_table(&args.database, &args.table).await {
            Ok(schema) => {
                let output = serde_json::to_string(&schema).map_err(|e| {
                    ToolError::ExecutionFailed {
                        tool_name: "describe_table".into(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(ToolResult::ok("", output))
            }
            Err(e) => Ok(ToolResult::error("", format!("Catalog error: {e}"))),
        }
    }
}
