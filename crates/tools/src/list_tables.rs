//! `list_tables` — enumerate the tables of one database.

use async_trait::async_trait;
use datascout_core::catalog::CatalogService;
use datascout_core::error::ToolError;
use datascout_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use std::sync::Arc;

pub struct ListTablesTool {
    catalog: Arc<dyn CatalogService>,
}

impl ListTablesTool {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }
}

#[derive(Deserialize)]
struct Args {
    database: String,
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        "list_tables"
    }

    fn description(&self) -> &str {
        "List all tables in a database."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "database": {
                    "type": "string",
                    "description": "Database name"
                }
            },
            "required": ["database"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("list_tables: {e}")))?;

        match self.catalog.list_tables(&args.database).await {
            Ok(tables) => {
                let output = serde_json::json!({
                    "database": args.database,
                    "tables": tables,
                });
                Ok(ToolResult::ok("", output.to_string()))
            }
            Err(e) => Ok(ToolResult::error("", format!("Catalog error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedCatalog;

    #[tokio::test]
    async fn lists_tables_for_database() {
        let tool = ListTablesTool::new(Arc::new(FixedCatalog));
        let result = tool
            .execute(serde_json::json!({"database": "analytics"}))
            .await
            .unwrap();
        assert!(!result.is_error);

        let output: serde_json::Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(output["tables"][0], "events");
    }

    #[tokio::test]
    async fn unknown_database_is_error_result() {
        let tool = ListTablesTool::new(Arc::new(FixedCatalog));
        let result = tool
            .execute(serde_json::json!({"database": "nope"}))
            .await
            .unwrap();
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn missing_database_is_invalid_arguments() {
        let tool = ListTablesTool::new(Arc::new(FixedCatalog));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
