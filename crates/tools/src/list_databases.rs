//! `list_databases` — enumerate the databases visible in the catalog.

use async_trait::async_trait;
use datascout_core::catalog::CatalogService;
use datascout_core::error::ToolError;
use datascout_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub struct ListDatabasesTool {
    catalog: Arc<dyn CatalogService>,
}

impl ListDatabasesTool {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for ListDatabasesTool {
    fn name(&self) -> &str {
        "list_databases"
    }

    fn description(&self) -> &str {
        "List all databases available in the data warehouse catalog."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        match self.catalog.list_databases().await {
            Ok(databases) => {
                let output = serde_json::json!({ "databases": databases });
                Ok(ToolResult::ok("", output.to_string()))
            }
            Err(e) => Ok(ToolResult::error("", format!("Catalog error: {e}"))),
        }
    }
}
