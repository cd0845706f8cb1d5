//! The warehouse tool catalog.
//!
//! Four tools, one file each: `run_query` executes a read-only statement,
//! the other three explore the catalog so the planner can write correct SQL.
//! [`warehouse_registry`] assembles them into a [`ToolRegistry`].

pub mod describe_table;
pub mod list_databases;
pub mod list_tables;
pub mod run_query;

pub use describe_table::DescribeTableTool;
pub use list_databases::ListDatabasesTool;
pub use list_tables::ListTablesTool;
pub use run_query::RunQueryTool;

use datascout_core::catalog::CatalogService;
use datascout_core::tool::ToolRegistry;
use datascout_warehouse::QueryExecutor;
use std::sync::Arc;

/// Build the registry holding the full warehouse tool catalog.
pub fn warehouse_registry(
    executor: Arc<QueryExecutor>,
    catalog: Arc<dyn CatalogService>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(RunQueryTool::new(executor)));
    registry.register(Box::new(ListDatabasesTool::new(catalog.clone())));
    registry.register(Box::new(ListTablesTool::new(catalog.clone())));
    registry.register(Box::new(DescribeTableTool::new(catalog)));
    registry
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use datascout_core::catalog::{CatalogService, ColumnSchema, TableSchema};
    use datascout_core::error::QueryError;

    /// Fixed two-database catalog for tool tests.
    pub struct FixedCatalog;

    #[async_trait]
    impl CatalogService for FixedCatalog {
        async fn list_databases(&self) -> Result<Vec<String>, QueryError> {
            Ok(vec!["analytics".into(), "gam_prog".into()])
        }

        async fn list_tables(&self, database: &str) -> Result<Vec<String>, QueryError> {
            match database {
                "analytics" => Ok(vec!["events".into(), "users".into()]),
                "gam_prog" => Ok(vec!["daily_revenue".into()]),
                other => Err(QueryError::ApiError {
                    status_code: 404,
                    message: format!("Database not found: {other}"),
                }),
            }
        }

        async fn describe_table(
            &self,
            database: &str,
            table: &str,
        ) -> Result<TableSchema, QueryError> {
            if database != "gam_prog" || table != "daily_revenue" {
                return Err(QueryError::ApiError {
                    status_code: 404,
                    message: format!("Table not found: {database}.{table}"),
                });
            }
            Ok(TableSchema {
                database: database.into(),
                table: table.into(),
                columns: vec![
                    ColumnSchema {
                        name: "dimension.date".into(),
                        data_type: "string".into(),
                    },
                    ColumnSchema {
                        name: "column.total_cpm_cpc_revenue".into(),
                        data_type: "bigint".into(),
                    },
                ],
                partitions: vec![ColumnSchema {
                    name: "dt".into(),
                    data_type: "string".into(),
                }],
            })
        }
    }
}
