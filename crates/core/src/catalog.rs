//! CatalogService trait — schema discovery for the warehouse.
//!
//! The planner explores the catalog before writing SQL: list databases, list
//! tables, describe a table's columns and partition keys.

use crate::error::QueryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single column in a table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Schema of a warehouse table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub database: String,
    pub table: String,
    pub columns: Vec<ColumnSchema>,

    /// Partition keys, if the table is partitioned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<ColumnSchema>,
}

/// The core CatalogService trait.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Names of all databases visible to the read-only credentials.
    async fn list_databases(&self) -> std::result::Result<Vec<String>, QueryError>;

    /// Names of all tables in a database.
    async fn list_tables(&self, database: &str) -> std::result::Result<Vec<String>, QueryError>;

    /// Full schema for one table.
    async fn describe_table(
        &self,
        database: &str,
        table: &str,
    ) -> std::result::Result<TableSchema, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_schema_serialization() {
        let schema = TableSchema {
            database: "gam_prog".into(),
            table: "daily_revenue".into(),
            columns: vec![ColumnSchema {
                name: "dimension.date".into(),
                data_type: "string".into(),
            }],
            partitions: vec![],
        };
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("daily_revenue"));
        assert!(json.contains("\"type\":\"string\""));
        assert!(!json.contains("partitions"));
    }
}
