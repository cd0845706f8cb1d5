//! JSON gateway client for the query and catalog services.
//!
//! The gateway fronts the actual warehouse (execution engine + metadata
//! catalog) behind a small JSON API:
//!
//! ```text
//! POST /v1/queries                     {sql, output_location, workgroup} -> {query_id}
//! GET  /v1/queries/{id}                -> {state, reason?}
//! GET  /v1/queries/{id}/results        ?next_token= -> {columns, rows, next_token?}
//! POST /v1/queries/{id}/cancel         -> 200
//! GET  /v1/catalog/databases           -> {databases}
//! GET  /v1/catalog/databases/{db}/tables -> {tables}
//! GET  /v1/catalog/databases/{db}/tables/{table} -> TableSchema
//! ```
//!
//! Like the planner client, this never retries on its own. Every failure is
//! classified into [`QueryError`] for the retry executor.

use async_trait::async_trait;
use datascout_core::catalog::{CatalogService, TableSchema};
use datascout_core::error::QueryError;
use datascout_core::query::{QueryId, QueryService, QueryStatus, ResultPage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shared HTTP plumbing for the two gateway services.
#[derive(Clone)]
struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    fn new(base_url: impl Into<String>) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| QueryError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map a non-200 response to a QueryError.
    async fn classify(&self, response: reqwest::Response) -> QueryError {
        let status = response.status().as_u16();
        if status == 429 {
            return QueryError::Throttled;
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status, body = %body, "Query gateway error");
        QueryError::ApiError {
            status_code: status,
            message: body,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, QueryError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| QueryError::Network(format!("Malformed gateway response: {e}")))
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, QueryError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.classify(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| QueryError::Network(format!("Malformed gateway response: {e}")))
    }
}

/// `QueryService` over the JSON gateway.
pub struct HttpQueryService {
    gateway: GatewayClient,
    workgroup: String,
}

impl HttpQueryService {
    pub fn new(base_url: impl Into<String>, workgroup: impl Into<String>) -> Result<Self, QueryError> {
        Ok(Self {
            gateway: GatewayClient::new(base_url)?,
            workgroup: workgroup.into(),
        })
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    sql: &'a str,
    output_location: &'a str,
    workgroup: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    query_id: String,
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn submit(&self, sql: &str, output_location: &str) -> Result<QueryId, QueryError> {
        debug!(workgroup = %self.workgroup, "Submitting query");
        let resp: SubmitResponse = self
            .gateway
            .post_json(
                "/v1/queries",
                &SubmitRequest {
                    sql,
                    output_location,
                    workgroup: &self.workgroup,
                },
            )
            .await?;
        Ok(QueryId(resp.query_id))
    }

    async fn status(&self, id: &QueryId) -> Result<QueryStatus, QueryError> {
        self.gateway.get_json(&format!("/v1/queries/{id}")).await
    }

    async fn results(
        &self,
        id: &QueryId,
        next_token: Option<&str>,
    ) -> Result<ResultPage, QueryError> {
        let path = match next_token {
            Some(token) => format!("/v1/queries/{id}/results?next_token={token}"),
            None => format!("/v1/queries/{id}/results"),
        };
        self.gateway.get_json(&path).await
    }

    async fn cancel(&self, id: &QueryId) -> Result<(), QueryError> {
        let response = self
            .gateway
            .client
            .post(self.gateway.url(&format!("/v1/queries/{id}/cancel")))
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(self.gateway.classify(response).await);
        }
        Ok(())
    }
}

/// `CatalogService` over the JSON gateway.
pub struct HttpCatalogService {
    gateway: GatewayClient,
}

impl HttpCatalogService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, QueryError> {
        Ok(Self {
            gateway: GatewayClient::new(base_url)?,
        })
    }
}

#[derive(Deserialize)]
struct DatabasesResponse {
    databases: Vec<String>,
}

#[derive(Deserialize)]
struct TablesResponse {
    tables: Vec<String>,
}

#[async_trait]
impl CatalogService for HttpCatalogService {
    async fn list_databases(&self) -> Result<Vec<String>, QueryError> {
        let resp: DatabasesResponse = self.gateway.get_json("/v1/catalog/databases").await?;
        Ok(resp.databases)
    }

    async fn list_tables(&self, database: &str) -> Result<Vec<String>, QueryError> {
        let resp: TablesResponse = self
            .gateway
            .get_json(&format!("/v1/catalog/databases/{database}/tables"))
            .await?;
        Ok(resp.tables)
    }

    async fn describe_table(&self, database: &str, table: &str) -> Result<TableSchema, QueryError> {
        self.gateway
            .get_json(&format!("/v1/catalog/databases/{database}/tables/{table}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let svc = HttpQueryService::new("http://localhost:8181/", "primary").unwrap();
        assert_eq!(svc.gateway.base_url, "http://localhost:8181");
        assert_eq!(
            svc.gateway.url("/v1/queries"),
            "http://localhost:8181/v1/queries"
        );
    }

    #[test]
    fn submit_request_wire_format() {
        let req = SubmitRequest {
            sql: "SELECT 1",
            output_location: "s3://results/",
            workgroup: "primary",
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"sql\":\"SELECT 1\""));
        assert!(json.contains("\"workgroup\":\"primary\""));
    }

    #[test]
    fn submit_response_parses() {
        let resp: SubmitResponse =
            serde_json::from_str(r#"{"query_id": "q-123abc"}"#).unwrap();
        assert_eq!(resp.query_id, "q-123abc");
    }

    #[test]
    fn status_response_parses() {
        let status: QueryStatus = serde_json::from_str(
            r#"{"state": "FAILED", "reason": "SYNTAX_ERROR: line 1:8"}"#,
        )
        .unwrap();
        assert_eq!(status.state, datascout_core::QueryState::Failed);
        assert!(status.reason.unwrap().contains("SYNTAX_ERROR"));
    }

    #[test]
    fn result_page_with_token_parses() {
        let page: ResultPage = serde_json::from_str(
            r#"{"columns": ["x"], "rows": [["1"], ["2"]], "next_token": "page2"}"#,
        )
        .unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.next_token.as_deref(), Some("page2"));
    }
}
