//! The query executor: gate, submit, poll, fetch.
//!
//! One `run()` call is one fresh remote query. Each remote interaction
//! (submit, every status check, every result page) goes through the retry
//! executor individually, so a transient network blip mid-poll does not fail
//! the whole query.

use datascout_core::error::QueryError;
use datascout_core::poll::{PollOutcome, PollPolicy, poll_until};
use datascout_core::query::{QueryId, QueryResults, QueryService, QueryStatus};
use datascout_core::retry::{RetryPolicy, retry};
use datascout_core::QueryState;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::safety::validate_read_only;

/// Drives a statement from submission to complete results.
pub struct QueryExecutor {
    service: Arc<dyn QueryService>,
    retry_policy: RetryPolicy,
    poll_policy: PollPolicy,
    output_location: String,
}

/// Cancels the remote query if the execution future is dropped mid-flight.
///
/// The caller may abandon `run()` at any await point (the orchestrator's
/// per-question timeout drops the whole exchange). A submitted query must
/// not keep running on the warehouse after that, so the guard stays armed
/// from submission until a terminal state is observed and issues a detached
/// best-effort cancel on drop.
struct CancelOnDrop {
    service: Arc<dyn QueryService>,
    query_id: Option<QueryId>,
}

impl CancelOnDrop {
    fn arm(service: Arc<dyn QueryService>, query_id: QueryId) -> Self {
        Self {
            service,
            query_id: Some(query_id),
        }
    }

    fn disarm(&mut self) {
        self.query_id = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let Some(query_id) = self.query_id.take() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        warn!(query_id = %query_id, "Execution dropped mid-flight, cancelling remote query");
        let service = self.service.clone();
        handle.spawn(async move {
            if let Err(e) = service.cancel(&query_id).await {
                warn!(query_id = %query_id, error = %e, "Cancel failed");
            }
        });
    }
}

impl QueryExecutor {
    pub fn new(
        service: Arc<dyn QueryService>,
        retry_policy: RetryPolicy,
        poll_policy: PollPolicy,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            service,
            retry_policy,
            poll_policy,
            output_location: output_location.into(),
        }
    }

    /// Execute a read-only statement and return its complete results.
    ///
    /// Errors:
    /// - [`QueryError::Rejected`] — the safety gate refused the statement,
    ///   nothing was submitted
    /// - [`QueryError::ExecutionFailed`] — the remote query reached FAILED
    ///   or CANCELLED; carries the service-reported reason
    /// - [`QueryError::Timeout`] — no terminal state within the poll budget;
    ///   a best-effort cancel was issued
    pub async fn run(&self, sql: &str) -> Result<QueryResults, QueryError> {
        let statement = validate_read_only(sql)?;

        let query_id = retry("query_submit", &self.retry_policy, || {
            self.service.submit(&statement, &self.output_location)
        })
        .await
        .map_err(|e| e.into_inner())?;

        debug!(query_id = %query_id, "Query submitted");

        let mut cancel_guard = CancelOnDrop::arm(self.service.clone(), query_id.clone());

        let outcome = poll_until(
            &self.poll_policy,
            || async {
                retry("query_status", &self.retry_policy, || {
                    self.service.status(&query_id)
                })
                .await
                .map_err(|e| e.into_inner())
            },
            |status: &QueryStatus| status.state.is_terminal(),
        )
        .await?;

        let status = match outcome {
            PollOutcome::Terminal(status) => {
                cancel_guard.disarm();
                status
            }
            PollOutcome::TimedOut { waited_secs } => {
                cancel_guard.disarm();
                warn!(query_id = %query_id, waited_secs, "Query exceeded poll budget, cancelling");
                // Best-effort: a failed cancel is logged, never propagated.
                if let Err(e) = self.service.cancel(&query_id).await {
                    warn!(query_id = %query_id, error = %e, "Cancel failed");
                }
                return Err(QueryError::Timeout { waited_secs });
            }
        };

        match status.state {
            QueryState::Succeeded => {}
            state => {
                return Err(QueryError::ExecutionFailed {
                    state: state.to_string(),
                    reason: status.reason.unwrap_or_else(|| "No reason reported".into()),
                });
            }
        }

        let mut columns = Vec::new();
        let mut rows = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let token = next_token.clone();
            let page = retry("query_results", &self.retry_policy, || {
                self.service.results(&query_id, token.as_deref())
            })
            .await
            .map_err(|e| e.into_inner())?;

            if columns.is_empty() {
                columns = page.columns;
            }
            rows.extend(page.rows);

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        info!(query_id = %query_id, rows = rows.len(), "Query complete");

        Ok(QueryResults {
            query_id,
            columns,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use datascout_core::query::ResultPage;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Scripted QueryService for executor tests.
    struct MockQueryService {
        /// Status checks before reaching the terminal state.
        running_checks: u32,
        terminal: QueryState,
        reason: Option<String>,
        pages: u32,
        /// Submit failures (transient) before success.
        submit_failures: u32,

        submits: AtomicU32,
        status_calls: AtomicU32,
        cancels: AtomicU32,
    }

    impl MockQueryService {
        fn succeeding(running_checks: u32, pages: u32) -> Self {
            Self {
                running_checks,
                terminal: QueryState::Succeeded,
                reason: None,
                pages,
                submit_failures: 0,
                submits: AtomicU32::new(0),
                status_calls: AtomicU32::new(0),
                cancels: AtomicU32::new(0),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                running_checks: 0,
                terminal: QueryState::Failed,
                reason: Some(reason.into()),
                pages: 0,
                submit_failures: 0,
                submits: AtomicU32::new(0),
                status_calls: AtomicU32::new(0),
                cancels: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryService for MockQueryService {
        async fn submit(&self, _sql: &str, _output: &str) -> Result<QueryId, QueryError> {
            let n = self.submits.fetch_add(1, Ordering::SeqCst);
            if n < self.submit_failures {
                return Err(QueryError::Throttled);
            }
            Ok(QueryId("q-test".into()))
        }

        async fn status(&self, _id: &QueryId) -> Result<QueryStatus, QueryError> {
            let n = self.status_calls.fetch_add(1, Ordering::SeqCst);
            if n < self.running_checks {
                Ok(QueryStatus {
                    state: QueryState::Running,
                    reason: None,
                })
            } else {
                Ok(QueryStatus {
                    state: self.terminal,
                    reason: self.reason.clone(),
                })
            }
        }

        async fn results(
            &self,
            _id: &QueryId,
            next_token: Option<&str>,
        ) -> Result<ResultPage, QueryError> {
            let page_no: u32 = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
            let next = page_no + 1;
            Ok(ResultPage {
                columns: vec!["x".into()],
                rows: vec![vec![Some(page_no.to_string())]],
                next_token: (next < self.pages).then(|| next.to_string()),
            })
        }

        async fn cancel(&self, _id: &QueryId) -> Result<(), QueryError> {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_executor(service: Arc<MockQueryService>) -> QueryExecutor {
        QueryExecutor::new(
            service,
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(5),
                max_delay: Duration::from_millis(20),
            },
            PollPolicy {
                initial_interval: Duration::from_millis(5),
                max_interval: Duration::from_millis(20),
                max_wait: Duration::from_millis(200),
            },
            "s3://results/",
        )
    }

    #[tokio::test]
    async fn success_path_concatenates_pages() {
        let service = Arc::new(MockQueryService::succeeding(2, 3));
        let executor = fast_executor(service.clone());

        let results = executor.run("SELECT x FROM t").await.unwrap();
        assert_eq!(results.columns, vec!["x"]);
        assert_eq!(results.row_count(), 3);
        assert_eq!(results.rows[0][0].as_deref(), Some("0"));
        assert_eq!(results.rows[2][0].as_deref(), Some("2"));
        assert_eq!(service.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_query_reports_reason() {
        let service = Arc::new(MockQueryService::failing("SYNTAX_ERROR: line 1:8"));
        let executor = fast_executor(service);

        let err = executor.run("SELECT bad syntax").await.unwrap_err();
        match err {
            QueryError::ExecutionFailed { state, reason } => {
                assert_eq!(state, "FAILED");
                assert!(reason.contains("SYNTAX_ERROR"));
            }
            other => panic!("Expected ExecutionFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_sql_never_submits() {
        let service = Arc::new(MockQueryService::succeeding(0, 1));
        let executor = fast_executor(service.clone());

        let err = executor.run("DROP TABLE t").await.unwrap_err();
        assert!(matches!(err, QueryError::Rejected(_)));
        assert_eq!(service.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transient_submit_failures_are_retried() {
        let mut service = MockQueryService::succeeding(0, 1);
        service.submit_failures = 2;
        let service = Arc::new(service);
        let executor = fast_executor(service.clone());

        let results = executor.run("SELECT 1").await.unwrap();
        assert_eq!(results.row_count(), 1);
        assert_eq!(service.submits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn dropped_run_cancels_in_flight_query() {
        // The caller abandons the execution mid-poll, the way the
        // orchestrator's question timeout drops the whole exchange.
        let service = Arc::new(MockQueryService::succeeding(u32::MAX, 1));
        let executor = fast_executor(service.clone());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(40), executor.run("SELECT 1")).await;
        assert!(abandoned.is_err());

        // The drop guard's detached cancel task needs a moment to run.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(service.cancels.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completed_run_does_not_cancel() {
        let service = Arc::new(MockQueryService::succeeding(1, 1));
        let executor = fast_executor(service.clone());

        executor.run("SELECT 1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(service.cancels.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn poll_timeout_cancels_and_errors() {
        // Never reaches terminal within the 200ms budget.
        let service = Arc::new(MockQueryService::succeeding(u32::MAX, 1));
        let executor = fast_executor(service.clone());

        let err = executor.run("SELECT 1").await.unwrap_err();
        assert!(matches!(err, QueryError::Timeout { .. }));
        assert_eq!(service.cancels.load(Ordering::SeqCst), 1);
    }
}
