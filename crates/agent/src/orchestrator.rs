//! The tool-call orchestration loop.
//!
//! One question is one exchange: assemble context, call the planner, execute
//! whatever tools it asks for, feed the results back, repeat until it answers
//! in plain text or a guard trips. Every way out of the loop produces
//! user-facing text — the caller never has to turn an error into prose.
//!
//! Thread history only ever gains two messages per question: the question
//! and the final answer. The intermediate tool traffic is working state,
//! discarded when the exchange ends.

use chrono::Utc;
use datascout_core::error::PlannerError;
use datascout_core::message::{Message, Thread, ThreadId};
use datascout_core::planner::{Planner, PlannerRequest};
use datascout_core::retry::{RetryError, RetryPolicy, retry};
use datascout_core::tool::{ToolCall, ToolRegistry};
use datascout_store::ThreadStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::context::ContextWindow;

const ABORTED_MESSAGE: &str =
    "I couldn't finish answering within the allowed number of query steps. \
     Try narrowing the question or asking it in smaller pieces.";

const TIMEOUT_MESSAGE: &str =
    "That question took too long to answer and was cut off. \
     Try a narrower time range or a simpler question.";

/// Drives one question at a time through the planner/tool loop.
pub struct Orchestrator {
    planner: Arc<dyn Planner>,
    model: String,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    store: Arc<ThreadStore>,
    context: ContextWindow,
    retry_policy: RetryPolicy,
    max_iterations: u32,
    question_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        planner: Arc<dyn Planner>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        store: Arc<ThreadStore>,
    ) -> Self {
        Self {
            planner,
            model: model.into(),
            max_tokens: None,
            tools,
            store,
            context: ContextWindow::default(),
            retry_policy: RetryPolicy::default(),
            max_iterations: 10,
            question_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_context(mut self, context: ContextWindow) -> Self {
        self.context = context;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_question_timeout(mut self, timeout: Duration) -> Self {
        self.question_timeout = timeout;
        self
    }

    /// Answer one question in one thread. Always returns user-facing text.
    ///
    /// Holds the thread's lock for the duration, so questions in the same
    /// thread serialize in arrival order while other threads proceed freely.
    pub async fn handle_question(&self, thread_id: &ThreadId, question: &str) -> String {
        let handle = self.store.entry(thread_id).await;
        let mut thread = handle.lock().await;

        info!(thread_id = %thread_id, "Handling question");

        match tokio::time::timeout(self.question_timeout, self.answer(&mut thread, question)).await
        {
            Ok(answer) => answer,
            // Dropping the exchange future abandons any in-flight tool work;
            // the query executor cancels its remote query on drop.
            Err(_) => {
                warn!(
                    thread_id = %thread_id,
                    timeout_secs = self.question_timeout.as_secs(),
                    "Question timed out"
                );
                TIMEOUT_MESSAGE.into()
            }
        }
    }

    /// Clear a thread's history.
    pub async fn refresh_thread(&self, thread_id: &ThreadId) {
        self.store.clear(thread_id).await;
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are DataScout, a data assistant that answers questions by querying the \
             data warehouse.\n\
             Today's date is {}.\n\n\
             Use the catalog tools (list_databases, list_tables, describe_table) to find \
             the right tables and columns before writing SQL. Execute queries with \
             run_query. Only read-only SQL is allowed: SELECT, WITH, or EXPLAIN.\n\
             When a query fails, read the error, correct the SQL, and try again.\n\
             Answer with the numbers you found, stated plainly.",
            Utc::now().format("%Y-%m-%d")
        )
    }

    async fn answer(&self, thread: &mut Thread, question: &str) -> String {
        // Working state for this exchange. The thread itself is untouched
        // until a final answer exists.
        let mut exchange = self.context.select(&thread.messages, question);
        exchange.push(Message::user(question));

        let tool_definitions = self.tools.definitions();
        let system = self.system_prompt();

        for iteration in 1..=self.max_iterations {
            debug!(iteration, "Orchestration iteration");

            let request = PlannerRequest {
                model: self.model.clone(),
                system: system.clone(),
                messages: exchange.clone(),
                tools: tool_definitions.clone(),
                max_tokens: self.max_tokens,
            };

            let response = match retry("planner_complete", &self.retry_policy, || {
                self.planner.complete(request.clone())
            })
            .await
            {
                Ok(response) => response,
                Err(e) => return Self::planner_failure_text(e),
            };

            if response.is_final() {
                let answer = response.text;
                thread.push(Message::user(question));
                thread.push(Message::assistant(answer.clone()));
                info!(iterations = iteration, "Question answered");
                return answer;
            }

            let tool_calls = response.tool_calls.clone();
            exchange.push(response.into_message());

            for tc in &tool_calls {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                match self.tools.execute(&call).await {
                    Ok(result) => {
                        if result.is_error {
                            debug!(tool = %tc.name, "Tool returned error result");
                        }
                        exchange.push(Message::tool_result(&tc.id, &result.output));
                    }
                    // Dispatch failure (unknown tool, bad arguments). Fed back
                    // like any other error result so the planner can adapt.
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool dispatch failed");
                        exchange.push(Message::tool_result(&tc.id, &format!("Error: {e}")));
                    }
                }
            }
        }

        warn!(max_iterations = self.max_iterations, "Iteration cap reached, aborting");
        ABORTED_MESSAGE.into()
    }

    fn planner_failure_text(err: RetryError<PlannerError>) -> String {
        warn!(error = %err, "Planner unavailable");
        match err.into_inner() {
            PlannerError::RateLimited { .. } | PlannerError::Overloaded(_) => {
                "The answering service is overloaded right now. Please try again in a minute."
                    .into()
            }
            PlannerError::AuthenticationFailed(_) => {
                "I can't reach the answering service due to a configuration problem. \
                 Please contact the operator."
                    .into()
            }
            _ => "Something went wrong while answering. Please try again.".into(),
        }
    }
}
