//! CLI subcommands.

pub mod ask;
pub mod config_cmd;
pub mod run;

use anyhow::Context;
use datascout_agent::context::ContextWindow;
use datascout_agent::Orchestrator;
use datascout_config::AppConfig;
use datascout_core::retry::RetryPolicy;
use datascout_core::poll::PollPolicy;
use datascout_planner::AnthropicPlanner;
use datascout_store::ThreadStore;
use datascout_warehouse::{HttpCatalogService, HttpQueryService, QueryExecutor};
use std::sync::Arc;
use std::time::Duration;

/// Wire the full orchestration stack from configuration.
pub fn build_orchestrator(
    config: &AppConfig,
) -> anyhow::Result<(Arc<Orchestrator>, Arc<ThreadStore>)> {
    let api_key = config
        .planner
        .api_key
        .clone()
        .context("No API key configured. Set ANTHROPIC_API_KEY or add planner.api_key to config.toml")?;

    let planner = Arc::new(
        AnthropicPlanner::new(api_key).context("Failed to build planner client")?,
    );

    let retry_policy = RetryPolicy {
        max_attempts: config.retry.max_attempts,
        base_delay: config.retry_base_delay(),
        max_delay: config.retry_max_delay(),
    };
    let poll_policy = PollPolicy {
        initial_interval: Duration::from_millis(config.poll.initial_interval_ms),
        max_interval: Duration::from_millis(config.poll.max_interval_ms),
        max_wait: Duration::from_secs(config.poll.max_wait_secs),
    };

    let query_service = Arc::new(
        HttpQueryService::new(&config.warehouse.endpoint, &config.warehouse.workgroup)
            .context("Failed to build query service client")?,
    );
    let catalog = Arc::new(
        HttpCatalogService::new(&config.warehouse.endpoint)
            .context("Failed to build catalog client")?,
    );
    let executor = Arc::new(QueryExecutor::new(
        query_service,
        retry_policy.clone(),
        poll_policy,
        &config.warehouse.output_location,
    ));

    let tools = Arc::new(datascout_tools::warehouse_registry(executor, catalog));

    let store = Arc::new(
        ThreadStore::new().with_idle_eviction(config.store.idle_eviction_secs),
    );

    let orchestrator = Orchestrator::new(
        planner,
        &config.planner.model,
        tools,
        store.clone(),
    )
    .with_max_tokens(config.planner.max_tokens)
    .with_context(ContextWindow {
        window_size: config.context.window_size,
        similarity_threshold: config.context.similarity_threshold,
        filtering_enabled: config.context.filtering_enabled,
    })
    .with_retry_policy(retry_policy)
    .with_max_iterations(config.agent.max_iterations)
    .with_question_timeout(Duration::from_secs(config.agent.question_timeout_secs));

    Ok((Arc::new(orchestrator), store))
}
