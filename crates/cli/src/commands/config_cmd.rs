//! `datascout config` — show the effective configuration.

use datascout_config::AppConfig;

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    println!("Config file: {}", AppConfig::config_dir().join("config.toml").display());
    println!();
    println!("Planner:");
    println!("  model:          {}", config.planner.model);
    println!("  max_tokens:     {}", config.planner.max_tokens);
    println!(
        "  api_key:        {}",
        if config.planner.api_key.is_some() { "[set]" } else { "[not set]" }
    );
    println!("Warehouse:");
    println!("  endpoint:       {}", config.warehouse.endpoint);
    println!("  workgroup:      {}", config.warehouse.workgroup);
    println!("  output:         {}", config.warehouse.output_location);
    println!("Slack:");
    println!(
        "  bot_token:      {}",
        if config.slack.bot_token.is_some() { "[set]" } else { "[not set]" }
    );
    println!("  allowed_users:  {:?}", config.slack.allowed_users);
    println!("Context:");
    println!("  window_size:    {}", config.context.window_size);
    println!("  threshold:      {}", config.context.similarity_threshold);
    println!("  filtering:      {}", config.context.filtering_enabled);
    println!("Retry:");
    println!("  max_attempts:   {}", config.retry.max_attempts);
    println!("  base_delay_ms:  {}", config.retry.base_delay_ms);
    println!("  max_delay_ms:   {}", config.retry.max_delay_ms);
    println!("Poll:");
    println!("  initial_ms:     {}", config.poll.initial_interval_ms);
    println!("  max_ms:         {}", config.poll.max_interval_ms);
    println!("  max_wait_secs:  {}", config.poll.max_wait_secs);
    println!("Agent:");
    println!("  max_iterations: {}", config.agent.max_iterations);
    println!("  timeout_secs:   {}", config.agent.question_timeout_secs);

    match config.validate() {
        Ok(()) => println!("\nConfiguration is valid."),
        Err(e) => println!("\nConfiguration problem: {e}"),
    }

    Ok(())
}
