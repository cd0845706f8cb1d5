//! `datascout ask` — one-shot question from the terminal.

use datascout_config::AppConfig;
use datascout_core::message::ThreadId;

pub async fn run(question: &str) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let (orchestrator, _store) = super::build_orchestrator(&config)?;

    // Each invocation is its own throwaway thread.
    let thread_id = ThreadId::new();
    let answer = orchestrator.handle_question(&thread_id, question).await;

    println!("{answer}");
    Ok(())
}
