//! `datascout run` — the Slack bot event loop.
//!
//! One task per inbound event. Ordering within a thread is enforced by the
//! store's per-thread lock, not here, so a slow question in one channel
//! never delays another channel.

use datascout_agent::Orchestrator;
use datascout_channels::{SlackChannel, SlackSettings, strip_mentions};
use datascout_config::AppConfig;
use datascout_core::channel::{Channel, ChannelEvent, EventKind};
use datascout_store::ThreadStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const HELP_TEXT: &str = "I answer questions about the data warehouse.\n\
    • Mention me or use /ask-data followed by your question\n\
    • `refresh` (or /refresh) — forget this conversation's history\n\
    • `help` — show this message";

const REFRESH_ACK: &str = "Conversation history cleared. Ask away.";

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let (orchestrator, store) = super::build_orchestrator(&config)?;

    let bot_token = config
        .slack
        .bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No Slack bot token configured. Set SLACK_BOT_TOKEN."))?;

    let channel = Arc::new(SlackChannel::new(SlackSettings {
        bot_token,
        allowed_users: config.slack.allowed_users.clone(),
    })?);

    let mut events = channel.start().await?;
    info!("DataScout is running");

    if config.store.idle_eviction_secs > 0 {
        spawn_eviction_loop(store.clone(), config.store.idle_eviction_secs);
    }

    while let Some(event) = events.recv().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Channel error");
                continue;
            }
        };

        if !channel.is_allowed(&event.user_id) {
            warn!(user_id = %event.user_id, "Ignoring event from unauthorized sender");
            continue;
        }

        let orchestrator = orchestrator.clone();
        let channel = channel.clone();
        tokio::spawn(async move {
            let reply = handle_event(&orchestrator, &event).await;
            if let Err(e) = channel.send(&event.thread_id, &reply).await {
                error!(thread_id = %event.thread_id, error = %e, "Failed to deliver reply");
            }
        });
    }

    channel.stop().await?;
    Ok(())
}

/// Turn one inbound event into reply text.
async fn handle_event(orchestrator: &Orchestrator, event: &ChannelEvent) -> String {
    let text = strip_mentions(&event.text);

    // Slash commands carry the command name in the event itself; the text,
    // if any, is the command's argument (e.g. /ask-data <question>).
    if let EventKind::SlashCommand { command } = &event.kind {
        return match command.as_str() {
            "refresh" | "clear" => {
                orchestrator.refresh_thread(&event.thread_id).await;
                REFRESH_ACK.into()
            }
            "help" => HELP_TEXT.into(),
            _ if text.is_empty() => HELP_TEXT.into(),
            _ => orchestrator.handle_question(&event.thread_id, &text).await,
        };
    }

    match text.as_str() {
        "//help" | "help" | "" => HELP_TEXT.into(),
        "//refresh" | "refresh" | "clear" => {
            orchestrator.refresh_thread(&event.thread_id).await;
            REFRESH_ACK.into()
        }
        question => orchestrator.handle_question(&event.thread_id, question).await,
    }
}

fn spawn_eviction_loop(store: Arc<ThreadStore>, ttl_secs: u64) {
    // Sweep at the TTL cadence; precision doesn't matter here.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(ttl_secs.max(60)));
        loop {
            interval.tick().await;
            store.evict_idle().await;
        }
    });
}
