use std::sync::Arc;

use growth_assist::channels::{
    CliChannel, Dispatcher, EventSource, NoProfile, ProfileSource, SlackChannel, SlackConfig,
};
use growth_assist::config::BotConfig;
use growth_assist::onboarding::{spawn_sweep_task, OnboardingProcessor, RateLimiter, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env();

    eprintln!("🤖 Growth Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Rate limit: {} events / {}s per user",
        config.rate_limit_max_requests,
        config.rate_limit_window.as_secs()
    );
    eprintln!(
        "   Session timeout: {}s",
        config.session_idle_timeout.as_secs()
    );

    let sessions = SessionStore::new(config.session_idle_timeout);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_window,
        config.rate_limit_max_requests,
    ));

    // Background sweep for idle sessions and stale rate-limit windows.
    let _sweep_handle = spawn_sweep_task(Arc::clone(&sessions), Arc::clone(&limiter), &config);

    // Slack when a bot token is configured, otherwise the local CLI REPL.
    if let Some(slack_config) = SlackConfig::from_env() {
        eprintln!("   Channel: slack ({})\n", slack_config.bind_addr);

        let channel = Arc::new(SlackChannel::new(slack_config));
        let events = channel.start().await?;

        let dispatcher: Arc<dyn Dispatcher> = channel.clone();
        let profiles: Arc<dyn ProfileSource> = channel.clone();
        let processor = OnboardingProcessor::new(sessions, limiter, dispatcher, profiles);
        processor.run(events).await;
    } else {
        eprintln!("   Channel: cli (set SLACK_BOT_TOKEN for Slack)");
        eprintln!("   Commands: /join, /select <action> <value>, /upload <mime> <url>\n");

        let channel = Arc::new(CliChannel::new());
        let events = channel.start().await?;

        let dispatcher: Arc<dyn Dispatcher> = Arc::clone(&channel) as _;
        let processor =
            OnboardingProcessor::new(sessions, limiter, dispatcher, Arc::new(NoProfile));
        processor.run(events).await;
    }

    Ok(())
}
