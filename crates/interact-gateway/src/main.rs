use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

mod app;
mod http;

use app::{AppCore, PlatformContext};
use interact_core::config::{DiscordConfig, InteractConfig, TelegramConfig};
use interact_core::types::Platform;
use interact_dispatch::registry::Dispatchers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interact_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > INTERACT_CONFIG env > ~/.interact/interact.toml
    let config_path = std::env::var("INTERACT_CONFIG").ok();
    let config = InteractConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        InteractConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let reap_interval_secs = config.state.reap_interval_secs;
    let channels = config.channels.clone();

    let core = Arc::new(AppCore::new(config));

    if let Err(e) = core.tools.refresh(&core.data).await {
        warn!(error = %e, "initial tool registry refresh failed, will retry lazily on first use");
    }

    let mut dispatchers = Dispatchers::new();
    interact_handlers::register_all(&mut dispatchers);
    let dispatchers = Arc::new(dispatchers);

    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(interact_state::reaper::run(
        core.reply_contexts.clone(),
        core.tweak_sessions.clone(),
        reap_interval_secs,
        shutdown_rx,
    ));

    if let Some(telegram_cfg) = channels.telegram {
        let core = core.clone();
        let dispatchers = dispatchers.clone();
        tokio::spawn(run_telegram(core, dispatchers, telegram_cfg));
    }

    if let Some(discord_cfg) = channels.discord {
        let core = core.clone();
        let dispatchers = dispatchers.clone();
        tokio::spawn(run_discord(core, dispatchers, discord_cfg));
    }

    let router = app::build_router(core.clone());
    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Interaction gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Validates the token, wires a [`PlatformContext`], and drives the
/// long-polling loop for the lifetime of the process (§4.11). A failed
/// validation disables this platform rather than aborting the gateway —
/// the other platform and the HTTP surface keep running.
async fn run_telegram(core: Arc<AppCore>, dispatchers: Arc<Dispatchers>, cfg: TelegramConfig) {
    let bot = teloxide::Bot::new(cfg.bot_token);
    if let Err(e) = interact_telegram::adapter::validate_token(&bot).await {
        warn!(error = %e, "Telegram: adapter disabled, token validation failed");
        return;
    }

    let transport = Arc::new(interact_telegram::adapter::make_transport(bot.clone()));
    core.register_transport(Platform::Telegram, transport.clone());

    let ctx: Arc<dyn interact_dispatch::InteractionContext> =
        Arc::new(PlatformContext::new(core, transport));
    interact_telegram::adapter::run(bot, ctx, dispatchers).await;
}

async fn run_discord(core: Arc<AppCore>, dispatchers: Arc<Dispatchers>, cfg: DiscordConfig) {
    let http = Arc::new(serenity::http::Http::new(&cfg.bot_token));
    if let Err(e) = interact_discord::adapter::validate_token(&http).await {
        warn!(error = %e, "Discord: adapter disabled, token validation failed");
        return;
    }

    let transport = Arc::new(interact_discord::adapter::make_transport(http));
    core.register_transport(Platform::Discord, transport.clone());

    let ctx: Arc<dyn interact_dispatch::InteractionContext> =
        Arc::new(PlatformContext::new(core, transport.clone()));
    interact_discord::adapter::run(cfg.bot_token, ctx, dispatchers, transport).await;
}
