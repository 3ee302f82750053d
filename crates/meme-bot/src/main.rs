//! Meme recommendation bot for Discord
//!
//! Watches channel conversation, guesses its mood now and then, and answers
//! with a matching reaction GIF.

mod commands;
mod config;
mod context;
mod dispatcher;
mod errors;
mod gif;
mod handlers;
mod health;
mod llm;
mod mood;
mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, SystemEnv};
use crate::context::ContextBuffer;
use crate::dispatcher::RecommendationDispatcher;
use crate::gif::GifSelector;
use crate::handlers::Handler;
use crate::health::AppState;
use crate::mood::MoodAnalyzer;

/// Meme Bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/meme-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// Gemini API key (overrides config file)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// OpenAI API key (overrides config file)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Tenor API key (overrides config file)
    #[arg(long, env = "TENOR_API_KEY", hide_env_values = true)]
    tenor_api_key: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,

    /// Run one analysis and one GIF lookup, then exit without connecting to Discord
    #[arg(long)]
    self_test: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before clap reads the environment
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meme_bot=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting meme recommendation bot");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env(&SystemEnv)?
    };

    if let Some(token) = args.discord_token {
        config.discord.bot_token = token;
    }
    if let Some(key) = args.gemini_api_key {
        config.reasoning.gemini_api_key = Some(key);
    }
    if let Some(key) = args.openai_api_key {
        config.reasoning.openai_api_key = Some(key);
    }
    if let Some(key) = args.tenor_api_key {
        config.media.tenor_api_key = Some(key);
    }

    config.validate(!args.self_test)?;
    report_credentials(&config);

    let http = reqwest::Client::new();
    let analyzer = Arc::new(match llm::build_client(&config.reasoning, http.clone()) {
        Some(client) => MoodAnalyzer::new(Some(client)),
        None => MoodAnalyzer::offline(),
    });
    let selector = Arc::new(GifSelector::new(http, &config.media));

    if args.self_test {
        return self_test(&analyzer, &selector).await;
    }

    let contexts = Arc::new(ContextBuffer::with_capacity(
        config.recommend.context_capacity,
    ));
    info!(
        "Remembering {} messages per channel, auto recommendations on {:.0}% of messages",
        contexts.capacity(),
        config.recommend.auto_probability * 100.0
    );
    let dispatcher = Arc::new(RecommendationDispatcher::new(
        contexts.clone(),
        analyzer,
        selector,
        config.recommend.auto_probability,
    ));

    // Health check server
    let health_state = AppState::new(contexts);
    let health_state_clone = health_state.clone();
    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state_clone, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILDS;

    let handler = Handler::new(
        dispatcher,
        config.discord.command_prefix.clone(),
        health_state,
    );

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Meme bot stopped");
    Ok(())
}

fn report_credentials(config: &Config) {
    let creds = config.credentials();
    let mark = |present: bool| if present { "set" } else { "missing (optional)" };

    info!(
        "Discord token: {}",
        if creds.discord { "set" } else { "missing" }
    );
    info!("Gemini API key: {}", mark(creds.gemini));
    info!("OpenAI API key: {}", mark(creds.openai));
    info!("Tenor API key: {}", mark(creds.tenor));

    match config.reasoning.active_provider() {
        Some(provider) => info!("Reasoning provider: {:?}", provider),
        None if config.reasoning.provider.is_some() => {
            warn!("Forced reasoning provider has no API key, using keyword analysis only")
        }
        None => info!("No reasoning provider configured, using keyword analysis only"),
    }
    if !creds.tenor {
        info!("No Tenor API key, GIFs come from the fallback list");
    }
}

async fn self_test(analyzer: &MoodAnalyzer, selector: &GifSelector) -> Result<()> {
    info!("Running self-test");

    let conversation = vec![
        "That was absolutely savage!".to_string(),
        "You just got roasted so hard".to_string(),
        "I can't believe you said that".to_string(),
    ];
    let analysis = analyzer.analyze(&conversation).await;
    info!(
        "Analysis: mood={} search_query={:?} confidence={} (backend: {})",
        analysis.mood,
        analysis.search_query,
        analysis.confidence,
        if analyzer.has_backend() { "model" } else { "keywords" }
    );

    match selector.select("savage roast gif").await {
        Some(url) => info!(
            "GIF: {} (source: {})",
            url,
            if selector.has_backend() { "tenor" } else { "fallback list" }
        ),
        None => anyhow::bail!("GIF lookup returned nothing and the fallback list is empty"),
    }

    info!("Self-test passed");
    Ok(())
}
