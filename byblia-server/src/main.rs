//! Byblia Server - Headless Daemon
//!
//! Serves the streaming chat endpoint and ships a small command-line client:
//! - `serve` (default): `POST /chat`, `POST /feedback`, `GET /interactions`
//! - `ask`: stream an answer from a running server, optionally as a conversation
//! - `interactions`: list the latest recorded exchanges

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use byblia_core::{
    build_router, AppState, InteractionStore, MemoryInteractionStore, ModelAgent,
    OpenAiCompatibleAgent, PostgresInteractionStore,
};
use byblia_types::models::config::DatabaseConfig;

mod cli;
mod commands;
mod server_utils;

use cli::{Cli, Commands, ServeArgs, DEFAULT_LOG_FILTER};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(cli.serve).await,
        Commands::Ask { question, interactive, target } => {
            commands::handle_ask(question, interactive, target).await
        },
        Commands::Interactions { limit, json, target } => {
            commands::handle_interactions(limit, json, target).await
        },
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let config = args.to_config();
    anyhow::ensure!(!config.model.api_key.is_empty(), "LLM_API_KEY is required to serve");
    config.validate_all().context("Invalid configuration")?;

    info!(
        "🚀 Byblia {} starting (model {}, {} req/{}s per client)",
        env!("CARGO_PKG_VERSION"),
        config.model.model_id,
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    );
    if config.origin.disabled {
        warn!("⚠️ Origin check disabled");
    } else if config.origin.development {
        info!("🧪 Development mode: loopback origins accepted");
    }

    let store = open_store(&config.database).await?;
    info!("🗄️ Interaction store: {}", store.backend());

    let agent =
        OpenAiCompatibleAgent::new(&config.model).context("Failed to build the model client")?;
    info!("🤖 Model upstream: {}", agent.endpoint());
    let agent: Arc<dyn ModelAgent> = Arc::new(agent);

    let state = AppState::new(&config, agent, store);
    let limiter = Arc::clone(&state.limiter);
    limiter.start_sweeper();

    let listener = server_utils::create_listener(&config.server).await?;
    let app = build_router(state);

    info!("🌐 Listening on http://{}", config.server.bind_address());

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(server_utils::shutdown_signal())
        .await?;

    limiter.stop();
    info!("✅ Server stopped");
    Ok(())
}

async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn InteractionStore>> {
    if config.url.is_none() {
        warn!("⚠️ DATABASE_URL not set, interactions are kept in memory and lost on restart");
        return Ok(Arc::new(MemoryInteractionStore::new()));
    }

    let store = PostgresInteractionStore::connect(config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store.run_migrations().await.context("Failed to run migrations")?;
    Ok(Arc::new(store))
}
