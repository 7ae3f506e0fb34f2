mod aggregate;
mod api;
mod cache;
mod config;
mod error;
mod service;
mod types;
mod upstream;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{mask_key, AppConfig};
use crate::service::Gateway;

pub use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        Ok(Self {
            gateway: Gateway::new(&config)?,
            config: Arc::new(config),
        })
    }
}

fn print_key(label: &str, key: &str, env_var: &str) {
    if key.is_empty() {
        println!("[CONFIG] {}: *** EMPTY - SET {} ***", label, env_var);
    } else {
        println!("[CONFIG] {}: {} (length: {})", label, mask_key(key), key.chars().count());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonar=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();

    println!("================================================");
    println!("             SONAR - Starting Up                ");
    println!("================================================");

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    println!("[CONFIG] Server: {}:{}", config.server.host, config.server.port);
    println!("[CONFIG] Portfolio API: {}", config.portfolio.base_url);
    print_key("Portfolio API Key", &config.portfolio.api_key, "SONAR__PORTFOLIO__API_KEY");
    println!("[CONFIG] Metadata API: {}", config.metadata.base_url);
    println!("[CONFIG] Prices API: {}", config.prices.base_url);
    println!("[CONFIG] Protocols API: {}", config.protocols.base_url);
    println!("[CONFIG] LLM: {} ({})", config.llm.base_url, config.llm.model);
    print_key("LLM API Key", &config.llm.api_key, "SONAR__LLM__API_KEY");
    println!(
        "[CONFIG] Cache: {} entries, {}s TTL; upstream timeout {}s",
        config.cache.max_capacity, config.cache.ttl_seconds, config.upstream.timeout_seconds
    );

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        model = %config.llm.model,
        "Starting Sonar"
    );

    let addr: SocketAddr = config.server_addr().parse()?;
    let state = AppState::new(config).map_err(|e| anyhow::anyhow!("Failed to build gateway: {}", e))?;

    if !state.gateway.llm_configured() {
        println!("[CONFIG] WARNING: /api/v1/chat will answer 503 until an LLM key is set");
        tracing::warn!("LLM API key missing, chat endpoint disabled");
    }

    println!("[ROUTER] Setting up API routes...");
    let app = Router::new()
        .merge(api::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    println!("[ROUTER] Routes configured: /health, /api/v1/{{intent,chat}}, /api/v1/token/search, /api/v1/wallet/{{address}}/*, /api/v1/dapp, /api/v1/market/overview");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("================================================");
    println!("  Server listening on http://{}", addr);
    println!("================================================");
    println!();

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
