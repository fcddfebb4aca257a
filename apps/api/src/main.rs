mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::transport::HttpTransport;
use crate::llm_client::Dispatcher;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client shared by every provider backend
    let dispatcher = Dispatcher::from_configs(config.providers.clone(), HttpTransport::new());
    for provider in dispatcher.providers() {
        if provider.credential_configured {
            info!(
                provider = %provider.provider_id,
                model = %provider.model_name,
                max_output_tokens = provider.max_output_tokens,
                "Provider registered"
            );
        } else {
            warn!(
                provider = %provider.provider_id,
                "Provider registered without credential; calls will be rejected"
            );
        }
    }

    let sessions = SessionStore::new();
    sessions.spawn_sweeper(config.session_idle_timeout);
    info!(
        idle_timeout_secs = config.session_idle_timeout.as_secs(),
        "Session sweeper started"
    );

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        sessions,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
