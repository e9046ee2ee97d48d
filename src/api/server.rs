use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::google::{GmailClient, Session};

pub fn app(shared_state: Arc<AppState>) -> Router {
    // Browser clients call in from any origin
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let session = match &config.token_path {
        Some(path) => Session::load(PathBuf::from(path)).await,
        None => Session::in_memory(),
    };
    if session.is_authenticated() {
        tracing::info!("Restored Gmail credential from token file");
    }
    if config.gmail_api_client_id.is_empty() {
        tracing::warn!("MAILBRIDGE_GMAIL_CLIENT_ID is not set, sign in will fail");
    }

    let gmail = GmailClient::new(config).context("Failed to build HTTP client")?;
    let app = app(Arc::new(AppState::new(gmail, session)));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
