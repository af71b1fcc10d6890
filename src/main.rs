// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod contact;
mod content;
mod health;
mod logging_middleware;
mod media;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::dev_mode::{apply_cli_override, print_dev_mode_status, DevModeConfig};
use common::{AppConfig, AppState};
use services::{EmailService, SupabaseService};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env()?;
    info!(
        supabase_url = %config.supabase_url,
        environment = %config.environment,
        "Configuration loaded"
    );

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    // One client for every upstream call; the timeout makes each call fail
    // closed rather than hang.
    let http_client = Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;

    let supabase = Arc::new(SupabaseService::new(http_client.clone(), &config));
    info!("SupabaseService initialized");

    let email = Arc::new(EmailService::new(http_client, &config));
    info!("EmailService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let cors_origins = config.cors_origins.clone();
    let port = config.port;

    let app_state = AppState {
        config,
        supabase,
        email,
        dev_mode,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(contact::contact_routes())
        .merge(media::media_routes())
        .merge(health::health_routes())
        // Content routes go last: /api/:collection is the parameterized
        // catch-all for the four collections.
        .merge(content::content_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared.clone()))
        .layer({
            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static("x-requested-with"),
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
