//! REST backend for a restaurant ordering platform.
//!
//! Menu, reviews, carts, users and payments live in MongoDB; requests are
//! authenticated with short-lived JWTs and payments go through a
//! Stripe-compatible payment-intent API.

use std::sync::Arc;

use axum::Router;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod models;
pub mod payment;
pub mod routes;
pub mod state;
pub mod store;
pub mod token;

use config::Config;
use error::ServerError;
use payment::StripeGateway;
use state::AppState;
use store::mongo::MongoStore;
use token::TokenService;

/// Full HTTP application: routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    routes::api_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server() -> Result<(), ServerError> {
    // .env may carry RUST_LOG, so read it before the subscriber is built
    let dotenv = dotenvy::dotenv();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    info!("Loading configuration...");
    let config = Config::load()?;

    info!("Connecting to database {}...", config.db_name);
    let store = MongoStore::connect(&config.mongodb_uri, &config.db_name).await?;
    store.ping().await?;

    let state = AppState::new(
        Arc::new(store),
        TokenService::new(&config.token_secret),
        Arc::new(StripeGateway::new(config.payment_api_base, config.payment_secret)),
        config.currency.as_str(),
    );

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
