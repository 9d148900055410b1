mod config;
mod error;
mod gateway;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;
mod stores;
#[cfg(test)]
mod test_utils;
mod validation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{Router, http};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{config::Config, services::Dispatcher, state::AppState, stores::Stores};

#[derive(Parser)]
#[command(name = "api")]
#[command(about = "APTM contact and membership forms API")]
struct Args {
    /// Print the resolved delivery mode and rate limit policy, then exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = envy::prefixed("APTM_").from_env::<Config>()?;

    if args.check_config {
        let policy = config.rate_limit_policy();
        println!("delivery: {:?}", config.delivery_mode());
        println!(
            "rate limit: {} request(s) per {}s, swept every {}s",
            policy.max_requests,
            policy.window.as_secs(),
            config.sweep_interval().as_secs()
        );
        return Ok(());
    }

    // Initialize Sentry for error tracking (must be done early, guard must stay alive)
    let _sentry_guard = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(config.env.clone().into()),
                ..Default::default()
            },
        ))
    });

    // Set up tracing: JSON in production, human-readable otherwise
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }

    let dispatcher = Dispatcher::from_config(&config);
    tracing::info!(delivery = ?dispatcher.mode(), "email delivery configured");

    let stores = Stores::in_memory(config.rate_limit_policy());
    let sweeper = stores::spawn_sweeper(stores.limiters(), config.sweep_interval());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = AppState {
        config,
        stores,
        dispatcher: Arc::new(dispatcher),
    };

    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Shutdown complete");

    Ok(())
}

fn app(state: AppState) -> Router {
    // Request ID header name
    let x_request_id = http::HeaderName::from_static("x-request-id");

    Router::new()
        .nest("/health", handlers::health::router())
        .nest("/contact", handlers::contact::router())
        .nest("/join", handlers::join::router())
        .with_state(state)
        // Request ID: generate UUID, include in logs, return in response
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
