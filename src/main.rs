// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Gym roster API server.

use gym_roster::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemberStore, MemoryDb},
    services::{
        ExpiryScanner, ExpiryScheduler, NoopDispatcher, NotificationDispatcher,
        PushGatewayDispatcher,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.store_backend, "Starting gym roster API");

    let store: Arc<dyn MemberStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive restarts");
            Arc::new(MemoryDb::new())
        }
    };

    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.push_gateway_url {
        Some(url) => {
            tracing::info!(endpoint = %url, "Push gateway configured");
            Arc::new(PushGatewayDispatcher::new(
                url.clone(),
                config.push_gateway_token.clone(),
                config.push_timeout,
            )?)
        }
        None => Arc::new(NoopDispatcher),
    };

    let scheduler = if config.expiry_scan.enabled {
        let scanner = ExpiryScanner::new(store.clone(), dispatcher)
            .with_window_days(config.expiry_scan.window_days)
            .with_concurrency(config.expiry_scan.concurrency);
        Some(ExpiryScheduler::start(
            Arc::new(scanner),
            config.expiry_scan.interval,
        ))
    } else {
        tracing::info!("Expiry scan disabled");
        None
    };

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = gym_roster::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        scheduler.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Failed to register signal handlers; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("gym_roster=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
