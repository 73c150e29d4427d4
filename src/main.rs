use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use product_service::api::{RateLimitConfig, create_router, create_router_with_rate_limit};
use product_service::app::{AppConfig, AppState};
use product_service::infra::observability::{init_metrics_handle, init_tracing};
use product_service::infra::{PostgresConfig, PostgresProductRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log)?;
    info!(
        app = %config.app_name,
        env = %config.app_env,
        "Starting product service"
    );

    let metrics = init_metrics_handle();
    if metrics.is_none() {
        warn!("Prometheus recorder unavailable; /metrics disabled");
    }

    let pool_config = PostgresConfig {
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..PostgresConfig::default()
    };
    let repository = Arc::new(
        PostgresProductRepository::connect(config.database.connect_options()?, pool_config)
            .await
            .context("failed to connect to database")?,
    );
    repository
        .run_migrations()
        .await
        .context("failed to run migrations")?;

    let mut state = AppState::with_timeout(repository.clone(), config.request_timeout);
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }
    let state = Arc::new(state);

    let router = if config.rate_limit.enabled {
        let rate_limit = RateLimitConfig::from(&config.rate_limit);
        info!(rps = rate_limit.rps, burst = rate_limit.burst, "Rate limiting enabled");
        create_router_with_rate_limit(state, rate_limit)
    } else {
        create_router(state)
    };

    let addr = config.http.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("HTTP server stopped, closing database pool");
    repository.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
