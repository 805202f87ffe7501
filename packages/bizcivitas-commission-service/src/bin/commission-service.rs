//! BizCivitas commission service binary.

use bizcivitas_commission_service::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting BizCivitas commission service");

    let config = Config::load().unwrap_or_else(|e| {
        error!(error = %e, "FATAL: Config error, fix env vars or commission.toml");
        std::process::exit(1);
    });

    info!(
        source = config.policy_source_url.as_deref().unwrap_or("none"),
        refresh_secs = config.policy_refresh_secs,
        seeded = config.policies.len(),
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let refresh_every = Duration::from_secs(config.policy_refresh_secs.max(1));
    let state = Arc::new(AppState::new(config)?);

    if state.policies.is_remote() {
        // A failed first fetch is not fatal; the refresher keeps trying.
        if let Err(e) = state.policies.refresh().await {
            warn!(error = %e, "Initial policy fetch failed, serving seeded policies");
        }
    }

    info!(
        policies = state.policies.snapshot().policies.len(),
        "Commission service ready"
    );

    let cancel = CancellationToken::new();

    let state_bg = Arc::clone(&state);
    let cancel_bg = cancel.clone();
    tokio::spawn(async move {
        state_bg
            .policies
            .run_refresher(refresh_every, cancel_bg)
            .await;
    });

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    info!("Commission service shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
