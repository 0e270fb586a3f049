// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use devops360_server::api::router;
use devops360_server::auth::{JwksClient, TokenVerifier};
use devops360_server::config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER};
use devops360_server::error::ServerError;
use devops360_server::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: AppConfig) -> Result<(), ServerError> {
    let domain = config.trust_domain.clone();
    info!(
        issuer = domain.issuer(),
        jwks_url = domain.jwks_url(),
        client_id = config.credentials.client_id(),
        client_secret = config.credentials.has_secret(),
        leeway_secs = config.leeway_secs,
        "Trust domain configured"
    );

    // Keys are fetched lazily on first verification or readiness probe.
    let keys = JwksClient::from_url(domain.jwks_url())?;
    let verifier = TokenVerifier::new(domain, keys).with_leeway(config.leeway_secs);
    let app = router(AppState::new(verifier));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "DevOps360 server listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_ctrl_c(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn watch_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
            shutdown.cancel();
        }
        Err(e) => warn!(error = %e, "Unable to listen for shutdown signal"),
    }
}
