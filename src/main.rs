// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use glassify_server::api::router;
use glassify_server::config::{AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV};
use glassify_server::state::AppState;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt().with_env_filter(filter).with_target(true);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing init failed: {e}");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.bind_addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr = %config.bind_addr, "Glassify server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
