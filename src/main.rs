// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use clap::Parser;
use dns_endpoints::{
    aggregator::MultiSource,
    config::Config,
    constants::{
        CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, ERROR_RETRY_DURATION_SECS, EVENT_DEBOUNCE_MILLIS,
        METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS,
    },
    dedup::DedupSource,
    metrics::gather_metrics,
    source::Source,
    sources::build_source,
};
use kube::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, error, info};

/// Computes desired DNS endpoints from Kubernetes resources.
#[derive(Parser, Debug)]
#[command(name = "dns-endpoints", version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print the current endpoint list as JSON and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("dns-endpoints")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

/// Installs the global subscriber.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`text` or `json`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    info!(config = %args.config.display(), "Starting dns-endpoints");
    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default()
        .await
        .context("failed to create Kubernetes client")?;

    let mut sources = Vec::with_capacity(config.sources.len());
    for source_config in &config.sources {
        let source = build_source(client.clone(), source_config)
            .await
            .with_context(|| format!("failed to start {} source", source_config.name()))?;
        sources.push(source);
    }
    info!(sources = sources.len(), "All sources synced");

    let source: Arc<dyn Source> = Arc::new(DedupSource::new(Arc::new(MultiSource::new(
        sources,
        config.default_targets.clone(),
        config.force_default_targets,
    ))));

    if args.once {
        let endpoints = source.endpoints().await?;
        println!("{}", serde_json::to_string_pretty(&endpoints)?);
        return Ok(());
    }

    tokio::select! {
        result = run_metrics_server(config.metrics_port) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        () = run_sync_loop(source, Duration::from_millis(EVENT_DEBOUNCE_MILLIS)) => {
            anyhow::bail!("sync loop exited unexpectedly")
        }
        () = shutdown_signal() => {
            info!("Shutting down");
        }
    }

    Ok(())
}

/// Recomputes the endpoint list whenever the sources report a change.
///
/// Change notifications arriving within `debounce` of a recomputation are coalesced.
/// After a failure the list is recomputed on the next change or after
/// `ERROR_RETRY_DURATION_SECS`, whichever comes first.
async fn run_sync_loop(source: Arc<dyn Source>, debounce: Duration) {
    let changed = Arc::new(Notify::new());
    let trigger = Arc::clone(&changed);
    source.add_event_handler(Arc::new(move || trigger.notify_one()));

    loop {
        match source.endpoints().await {
            Ok(endpoints) => {
                info!(endpoints = endpoints.len(), "Computed desired endpoints");
                for endpoint in &endpoints {
                    debug!(endpoint = %endpoint, "Desired endpoint");
                }
                changed.notified().await;
            }
            Err(e) => {
                error!("Failed to compute endpoints: {e}");
                let _ = tokio::time::timeout(
                    Duration::from_secs(ERROR_RETRY_DURATION_SECS),
                    changed.notified(),
                )
                .await;
            }
        }

        tokio::time::sleep(debounce).await;
    }
}

async fn run_metrics_server(port: u16) -> Result<()> {
    let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));
    let address = format!("{METRICS_SERVER_BIND_ADDRESS}:{port}");

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind metrics server to {address}"))?;
    info!(address = %address, path = METRICS_SERVER_PATH, "Serving metrics");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Response {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
