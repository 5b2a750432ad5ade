mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Mode, ProgressMode, Settings};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stressweb_core::{
    render_report, BatchDispatcher, FileConfig, HttpTransport, LogProgress, MockTransport,
    NoProgress, ProgressReporter, RequestIssuer, ReqwestTransport, StatsSummary, StdoutProgress,
};
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct RunResult {
    url: String,
    method: String,
    mode: String,
    timestamp: String,
    total_requests: u64,
    concurrency: usize,
    batch_size: u64,
    timeout_ms: u64,
    stats: StatsSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("HTTP Stress Testing Tool");
    println!("WARNING: This tool should only be used on systems you own or have permission to test.");
    println!("Improper use may be illegal and/or cause service disruption.\n");

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file).context("Invalid configuration")?;

    let transport: Arc<dyn HttpTransport> = match args.mode {
        Mode::Mock => Arc::new(MockTransport::new(Duration::from_millis(5))),
        Mode::Http => Arc::new(
            ReqwestTransport::new(settings.run.concurrency.get(), settings.timeout)
                .context("Failed to create HTTP transport")?,
        ),
    };
    let reporter: Arc<dyn ProgressReporter> = match args.progress {
        ProgressMode::Stdout => Arc::new(StdoutProgress),
        ProgressMode::Log => Arc::new(LogProgress),
        ProgressMode::Quiet => Arc::new(NoProgress),
    };

    let issuer = RequestIssuer::new(transport, settings.timeout);
    info!(
        "Using transport: {} (timeout {:?})",
        issuer.transport_name(),
        issuer.timeout()
    );
    let dispatcher = BatchDispatcher::new(issuer, reporter);

    println!("Starting transmission to {}", settings.spec.url());
    println!(
        "Sending {} requests with {} concurrent connections",
        settings.run.total_requests, settings.run.concurrency
    );

    // Ctrl-C stops further batches; the one in flight still completes.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if handle_interrupts(tokio::signal::ctrl_c, cancel_tx).await {
            warn!("Second interrupt received, exiting");
            std::process::exit(130);
        }
    });

    let spec = Arc::new(settings.spec.clone());
    let stats = dispatcher
        .run_until_cancelled(spec, &settings.run, cancel_rx)
        .await
        .context("Dispatch failed")?;

    print!("\n{}", render_report(settings.spec.url().as_str(), &stats));

    if let Some(path) = &args.output {
        let result = RunResult {
            url: settings.spec.url().to_string(),
            method: settings.spec.method().to_string(),
            mode: args.mode.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_requests: settings.run.total_requests,
            concurrency: settings.run.concurrency.get(),
            batch_size: settings.run.batch_size.get(),
            timeout_ms: settings.timeout.as_millis() as u64,
            stats: StatsSummary::from_stats(&stats),
        };
        write_result(path, &result)?;
        info!("Results written to {:?}", path);
    }

    Ok(())
}

/// Raise `cancel` on the first interrupt. Returns `true` once a second
/// interrupt arrives, `false` if the signal source fails first.
async fn handle_interrupts<F, Fut>(mut next_interrupt: F, cancel: watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupt received, finishing the current batch (press Ctrl-C again to exit)");
    let _ = cancel.send(true);

    next_interrupt().await.is_ok()
}

fn write_result(path: &Path, result: &RunResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
