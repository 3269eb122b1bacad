// # cfddnsd - Dynamic DNS Daemon
//
// Thin integration layer over cfddns-core:
// 1. Parse the command line
// 2. Resolve and validate the INI configuration
// 3. Initialize tracing and the runtime
// 4. Run the reconciler once, or forever on a fixed interval
//
// Reconciliation logic lives in cfddns-core; this binary only wires the
// HTTP IP source, the Cloudflare provider, and the IP cache together and
// maps outcomes to exit codes.
//
// ## Exit Codes
//
// - 0: Clean run or user interrupt. Handled run failures (discovery
//   exhausted, a provider rejecting an update) log and still exit 0.
// - 1: Missing/invalid configuration or an unhandled error.
//
// ## Logging
//
// Log level comes from `CFDDNS_LOG_LEVEL` (trace, debug, info, warn,
// error), defaulting to info.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use cfddns_core::{IpCache, Reconciler, RunSummary, Settings};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

mod settings;

#[derive(Parser)]
#[command(name = "cfddnsd")]
#[command(about = "Keep Cloudflare DNS records in sync with the current public IP", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the INI configuration file
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    /// Update interval in seconds; omit to run a single reconciliation
    #[arg(short, long)]
    interval: Option<u64>,

    /// Path of the persisted IP cache file
    #[arg(long, default_value = "ip_cache.json")]
    cache_file: PathBuf,
}

/// Exit codes for the two termination scenarios
#[derive(Debug, Clone, Copy)]
enum CfddnsExitCode {
    /// Clean run or user interrupt
    Clean = 0,
    /// Configuration error or unhandled failure
    Error = 1,
}

impl From<CfddnsExitCode> for ExitCode {
    fn from(code: CfddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match std::env::var("CFDDNS_LOG_LEVEL")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CfddnsExitCode::Error.into();
    }

    // Configuration problems are fatal before any network activity
    let settings = match settings::load(&cli.config, cli.cache_file.clone()) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return CfddnsExitCode::Error.into();
        }
    };

    if let Err(e) = settings.validate() {
        error!("{}", e);
        return CfddnsExitCode::Error.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CfddnsExitCode::Error.into();
        }
    };

    rt.block_on(async {
        match run(settings, cli.interval).await {
            Ok(()) => CfddnsExitCode::Clean,
            Err(e) => {
                error!("An error occurred: {}", e);
                CfddnsExitCode::Error
            }
        }
    })
    .into()
}

/// Wire up the reconciler and drive it until done or interrupted
async fn run(settings: Settings, interval: Option<u64>) -> Result<()> {
    let reconciler = Reconciler::new(
        Box::new(HttpIpSource::new()),
        Box::new(CloudflareProvider::new(settings.auth.clone())),
        IpCache::new(&settings.cache_path),
        settings.domains.clone(),
    );

    tokio::select! {
        result = drive(&reconciler, interval) => result,
        signal = shutdown_signal() => {
            info!("Received {}, program terminated by user", signal?);
            Ok(())
        }
    }
}

/// Run once, or forever with a fixed sleep between runs
///
/// Interval mode has no drift correction, no jitter, and no overlap guard:
/// a new run always starts after the sleep regardless of how long the
/// previous one took.
async fn drive(reconciler: &Reconciler, interval: Option<u64>) -> Result<()> {
    match interval {
        None => {
            run_and_report(reconciler).await;
            Ok(())
        }
        Some(secs) => {
            info!("Running in daemon mode, update interval: {} seconds", secs);
            loop {
                run_and_report(reconciler).await;
                tokio::time::sleep(Duration::from_secs(secs)).await;
            }
        }
    }
}

/// Run one reconciliation pass and log its outcome
///
/// Run-level failures are handled here: they are logged and absorbed so
/// the scheduler (or the single-shot exit path) carries on with code 0.
async fn run_and_report(reconciler: &Reconciler) {
    match reconciler.run_once().await {
        Ok(summary) => report(&summary),
        Err(e) => error!("Reconciliation run aborted: {}", e),
    }
}

fn report(summary: &RunSummary) {
    if summary.all_succeeded() {
        info!(
            "Run complete: {} domain(s) in sync at {}",
            summary.outcomes.len(),
            summary.current_ip
        );
    } else {
        warn!(
            "Run finished with {} of {} domain(s) failed",
            summary.failed_count(),
            summary.outcomes.len()
        );
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT)
#[cfg(unix)]
async fn shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(name)
}

/// Wait for a shutdown signal (CTRL-C only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
