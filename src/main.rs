//! TTL Cache host process
//!
//! Owns one cache instance for the lifetime of the process: builds it from
//! the environment, runs the background sweep, periodically logs stats and
//! tears everything down on SIGINT/SIGTERM.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{Config, ExpiringCache, TtlClass};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache with the configured TTL policy
/// 4. Start the background TTL sweep
/// 5. Start the stats reporter if enabled
/// 6. Stop the sweep and clear the cache on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TTL cache");

    let config = Config::from_env();
    config.validate().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: sweep_interval={}s, stats_interval={}s",
        config.sweep_interval, config.stats_interval
    );

    let cache: ExpiringCache<String> = ExpiringCache::from_config(&config);
    for class in TtlClass::ALL {
        info!(class = %class, ttl_secs = cache.ttl(class).as_secs(), "TTL class");
    }
    cache
        .start_sweeper(config.sweep_interval())
        .context("failed to start TTL sweeper")?;

    let reporter = config
        .stats_interval()
        .map(|every| spawn_stats_reporter(cache.clone(), every));

    shutdown_signal().await?;

    if let Some(reporter) = reporter {
        reporter.abort();
    }
    cache.stop_sweeper();
    let cleared = cache.clear();
    info!("Shutdown complete, dropped {} cached entries", cleared);

    Ok(())
}

/// Logs a stats line every `every`.
fn spawn_stats_reporter(cache: ExpiringCache<String>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(every).await;

            let stats = cache.stats();
            info!(
                entries = stats.total_entries,
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                swept = stats.swept,
                fetch_errors = stats.fetch_errors,
                "cache stats"
            );
        }
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    #[cfg(unix)]
    let terminate = sigterm.recv();

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Option<()>>();

    tokio::select! {
        result = ctrl_c => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    Ok(())
}
