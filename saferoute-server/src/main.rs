mod config;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use clap::Parser;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use saferoute_core::prelude::*;

use crate::config::Settings;

#[derive(Parser, Debug)]
#[command(version, about = "HTTP facade over the safest-route engine")]
struct Args {
    /// TOML file with [server], [router] and [[regions]] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(long)]
    bind: Option<String>,

    /// Directory of <region>_<network>.json graph files, overrides the config file
    #[arg(long)]
    graph_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    if let Some(graph_dir) = args.graph_dir {
        settings.server.graph_dir = graph_dir;
    }

    let router = Arc::new(build_safe_router(&settings)?);
    spawn_cache_purge(Arc::clone(&router));
    let app = handlers::build_router(router, settings.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(&settings.server.bind).await?;
    tracing::info!(
        bind = %settings.server.bind,
        graph_dir = %settings.server.graph_dir.display(),
        "saferoute server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_safe_router(settings: &Settings) -> Result<SafeRouter, Error> {
    let graphs = FileGraphSource::new(&settings.server.graph_dir);
    let router = match &settings.server.incidents_path {
        Some(path) => {
            SafeRouter::new(settings.router.clone(), graphs, FileIncidentSource::new(path))?
        }
        None => {
            tracing::warn!("no incidents_path configured, routes will ignore crime data");
            SafeRouter::new(settings.router.clone(), graphs, MemoryIncidentStore::new())?
        }
    };
    Ok(router.with_regions(settings.region_catalog()))
}

/// Purge interval: the cache TTL, kept between one second and one day.
fn purge_period(ttl: TimeDelta) -> Duration {
    ttl.to_std()
        .unwrap_or(Duration::ZERO)
        .clamp(Duration::from_secs(1), Duration::from_secs(86_400))
}

fn spawn_cache_purge(router: Arc<SafeRouter>) {
    let period = purge_period(router.config().cache_ttl());
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticks.tick().await;
        loop {
            ticks.tick().await;
            let removed = router.purge_expired_weights();
            tracing::debug!(removed, remaining = router.cache().len(), "cache purge");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_runs_once_per_ttl_within_bounds() {
        assert_eq!(purge_period(TimeDelta::minutes(30)), Duration::from_secs(1800));
        assert_eq!(purge_period(TimeDelta::zero()), Duration::from_secs(1));
        assert_eq!(purge_period(TimeDelta::MAX), Duration::from_secs(86_400));
    }
}
