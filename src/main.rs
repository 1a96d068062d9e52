use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use ferrovias::{
    LiveTracker, PositionEngine, SnapshotCache, StatusFeedClient, Topology, TrackerConfig, logging,
    web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = TrackerConfig::load_from_path(config_path)?;
    logging::init(&config.logging);

    let topology = match &config.topology.path {
        Some(path) => Topology::from_json_file(path)
            .with_context(|| format!("Failed to load topology from {path}"))?,
        None => Topology::belgrano_norte(),
    };

    let cache = if config.cache.enabled {
        match SnapshotCache::open(
            &config.cache.location,
            Duration::from_secs(config.cache.ttl_seconds.into()),
        ) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!("Snapshot cache disabled: {}", e.user_message());
                None
            }
        }
    } else {
        None
    };

    let source = StatusFeedClient::new(&config.feed)?;
    let tracker = Arc::new(LiveTracker::new(
        Box::new(source),
        cache,
        PositionEngine::new(topology),
        config.feed.fallback_to_sample,
    ));

    match tracker.refresh().await {
        Ok(summary) => info!(
            "Initial refresh: {} trains ({})",
            summary.trains, summary.data_source.message
        ),
        Err(e) => warn!("Initial refresh failed: {}", e.user_message()),
    }

    info!(
        "Polling {} every {}s",
        config.feed.url, config.feed.poll_interval_seconds
    );
    let interval = Duration::from_secs(config.feed.poll_interval_seconds.into());
    tokio::spawn(tracker.clone().run(interval));

    web::run(&config.server, tracker)
        .await
        .context("Web server failed")
}
