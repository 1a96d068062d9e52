//! Station status feed
//!
//! Fetches the per-station status snapshot over HTTP and, when the feed is
//! down, substitutes the last cached live snapshot or the bundled sample.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::cache::SnapshotCache;
use crate::config::FeedConfig;
use crate::snapshot::{StationSnapshot, sample_snapshot};
use crate::{Result, TrackerError};

/// Anything able to produce a station snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<StationSnapshot>;
}

/// Where the snapshot of a cycle came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub is_live: bool,
    pub message: String,
    pub error: Option<String>,
}

impl DataSource {
    fn live() -> Self {
        Self {
            is_live: true,
            message: "Live API".to_string(),
            error: None,
        }
    }

    fn cached(error: &TrackerError) -> Self {
        Self {
            is_live: false,
            message: "Cached snapshot (API failed)".to_string(),
            error: Some(error.to_string()),
        }
    }

    fn sample(error: &TrackerError) -> Self {
        Self {
            is_live: false,
            message: "Sample data (API failed)".to_string(),
            error: Some(error.to_string()),
        }
    }
}

/// HTTP client for the station status endpoint
pub struct StatusFeedClient {
    client: ClientWithMiddleware,
    url: String,
}

impl StatusFeedClient {
    /// Create a client with transient-failure retries
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("ferrovias/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::feed(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl SnapshotSource for StatusFeedClient {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_snapshot(&self) -> Result<StationSnapshot> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TrackerError::feed(format!("Status request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::feed(format!(
                "Status request failed: {status}"
            )));
        }

        let snapshot: StationSnapshot = response
            .json()
            .await
            .map_err(|e| TrackerError::feed(format!("Invalid station status payload: {e}")))?;

        info!("Fetched status for {} stations", snapshot.len());
        Ok(snapshot)
    }
}

/// Fetch a snapshot, falling back to the cached live snapshot and then the
/// bundled sample. The feed error is returned only when every fallback is
/// unavailable.
pub async fn load_snapshot(
    source: &dyn SnapshotSource,
    cache: Option<&SnapshotCache>,
    allow_sample: bool,
) -> Result<(StationSnapshot, DataSource)> {
    let error = match source.fetch_snapshot().await {
        Ok(snapshot) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.store_snapshot(&snapshot).await {
                    warn!("Failed to cache live snapshot: {}", e);
                }
            }
            return Ok((snapshot, DataSource::live()));
        }
        Err(error) => error,
    };

    warn!("Live feed failed ({}), looking for a fallback snapshot", error);

    if let Some(cache) = cache {
        match cache.last_snapshot().await {
            Ok(Some(snapshot)) => {
                info!("Using cached live snapshot");
                return Ok((snapshot, DataSource::cached(&error)));
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to read cached snapshot: {}", e),
        }
    }

    if allow_sample {
        info!("Using bundled sample snapshot");
        return Ok((sample_snapshot(), DataSource::sample(&error)));
    }

    Err(error)
}
