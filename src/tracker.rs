//! Live tracking service
//!
//! Polls the status feed on a fixed interval, runs every snapshot through the
//! position engine and publishes the result. Each cycle takes a generation
//! ticket; a cycle that finishes after a newer one has been published is
//! discarded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::Result;
use crate::cache::SnapshotCache;
use crate::engine::{PositionEngine, TrainPosition};
use crate::feed::{DataSource, SnapshotSource, load_snapshot};
use crate::snapshot::StationSnapshot;

/// Result of one published cycle
#[derive(Debug, Clone, Serialize)]
pub struct TrackerState {
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
    pub data_source: DataSource,
    pub trains: Vec<TrainPosition>,
    #[serde(skip)]
    pub snapshot: StationSnapshot,
}

/// Short description of a cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub generation: u64,
    pub published: bool,
    pub trains: usize,
    pub data_source: DataSource,
}

pub struct LiveTracker {
    source: Box<dyn SnapshotSource>,
    cache: Option<SnapshotCache>,
    engine: PositionEngine,
    allow_sample: bool,
    next_generation: AtomicU64,
    state: RwLock<Option<Arc<TrackerState>>>,
}

impl LiveTracker {
    pub fn new(
        source: Box<dyn SnapshotSource>,
        cache: Option<SnapshotCache>,
        engine: PositionEngine,
        allow_sample: bool,
    ) -> Self {
        Self {
            source,
            cache,
            engine,
            allow_sample,
            next_generation: AtomicU64::new(0),
            state: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &PositionEngine {
        &self.engine
    }

    /// Latest published cycle, if any
    pub async fn current(&self) -> Option<Arc<TrackerState>> {
        self.state.read().await.clone()
    }

    /// Run one polling cycle
    pub async fn refresh(&self) -> Result<CycleSummary> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Starting refresh cycle");

        let (snapshot, data_source) =
            load_snapshot(self.source.as_ref(), self.cache.as_ref(), self.allow_sample).await?;
        let trains = self.engine.locate_trains(&snapshot);

        let summary = CycleSummary {
            generation,
            published: false,
            trains: trains.len(),
            data_source: data_source.clone(),
        };
        let state = TrackerState {
            generation,
            updated_at: Utc::now(),
            data_source,
            trains,
            snapshot,
        };

        Ok(CycleSummary {
            published: self.publish(state).await,
            ..summary
        })
    }

    /// Store a cycle result unless a newer generation is already published
    async fn publish(&self, state: TrackerState) -> bool {
        let mut current = self.state.write().await;
        if let Some(existing) = current.as_ref() {
            if existing.generation > state.generation {
                debug!(
                    generation = state.generation,
                    newer = existing.generation,
                    "Discarding superseded cycle"
                );
                return false;
            }
        }
        *current = Some(Arc::new(state));
        true
    }

    /// Poll forever on the given interval. Failed cycles keep the previous state.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(summary) => info!(
                    "Refresh {} completed: {} trains ({})",
                    summary.generation, summary.trains, summary.data_source.message
                ),
                Err(e) => error!("Refresh failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::StaticSource;
    use crate::topology::Topology;
    use std::sync::atomic::Ordering;

    fn tracker(source: StaticSource, allow_sample: bool) -> LiveTracker {
        LiveTracker::new(
            Box::new(source),
            None,
            PositionEngine::new(Topology::belgrano_norte()),
            allow_sample,
        )
    }

    #[tokio::test]
    async fn test_refresh_publishes_state() {
        let tracker = tracker(
            StaticSource::serving(r#"{ "Florida": { "VILLA_ROSA-3083": ["En Estacion"] } }"#),
            true,
        );
        assert!(tracker.current().await.is_none());

        let summary = tracker.refresh().await.unwrap();
        assert!(summary.published);
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.trains, 1);

        let state = tracker.current().await.unwrap();
        assert_eq!(state.generation, 1);
        assert!(state.data_source.is_live);
        assert_eq!(state.trains[0].id, "3083");
    }

    #[tokio::test]
    async fn test_superseded_cycle_is_discarded() {
        let tracker = tracker(StaticSource::failing(), true);
        tracker.refresh().await.unwrap();
        tracker.refresh().await.unwrap();

        let stale = TrackerState {
            generation: 1,
            updated_at: Utc::now(),
            data_source: tracker.current().await.unwrap().data_source.clone(),
            trains: Vec::new(),
            snapshot: StationSnapshot::new(),
        };
        assert!(!tracker.publish(stale).await);
        assert_eq!(tracker.current().await.unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let source = StaticSource::failing();
        let tracker = tracker(source, false);

        assert!(tracker.refresh().await.is_err());
        assert!(tracker.current().await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_refreshes_are_identical() {
        let tracker = tracker(StaticSource::failing(), true);
        tracker.refresh().await.unwrap();
        let first = tracker.current().await.unwrap();
        tracker.refresh().await.unwrap();
        let second = tracker.current().await.unwrap();

        assert_eq!(first.trains, second.trains);
        assert_ne!(first.generation, second.generation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval() {
        let source = StaticSource::failing();
        let tracker = Arc::new(tracker(source, true));

        let handle = tokio::spawn(tracker.clone().run(Duration::from_secs(30)));
        time::sleep(Duration::from_secs(65)).await;
        handle.abort();

        let state = tracker.current().await.unwrap();
        assert_eq!(state.generation, 3);
        assert_eq!(tracker.next_generation.load(Ordering::SeqCst), 3);
    }
}
