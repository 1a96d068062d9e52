//! Per-train aggregation of station reports

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::report::{ArrivalEstimate, TrainReport};
use crate::snapshot::{StationSnapshot, TrainKey};
use crate::topology::Topology;

/// Every report seen for one train in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: String,
    pub destination: String,
    pub reports: Vec<TrainReport>,
}

impl Train {
    pub fn new(id: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            destination: destination.into(),
            reports: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_report(mut self, report: TrainReport) -> Self {
        self.reports.push(report);
        self
    }

    /// The report closest to arrival. Ties keep the first one seen.
    #[must_use]
    pub fn best_report(&self) -> Option<&TrainReport> {
        self.reports
            .iter()
            .min_by_key(|report| report.minutes_to_arrival())
    }

    /// Whether any station reported this train
    #[must_use]
    pub fn reported_at(&self, station: &str) -> bool {
        self.reports.iter().any(|report| report.station == station)
    }
}

/// Group a snapshot into trains keyed by train id.
///
/// Stations are visited in track order and stations outside the topology are
/// skipped, as are malformed composite keys. The first destination seen for a
/// train id is kept.
#[must_use]
pub fn aggregate_trains(topology: &Topology, snapshot: &StationSnapshot) -> BTreeMap<String, Train> {
    let mut trains: BTreeMap<String, Train> = BTreeMap::new();

    for (station, entry) in topology
        .stations
        .iter()
        .filter_map(|station| snapshot.get(station).map(|entry| (station, entry)))
    {
        let Some(reports) = entry.reports() else {
            debug!("Skipping malformed status entry at {}", station);
            continue;
        };
        for (composite_key, payload) in reports {
            let Some(key) = TrainKey::parse(composite_key) else {
                debug!("Skipping malformed train key '{}' at {}", composite_key, station);
                continue;
            };

            let estimate = ArrivalEstimate::from_payload(Some(payload));
            trains
                .entry(key.train_id.clone())
                .or_insert_with(|| Train::new(key.train_id, key.destination))
                .reports
                .push(TrainReport::new(station.clone(), estimate));
        }
    }

    for station in snapshot.keys().filter(|s| !topology.contains(s)) {
        debug!("Ignoring station outside the line topology: {}", station);
    }

    trains
}
