//! Train position engine
//!
//! Turns one station status snapshot into estimated train positions:
//! - Report normalization into the minutes-to-arrival scale
//! - Aggregation of reports per train
//! - Best report selection
//! - Suppression of trains that just left a terminal
//! - Location resolution and projection onto the 0-100 track
//!
//! The engine keeps no state between snapshots; identical input always
//! yields identical output.

pub mod location;
pub mod projection;
pub mod report;
pub mod suppression;
pub mod train;

pub use location::{TrainLocation, resolve_location};
pub use projection::project;
pub use report::{ArrivalEstimate, TrainReport, UNKNOWN_MINUTES};
pub use suppression::{HideReason, Visibility, check_terminal_departure};
pub use train::{Train, aggregate_trains};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::snapshot::StationSnapshot;
use crate::topology::Topology;

/// A located train ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainPosition {
    pub id: String,
    pub destination: String,
    pub reports: Vec<TrainReport>,
    pub best_report: TrainReport,
    pub location: TrainLocation,
    pub description: String,
    /// Track coordinate in `[0, 100]`; `None` means the train cannot be drawn
    pub position: Option<f64>,
}

impl TrainPosition {
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.position.is_some()
    }
}

/// Stateless position engine over a fixed topology
#[derive(Debug, Clone)]
pub struct PositionEngine {
    topology: Topology,
}

impl PositionEngine {
    #[must_use]
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Run the whole pipeline over one snapshot. Trains are returned ordered by id.
    #[must_use]
    pub fn locate_trains(&self, snapshot: &StationSnapshot) -> Vec<TrainPosition> {
        let trains = aggregate_trains(&self.topology, snapshot);
        let total = trains.len();

        let positions: Vec<TrainPosition> = trains
            .into_values()
            .filter_map(|train| self.locate(train))
            .collect();

        info!(
            "Located {} of {} reported trains ({} renderable)",
            positions.len(),
            total,
            positions.iter().filter(|p| p.is_renderable()).count()
        );
        positions
    }

    /// Locate a single aggregated train, or `None` if it is hidden or cannot be placed
    #[must_use]
    pub fn locate(&self, train: Train) -> Option<TrainPosition> {
        let best = train.best_report()?.clone();

        if !check_terminal_departure(&self.topology, &train, &best).is_shown() {
            return None;
        }

        let Some(location) = resolve_location(&self.topology, &train, &best) else {
            debug!(train = %train.id, station = %best.station, "No location for train");
            return None;
        };
        let position = project(&self.topology, &location);

        Some(TrainPosition {
            id: train.id,
            destination: train.destination,
            reports: train.reports,
            best_report: best,
            description: location.description(),
            location,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_snapshot;

    fn engine() -> PositionEngine {
        PositionEngine::new(Topology::belgrano_norte())
    }

    #[test]
    fn test_train_between_stations() {
        let snapshot = parse_snapshot(
            r#"{ "Padilla": { "VILLA_ROSA-3100": ["3 min"] }, "Munro": { "VILLA_ROSA-3100": ["9 min"] } }"#,
        )
        .unwrap();
        let trains = engine().locate_trains(&snapshot);

        assert_eq!(trains.len(), 1);
        let train = &trains[0];
        assert_eq!(train.destination, "VILLA ROSA");
        assert_eq!(train.best_report.station, "Padilla");
        assert_eq!(train.description, "Entre A. del Valle y Padilla");
        let position = train.position.unwrap();
        // A. del Valle is 3/22 of the track, Padilla 4/22, a quarter of the way
        let expected = (3.0 + 0.25) / 22.0 * 100.0;
        assert!((position - expected).abs() < 1e-9);
    }

    #[test]
    fn test_departing_train_dropped() {
        let snapshot =
            parse_snapshot(r#"{ "Retiro": { "VILLA_ROSA-3081": ["En Estacion"] } }"#).unwrap();
        assert!(engine().locate_trains(&snapshot).is_empty());
    }

    #[test]
    fn test_train_without_reports_dropped() {
        assert!(engine().locate(Train::new("1", "RETIRO")).is_none());
    }

    #[test]
    fn test_station_outside_topology_dropped() {
        let train = Train::new("1", "RETIRO").with_report(TrainReport::minutes("Constitucion", 3));
        assert!(engine().locate(train).is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(engine().locate_trains(&StationSnapshot::new()).is_empty());
    }
}
