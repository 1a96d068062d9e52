//! Location classification of a train from its best report

use serde::{Deserialize, Serialize};

use super::report::TrainReport;
use super::train::Train;
use crate::topology::{Direction, Topology};

/// Fraction used when a train is already overdue for its segment,
/// so it is drawn just past its origin instead of behind it.
const JUST_DEPARTED_MINUTES: f64 = 0.05;

/// Where a train is on the line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainLocation {
    AtStation {
        station: String,
    },
    /// `fraction` is the percentage (0-100) of the way from `from` to `to`
    Between {
        from: String,
        to: String,
        fraction: f64,
    },
    /// Inbound to a line end with no previous station to interpolate from
    ApproachingTerminal {
        terminal: String,
        minutes_away: u32,
    },
}

impl TrainLocation {
    /// Passenger-facing description of the location
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            TrainLocation::AtStation { station } => format!("En Estación {station}"),
            TrainLocation::Between { from, to, .. } => format!("Entre {from} y {to}"),
            TrainLocation::ApproachingTerminal {
                terminal,
                minutes_away,
            } => format!("Próximo a {terminal} ({minutes_away} min)"),
        }
    }
}

/// Resolve a train's location from its best report.
///
/// Returns `None` when the reporting station is not part of the topology.
#[must_use]
pub fn resolve_location(topology: &Topology, train: &Train, best: &TrainReport) -> Option<TrainLocation> {
    if best.estimate.is_at_platform() {
        return Some(TrainLocation::AtStation {
            station: best.station.clone(),
        });
    }

    let to_index = topology.index_of(&best.station)?;
    let minutes = best.minutes_to_arrival();

    let from_index = match topology.direction_of(&train.destination) {
        Direction::TowardOrigin => to_index.checked_add(1),
        Direction::TowardFarEnd => to_index.checked_sub(1),
    };
    let Some(from_station) = from_index.and_then(|index| topology.station_at(index)) else {
        return Some(TrainLocation::ApproachingTerminal {
            terminal: best.station.clone(),
            minutes_away: minutes,
        });
    };

    let segment_minutes = f64::from(topology.travel_time(from_station, &best.station));
    let mut elapsed = segment_minutes - f64::from(minutes);
    if elapsed < 0.0 {
        elapsed = JUST_DEPARTED_MINUTES;
    }
    let fraction = (elapsed / segment_minutes * 100.0).clamp(0.0, 100.0);

    Some(TrainLocation::Between {
        from: from_station.to_string(),
        to: best.station.clone(),
        fraction,
    })
}
