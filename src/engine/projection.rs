//! Projection of locations onto the 0-100 track coordinate

use super::location::TrainLocation;
use crate::topology::Topology;

/// Approach times are capped to this many minutes
const MAX_APPROACH_MINUTES: f64 = 15.0;
/// Largest visual offset (percentage points) of a train approaching a line end
const MAX_APPROACH_OFFSET: f64 = 3.0;

/// Track coordinate of a location, or `None` when it cannot be drawn
#[must_use]
pub fn project(topology: &Topology, location: &TrainLocation) -> Option<f64> {
    let position_of = |station: &str| {
        topology
            .index_of(station)
            .map(|index| topology.station_position(index))
    };

    match location {
        TrainLocation::AtStation { station } => position_of(station),
        TrainLocation::Between { from, to, fraction } => {
            let from = position_of(from)?;
            let to = position_of(to)?;
            Some(from + (to - from) * (fraction / 100.0))
        }
        TrainLocation::ApproachingTerminal {
            terminal,
            minutes_away,
        } => {
            let index = topology.index_of(terminal)?;
            let position = topology.station_position(index);
            let minutes = f64::from(*minutes_away).clamp(1.0, MAX_APPROACH_MINUTES);
            let offset = minutes / MAX_APPROACH_MINUTES * MAX_APPROACH_OFFSET;
            // Offset toward the interior of the track
            if index == 0 {
                Some(position + offset)
            } else {
                Some(position - offset)
            }
        }
    }
}
