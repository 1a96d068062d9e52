//! Line topology
//!
//! The ordered station sequence, the adjacent-pair travel time table and the
//! terminal set of a linear corridor. The engine receives a `Topology` value
//! instead of reading process-wide tables, so alternate corridors can be
//! loaded from JSON and tested in isolation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

use crate::{Result, TrackerError};

mod belgrano_norte;

/// Travel time used for segments missing from the table
pub const DEFAULT_SEGMENT_MINUTES: u32 = 5;

/// A linear railway corridor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topology {
    /// Station names ordered from the index-0 end to the far end
    pub stations: Vec<String>,
    /// Minutes between adjacent stations, keyed by [`Topology::segment_key`]
    pub travel_times: BTreeMap<String, u32>,
    /// Stations where services originate or terminate
    pub terminals: Vec<Terminal>,
}

/// A terminal station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Terminal {
    pub name: String,
    /// Present for intermediate short-turn terminals; physical line ends have none
    #[serde(default)]
    pub branch: Option<BranchCorroboration>,
}

/// Stations whose reports confirm a train really is inbound to a branch terminal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchCorroboration {
    /// Checked for trains heading toward the index-0 end
    pub toward_origin: String,
    /// Checked for trains heading toward the far end
    pub toward_far_end: String,
}

/// Travel direction along the corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward station index 0
    TowardOrigin,
    /// Toward the highest station index
    TowardFarEnd,
}

/// Station with its index and normalized track coordinate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationInfo {
    pub index: usize,
    pub name: String,
    pub position: f64,
    pub is_terminal: bool,
}

impl Topology {
    /// The Belgrano Norte line, Retiro to Villa Rosa
    #[must_use]
    pub fn belgrano_norte() -> Self {
        belgrano_norte::topology()
    }

    /// Load and validate a topology from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let topology: Topology = serde_json::from_str(&raw).map_err(|e| {
            TrackerError::topology(format!("Failed to parse {}: {e}", path.display()))
        })?;
        topology.validate()?;
        info!(
            "Loaded topology from {} ({} stations)",
            path.display(),
            topology.stations.len()
        );
        Ok(topology)
    }

    /// Table key for the segment between two stations, order-insensitive
    #[must_use]
    pub fn segment_key(a: &str, b: &str) -> String {
        if a <= b {
            format!("{a}-{b}")
        } else {
            format!("{b}-{a}")
        }
    }

    #[must_use]
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Index of a station by exact name
    #[must_use]
    pub fn index_of(&self, station: &str) -> Option<usize> {
        self.stations.iter().position(|s| s == station)
    }

    #[must_use]
    pub fn contains(&self, station: &str) -> bool {
        self.index_of(station).is_some()
    }

    #[must_use]
    pub fn station_at(&self, index: usize) -> Option<&str> {
        self.stations.get(index).map(String::as_str)
    }

    /// Minutes between two stations, falling back to [`DEFAULT_SEGMENT_MINUTES`]
    /// for missing or zero entries
    #[must_use]
    pub fn travel_time(&self, a: &str, b: &str) -> u32 {
        self.travel_times
            .get(&Self::segment_key(a, b))
            .copied()
            .filter(|&minutes| minutes > 0)
            .unwrap_or(DEFAULT_SEGMENT_MINUTES)
    }

    /// Terminal entry for a station, matched case-insensitively
    #[must_use]
    pub fn terminal(&self, station: &str) -> Option<&Terminal> {
        let upper = station.to_uppercase();
        self.terminals
            .iter()
            .find(|t| t.name.to_uppercase() == upper)
    }

    /// Direction implied by a destination name: naming the index-0 end means
    /// travel toward it, anything else is travel toward the far end.
    #[must_use]
    pub fn direction_of(&self, destination: &str) -> Direction {
        match self.stations.first() {
            Some(origin) if destination.to_uppercase().contains(&origin.to_uppercase()) => {
                Direction::TowardOrigin
            }
            _ => Direction::TowardFarEnd,
        }
    }

    /// Normalized track coordinate of a station index, 0 at the origin end and 100 at the far end
    #[must_use]
    pub fn station_position(&self, index: usize) -> f64 {
        let count = self.stations.len();
        if count < 2 {
            return 0.0;
        }
        index as f64 / (count - 1) as f64 * 100.0
    }

    /// Every station with its coordinate, in track order
    #[must_use]
    pub fn station_infos(&self) -> Vec<StationInfo> {
        self.stations
            .iter()
            .enumerate()
            .map(|(index, name)| StationInfo {
                index,
                name: name.clone(),
                position: self.station_position(index),
                is_terminal: self.terminal(name).is_some(),
            })
            .collect()
    }

    /// Check the structural invariants of the corridor
    pub fn validate(&self) -> Result<()> {
        if self.stations.len() < 2 {
            return Err(TrackerError::topology(
                "A corridor needs at least two stations",
            ));
        }

        let mut seen = HashSet::new();
        for station in &self.stations {
            if station.trim().is_empty() {
                return Err(TrackerError::topology("Station names cannot be empty"));
            }
            if !seen.insert(station.as_str()) {
                return Err(TrackerError::topology(format!(
                    "Duplicate station '{station}'"
                )));
            }
        }

        let adjacent: HashSet<String> = self
            .stations
            .windows(2)
            .map(|pair| Self::segment_key(&pair[0], &pair[1]))
            .collect();
        for (key, minutes) in &self.travel_times {
            if !adjacent.contains(key) {
                return Err(TrackerError::topology(format!(
                    "Travel time '{key}' does not name two adjacent stations"
                )));
            }
            if *minutes == 0 {
                return Err(TrackerError::topology(format!(
                    "Travel time '{key}' must be positive"
                )));
            }
        }

        for terminal in &self.terminals {
            if !self
                .stations
                .iter()
                .any(|s| s.to_uppercase() == terminal.name.to_uppercase())
            {
                return Err(TrackerError::topology(format!(
                    "Terminal '{}' is not a station of the line",
                    terminal.name
                )));
            }
            if let Some(branch) = &terminal.branch {
                for station in [&branch.toward_origin, &branch.toward_far_end] {
                    if !self.contains(station) {
                        return Err(TrackerError::topology(format!(
                            "Corroborating station '{station}' of terminal '{}' is unknown",
                            terminal.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_line() -> Topology {
        Topology {
            stations: vec!["Alpha".into(), "Bravo".into(), "Charlie".into()],
            travel_times: BTreeMap::from([("Alpha-Bravo".to_string(), 3)]),
            terminals: vec![
                Terminal {
                    name: "ALPHA".into(),
                    branch: None,
                },
                Terminal {
                    name: "CHARLIE".into(),
                    branch: None,
                },
            ],
        }
    }

    #[test]
    fn test_belgrano_norte_is_valid() {
        let topology = Topology::belgrano_norte();
        assert!(topology.validate().is_ok());
        assert_eq!(topology.station_count(), 23);
        assert_eq!(topology.travel_times.len(), 22);
        assert_eq!(topology.terminals.len(), 4);
        assert_eq!(topology.index_of("Retiro"), Some(0));
        assert_eq!(topology.index_of("Villa Rosa"), Some(22));
    }

    #[test]
    fn test_segment_key_is_order_insensitive() {
        assert_eq!(
            Topology::segment_key("Padilla", "A. del Valle"),
            "A. del Valle-Padilla"
        );
        assert_eq!(
            Topology::segment_key("A. del Valle", "Padilla"),
            "A. del Valle-Padilla"
        );
    }

    #[test]
    fn test_travel_time_lookup_and_default() {
        let topology = Topology::belgrano_norte();
        assert_eq!(topology.travel_time("Boulogne Sur Mer", "A. Montes"), 7);
        assert_eq!(topology.travel_time("Villa Adelina", "Boulogne Sur Mer"), 4);
        assert_eq!(
            topology.travel_time("Retiro", "Villa Rosa"),
            DEFAULT_SEGMENT_MINUTES
        );
    }

    #[test]
    fn test_zero_travel_time_falls_back_to_default() {
        let mut topology = short_line();
        topology.travel_times.insert("Alpha-Bravo".to_string(), 0);
        assert_eq!(topology.travel_time("Alpha", "Bravo"), DEFAULT_SEGMENT_MINUTES);
    }

    #[test]
    fn test_terminal_lookup_is_case_insensitive() {
        let topology = Topology::belgrano_norte();
        assert!(topology.terminal("Grand Bourg").is_some());
        assert!(topology.terminal("grand bourg").is_some());
        assert!(topology.terminal("Retiro").unwrap().branch.is_none());
        assert!(topology.terminal("Florida").is_none());
    }

    #[test]
    fn test_direction_from_destination() {
        let topology = Topology::belgrano_norte();
        assert_eq!(topology.direction_of("RETIRO"), Direction::TowardOrigin);
        assert_eq!(topology.direction_of("Retiro"), Direction::TowardOrigin);
        assert_eq!(topology.direction_of("VILLA ROSA"), Direction::TowardFarEnd);
        assert_eq!(topology.direction_of("GRAND BOURG"), Direction::TowardFarEnd);
    }

    #[test]
    fn test_station_positions_span_track() {
        let topology = short_line();
        assert_eq!(topology.station_position(0), 0.0);
        assert_eq!(topology.station_position(1), 50.0);
        assert_eq!(topology.station_position(2), 100.0);

        let infos = topology.station_infos();
        assert_eq!(infos.len(), 3);
        assert!(infos[0].is_terminal);
        assert!(!infos[1].is_terminal);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut topology = short_line();
        topology.stations.push("Bravo".into());
        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate station"));
    }

    #[test]
    fn test_validate_rejects_non_adjacent_travel_time() {
        let mut topology = short_line();
        topology
            .travel_times
            .insert("Alpha-Charlie".to_string(), 4);
        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("adjacent"));
    }

    #[test]
    fn test_validate_rejects_unknown_corroborating_station() {
        let mut topology = short_line();
        topology.terminals.push(Terminal {
            name: "Bravo".into(),
            branch: Some(BranchCorroboration {
                toward_origin: "Alpha".into(),
                toward_far_end: "Delta".into(),
            }),
        });
        let err = topology.validate().unwrap_err();
        assert!(err.to_string().contains("Delta"));
    }

    #[test]
    fn test_topology_json_roundtrip_from_file() {
        let path = std::env::temp_dir().join(format!(
            "ferrovias-topology-{}.json",
            std::process::id()
        ));
        let topology = short_line();
        std::fs::write(&path, serde_json::to_string(&topology).unwrap()).unwrap();

        let loaded = Topology::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, topology);
    }
}
