//! Per-station departure boards

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::engine::ArrivalEstimate;
use crate::snapshot::{StationSnapshot, TrainKey};

/// Trains further out than this are flagged as delayed
pub const DELAYED_AFTER_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureCategory {
    AtStation,
    Approaching,
    Scheduled,
    Delayed,
    Unknown,
}

impl DepartureCategory {
    fn from_estimate(estimate: ArrivalEstimate) -> Self {
        match estimate {
            ArrivalEstimate::AtPlatform => DepartureCategory::AtStation,
            ArrivalEstimate::Imminent => DepartureCategory::Approaching,
            ArrivalEstimate::Unknown => DepartureCategory::Unknown,
            ArrivalEstimate::Minutes(minutes) if minutes > DELAYED_AFTER_MINUTES => {
                DepartureCategory::Delayed
            }
            ArrivalEstimate::Minutes(_) => DepartureCategory::Scheduled,
        }
    }
}

impl fmt::Display for DepartureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartureCategory::AtStation => write!(f, "At station"),
            DepartureCategory::Approaching => write!(f, "Approaching"),
            DepartureCategory::Scheduled => write!(f, "Scheduled"),
            DepartureCategory::Delayed => write!(f, "Delayed"),
            DepartureCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One line of a station's departure board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    pub train_id: String,
    pub destination: String,
    /// Status text exactly as announced by the station
    pub status: Option<String>,
    pub estimate: ArrivalEstimate,
    pub minutes: u32,
    pub category: DepartureCategory,
}

/// Departure board of one station, soonest first (ties by train id)
#[must_use]
pub fn station_departures(snapshot: &StationSnapshot, station: &str) -> Vec<Departure> {
    let Some(entry) = snapshot.get(station) else {
        return Vec::new();
    };
    let Some(reports) = entry.reports() else {
        debug!("No departures readable for malformed entry at {}", station);
        return Vec::new();
    };

    let mut departures: Vec<Departure> = reports
        .iter()
        .filter_map(|(composite_key, payload)| {
            let key = TrainKey::parse(composite_key)?;
            let estimate = ArrivalEstimate::from_payload(Some(payload));
            Some(Departure {
                train_id: key.train_id,
                destination: key.destination,
                status: payload.as_text().map(ToString::to_string),
                estimate,
                minutes: estimate.as_minutes(),
                category: DepartureCategory::from_estimate(estimate),
            })
        })
        .collect();

    departures.sort_by(|a, b| {
        a.minutes
            .cmp(&b.minutes)
            .then_with(|| a.train_id.cmp(&b.train_id))
    });
    departures
}
