//! Station reports and status normalization

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::snapshot::StatusPayload;

/// Numeric value of [`ArrivalEstimate::Unknown`] on the minutes scale
pub const UNKNOWN_MINUTES: u32 = 999;

/// How far a station believes a train is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "minutes", rename_all = "snake_case")]
pub enum ArrivalEstimate {
    /// "En Estacion"
    AtPlatform,
    /// "Proximo"
    Imminent,
    Minutes(u32),
    /// Missing or unparseable status
    Unknown,
}

impl ArrivalEstimate {
    /// Normalize a raw status string. Never fails; anything unrecognized is `Unknown`.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        let lower = status.to_lowercase();
        if lower == "en estacion" {
            return ArrivalEstimate::AtPlatform;
        }
        if lower == "proximo" {
            return ArrivalEstimate::Imminent;
        }

        let digits: String = lower
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits
            .parse::<u32>()
            .map_or(ArrivalEstimate::Unknown, ArrivalEstimate::Minutes)
    }

    /// Normalize whatever the feed sent for one train at one station
    #[must_use]
    pub fn from_payload(payload: Option<&StatusPayload>) -> Self {
        payload
            .and_then(StatusPayload::as_text)
            .map_or(ArrivalEstimate::Unknown, Self::parse)
    }

    /// Position on the comparison scale: 0 at platform, 1 imminent, 999 unknown
    #[must_use]
    pub fn as_minutes(self) -> u32 {
        match self {
            ArrivalEstimate::AtPlatform => 0,
            ArrivalEstimate::Imminent => 1,
            ArrivalEstimate::Minutes(minutes) => minutes,
            ArrivalEstimate::Unknown => UNKNOWN_MINUTES,
        }
    }

    #[must_use]
    pub fn is_at_platform(self) -> bool {
        self.as_minutes() == 0
    }
}

impl fmt::Display for ArrivalEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrivalEstimate::AtPlatform => write!(f, "En Estacion"),
            ArrivalEstimate::Imminent => write!(f, "Proximo"),
            ArrivalEstimate::Minutes(minutes) => write!(f, "{minutes} min"),
            ArrivalEstimate::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One station's view of one train during a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub station: String,
    pub estimate: ArrivalEstimate,
}

impl TrainReport {
    pub fn new(station: impl Into<String>, estimate: ArrivalEstimate) -> Self {
        Self {
            station: station.into(),
            estimate,
        }
    }

    /// Report with a literal minutes value on the numeric scale
    pub fn minutes(station: impl Into<String>, minutes: u32) -> Self {
        let estimate = match minutes {
            0 => ArrivalEstimate::AtPlatform,
            1 => ArrivalEstimate::Imminent,
            UNKNOWN_MINUTES => ArrivalEstimate::Unknown,
            n => ArrivalEstimate::Minutes(n),
        };
        Self::new(station, estimate)
    }

    #[must_use]
    pub fn minutes_to_arrival(&self) -> u32 {
        self.estimate.as_minutes()
    }
}
