//! Station status snapshots
//!
//! One snapshot is the complete upstream answer for one polling cycle: for
//! every station, the trains it currently announces keyed by
//! `DESTINATION-TRAINID`, each with a free-text status.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Result, TrackerError};

/// Station name → composite train key → status payload
pub type StationSnapshot = BTreeMap<String, StationEntry>;

/// Composite train key → status payload for one station
pub type StationReports = BTreeMap<String, StatusPayload>;

const SAMPLE_SNAPSHOT: &str = include_str!("../data/sample_snapshot.json");

/// Status as transmitted by the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusPayload {
    Text(String),
    /// The feed usually wraps the status in a one-element list
    List(Vec<Value>),
    Other(Value),
}

impl StatusPayload {
    /// The status string, if the payload carries one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatusPayload::Text(text) => Some(text),
            StatusPayload::List(items) => items.first().and_then(Value::as_str),
            StatusPayload::Other(_) => None,
        }
    }
}

impl From<&str> for StatusPayload {
    fn from(value: &str) -> Self {
        StatusPayload::Text(value.to_string())
    }
}

/// Everything the feed announced for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StationEntry {
    Reports(StationReports),
    /// Anything that is not an object of train keys; carries no reports
    Other(Value),
}

impl StationEntry {
    /// The announced trains, or `None` for a malformed station entry
    #[must_use]
    pub fn reports(&self) -> Option<&StationReports> {
        match self {
            StationEntry::Reports(reports) => Some(reports),
            StationEntry::Other(_) => None,
        }
    }
}

impl From<StationReports> for StationEntry {
    fn from(reports: StationReports) -> Self {
        StationEntry::Reports(reports)
    }
}

/// A composite `DESTINATION-TRAINID` key split on its first hyphen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainKey {
    /// Destination with underscores turned into spaces
    pub destination: String,
    pub train_id: String,
}

impl TrainKey {
    /// Returns `None` when either side of the hyphen is missing
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let (destination, train_id) = key.split_once('-')?;
        if destination.is_empty() || train_id.is_empty() {
            return None;
        }
        Some(Self {
            destination: destination.replace('_', " "),
            train_id: train_id.to_string(),
        })
    }
}

/// Parse a raw JSON feed body
pub fn parse_snapshot(raw: &str) -> Result<StationSnapshot> {
    serde_json::from_str(raw)
        .map_err(|e| TrackerError::feed(format!("Invalid station status payload: {e}")))
}

/// The bundled snapshot substituted when the live feed is unavailable
pub fn sample_snapshot() -> StationSnapshot {
    // The bundled file is checked by the tests below
    parse_snapshot(SAMPLE_SNAPSHOT).unwrap_or_default()
}
