//! Ferrovias - live train positions for the Belgrano Norte line
//!
//! This library estimates where trains are along a linear commuter corridor
//! from the noisy "time to arrival" each station announces, and projects them
//! onto a 0-100 track coordinate for display.

pub mod api;
pub mod cache;
pub mod config;
pub mod departures;
pub mod engine;
pub mod error;
pub mod feed;
pub mod logging;
pub mod snapshot;
pub mod topology;
pub mod tracker;
pub mod web;

// Re-export core types for public API
pub use cache::SnapshotCache;
pub use config::TrackerConfig;
pub use departures::{Departure, DepartureCategory, station_departures};
pub use engine::{ArrivalEstimate, PositionEngine, Train, TrainLocation, TrainPosition, TrainReport};
pub use error::TrackerError;
pub use feed::{DataSource, SnapshotSource, StatusFeedClient};
pub use snapshot::{StationEntry, StationSnapshot, StatusPayload};
pub use topology::{Direction, Topology};
pub use tracker::LiveTracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TrackerError>;
