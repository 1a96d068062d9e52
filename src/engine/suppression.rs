//! Ghost-train suppression at terminals
//!
//! Stations keep announcing a train for a while after it has left a
//! terminal, with an "en route" time that would draw it running backward.
//! When a train's best report sits at a terminal it is hidden unless it is
//! arriving at its own destination, or, at a branch terminal, unless it is
//! either close enough or corroborated by the neighbouring station it must
//! pass on the way in.

use tracing::debug;

use super::report::TrainReport;
use super::train::Train;
use crate::topology::{BranchCorroboration, Direction, Topology};

/// Outcome of the terminal check
#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    Show,
    Hide(HideReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HideReason {
    /// Best report at a physical line end the train is not bound for
    DepartingLineEnd { terminal: String },
    /// Best report at a branch terminal, too far out and not seen at the corroborating station
    UncorroboratedBranchDeparture {
        terminal: String,
        corroborating_station: String,
        threshold_minutes: u32,
        minutes_to_arrival: u32,
    },
}

impl Visibility {
    #[must_use]
    pub fn is_shown(&self) -> bool {
        matches!(self, Visibility::Show)
    }
}

/// How a terminal treats trains not bound for it
enum TerminalKind<'a> {
    NotTerminal,
    Destination,
    LineEnd,
    Branch(&'a BranchCorroboration),
}

/// Decide whether a train whose best report is `best` should be drawn
#[must_use]
pub fn check_terminal_departure(topology: &Topology, train: &Train, best: &TrainReport) -> Visibility {
    let kind = classify(topology, train, best);
    let direction = topology.direction_of(&train.destination);

    let visibility = match (kind, direction) {
        (TerminalKind::NotTerminal | TerminalKind::Destination, _) => Visibility::Show,
        (TerminalKind::LineEnd, _) => Visibility::Hide(HideReason::DepartingLineEnd {
            terminal: best.station.clone(),
        }),
        (TerminalKind::Branch(branch), Direction::TowardOrigin) => {
            corroborate(topology, train, best, &branch.toward_origin)
        }
        (TerminalKind::Branch(branch), Direction::TowardFarEnd) => {
            corroborate(topology, train, best, &branch.toward_far_end)
        }
    };

    if let Visibility::Hide(reason) = &visibility {
        debug!(train = %train.id, ?reason, "Hiding departing train");
    }
    visibility
}

fn classify<'a>(topology: &'a Topology, train: &Train, best: &TrainReport) -> TerminalKind<'a> {
    let Some(terminal) = topology.terminal(&best.station) else {
        return TerminalKind::NotTerminal;
    };

    if train
        .destination
        .to_uppercase()
        .contains(&terminal.name.to_uppercase())
    {
        return TerminalKind::Destination;
    }

    match &terminal.branch {
        Some(branch) => TerminalKind::Branch(branch),
        None => TerminalKind::LineEnd,
    }
}

/// A report at the corroborating station always shows the train; without one
/// it is shown only while its arrival time is within the segment travel time.
fn corroborate(
    topology: &Topology,
    train: &Train,
    best: &TrainReport,
    corroborating_station: &str,
) -> Visibility {
    if train.reported_at(corroborating_station) {
        return Visibility::Show;
    }

    let threshold = topology.travel_time(&best.station, corroborating_station);
    let minutes = best.minutes_to_arrival();
    if minutes > threshold {
        Visibility::Hide(HideReason::UncorroboratedBranchDeparture {
            terminal: best.station.clone(),
            corroborating_station: corroborating_station.to_string(),
            threshold_minutes: threshold,
            minutes_to_arrival: minutes,
        })
    } else {
        Visibility::Show
    }
}
