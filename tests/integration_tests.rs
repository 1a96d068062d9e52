//! End-to-end tests for the position engine over whole snapshots

use std::collections::BTreeSet;

use ferrovias::engine::TrainLocation;
use ferrovias::snapshot::{parse_snapshot, sample_snapshot};
use ferrovias::topology::BranchCorroboration;
use ferrovias::{PositionEngine, Topology, Train, TrainReport};

fn engine() -> PositionEngine {
    PositionEngine::new(Topology::belgrano_norte())
}

fn train(destination: &str, reports: &[(&str, u32)]) -> Train {
    reports.iter().fold(Train::new("9000", destination), |train, (station, minutes)| {
        train.with_report(TrainReport::minutes(*station, *minutes))
    })
}

#[test]
fn test_sample_snapshot_visible_trains() {
    let positions = engine().locate_trains(&sample_snapshot());
    let ids: BTreeSet<&str> = positions.iter().map(|p| p.id.as_str()).collect();

    let expected: BTreeSet<&str> = [
        "3083", "3086", "3088", "3089", "3090", "3091", "3093", "3094", "3097", "3D81",
    ]
    .into_iter()
    .collect();
    assert_eq!(ids, expected);

    for hidden in ["3081", "3092", "3095", "3098", "3099"] {
        assert!(!ids.contains(hidden), "train {hidden} should be hidden");
    }
}

#[test]
fn test_sample_snapshot_positions_on_track() {
    for position in engine().locate_trains(&sample_snapshot()) {
        let value = position.position.expect("sample trains are all renderable");
        assert!((0.0..=100.0).contains(&value), "{} at {}", position.id, value);
        assert!(!position.description.is_empty());
    }
}

#[test]
fn test_train_just_departed_is_placed_past_station() {
    let positions = engine().locate_trains(&sample_snapshot());
    let train = positions.iter().find(|p| p.id == "3D81").unwrap();

    let TrainLocation::Between { from, to, fraction } = &train.location else {
        panic!("expected 3D81 between stations, got {:?}", train.location);
    };
    assert_eq!(from, "Padilla");
    assert_eq!(to, "Florida");
    assert!(*fraction > 0.0 && *fraction < 5.0);
}

#[test]
fn test_pipeline_is_deterministic() {
    let engine = engine();
    let snapshot = sample_snapshot();
    assert_eq!(engine.locate_trains(&snapshot), engine.locate_trains(&snapshot));
}

#[test]
fn test_uncorroborated_boulogne_departure_hidden() {
    assert!(engine().locate(train("RETIRO", &[("Boulogne Sur Mer", 10)])).is_none());
}

#[test]
fn test_corroborating_station_is_configurable() {
    let mut topology = Topology::belgrano_norte();
    for terminal in &mut topology.terminals {
        if terminal.name == "BOULOGNE SUR MER" {
            terminal.branch = Some(BranchCorroboration {
                toward_origin: "A. Montes".to_string(),
                toward_far_end: "Villa Adelina".to_string(),
            });
        }
    }
    let engine = PositionEngine::new(topology);

    let uncorroborated = train("RETIRO", &[("Boulogne Sur Mer", 10)]);
    let corroborated = train("RETIRO", &[("Boulogne Sur Mer", 10), ("A. Montes", 15)]);

    assert!(engine.locate(uncorroborated).is_none());
    let position = engine.locate(corroborated).unwrap();
    assert_eq!(position.best_report.station, "Boulogne Sur Mer");
}

#[test]
fn test_train_between_stations_toward_far_end() {
    let position = engine()
        .locate(train("Villa Rosa", &[("Padilla", 3)]))
        .unwrap();

    let TrainLocation::Between { from, to, fraction } = &position.location else {
        panic!("expected a train between stations, got {:?}", position.location);
    };
    assert_eq!(from, "A. del Valle");
    assert_eq!(to, "Padilla");
    assert!((fraction - 25.0).abs() < 1e-9);
    assert_eq!(position.description, "Entre A. del Valle y Padilla");

    let topology = Topology::belgrano_norte();
    let value = position.position.unwrap();
    assert!(value > topology.station_position(3));
    assert!(value < topology.station_position(4));
}

#[test]
fn test_departure_from_line_end_hidden() {
    assert!(engine().locate(train("Villa Rosa", &[("Retiro", 0)])).is_none());
}

#[test]
fn test_unknown_stations_are_ignored() {
    let snapshot = parse_snapshot(
        r#"{
            "Constitucion": { "RETIRO-4001": ["2 min"] },
            "Munro": { "RETIRO-4002": ["En Estacion"] }
        }"#,
    )
    .unwrap();

    let positions = engine().locate_trains(&snapshot);
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].id, "4002");
    assert_eq!(
        positions[0].location,
        TrainLocation::AtStation {
            station: "Munro".to_string()
        }
    );
}

#[test]
fn test_malformed_station_entries_do_not_drop_the_snapshot() {
    let snapshot = parse_snapshot(
        r#"{
            "Munro": { "RETIRO-4002": ["En Estacion"] },
            "Constitucion": null,
            "Florida": []
        }"#,
    )
    .unwrap();

    let positions = engine().locate_trains(&snapshot);
    let ids: Vec<&str> = positions.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["4002"]);
}

#[test]
fn test_empty_snapshot_yields_no_trains() {
    assert!(engine().locate_trains(&parse_snapshot("{}").unwrap()).is_empty());
}
