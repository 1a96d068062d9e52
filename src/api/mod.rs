use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::departures::{Departure, station_departures};
use crate::engine::TrainPosition;
use crate::feed::DataSource;
use crate::topology::StationInfo;
use crate::tracker::{CycleSummary, LiveTracker};

type ApiError = (StatusCode, String);

#[derive(Serialize, Deserialize)]
pub struct TrainsResponse {
    pub updated_at: DateTime<Utc>,
    pub data_source: DataSource,
    pub trains: Vec<TrainPosition>,
}

#[derive(Serialize, Deserialize)]
pub struct DeparturesResponse {
    pub station: String,
    pub updated_at: DateTime<Utc>,
    pub departures: Vec<Departure>,
}

pub fn router(tracker: Arc<LiveTracker>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trains", get(get_trains))
        .route("/stations", get(get_stations))
        .route("/stations/{name}/departures", get(get_departures))
        .route("/refresh", post(refresh))
        .with_state(tracker)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

fn not_ready() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "No station data has been processed yet".to_string(),
    )
}

async fn get_trains(State(tracker): State<Arc<LiveTracker>>) -> Result<Json<TrainsResponse>, ApiError> {
    let state = tracker.current().await.ok_or_else(not_ready)?;
    Ok(Json(TrainsResponse {
        updated_at: state.updated_at,
        data_source: state.data_source.clone(),
        trains: state.trains.clone(),
    }))
}

async fn get_stations(State(tracker): State<Arc<LiveTracker>>) -> Json<Vec<StationInfo>> {
    Json(tracker.engine().topology().station_infos())
}

async fn get_departures(
    State(tracker): State<Arc<LiveTracker>>,
    Path(name): Path<String>,
) -> Result<Json<DeparturesResponse>, ApiError> {
    if !tracker.engine().topology().contains(&name) {
        return Err((StatusCode::NOT_FOUND, format!("Unknown station '{name}'")));
    }

    let state = tracker.current().await.ok_or_else(not_ready)?;
    Ok(Json(DeparturesResponse {
        departures: station_departures(&state.snapshot, &name),
        station: name,
        updated_at: state.updated_at,
    }))
}

async fn refresh(State(tracker): State<Arc<LiveTracker>>) -> Result<Json<CycleSummary>, ApiError> {
    tracker.refresh().await.map(Json).map_err(|e| {
        warn!("Manual refresh failed: {}", e);
        (StatusCode::BAD_GATEWAY, e.user_message())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PositionEngine;
    use crate::feed::tests::StaticSource;
    use crate::topology::Topology;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(source: StaticSource, allow_sample: bool) -> (Arc<LiveTracker>, Router) {
        let tracker = Arc::new(LiveTracker::new(
            Box::new(source),
            None,
            PositionEngine::new(Topology::belgrano_norte()),
            allow_sample,
        ));
        (tracker.clone(), router(tracker))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_trains_unavailable_before_first_cycle() {
        let (_, app) = app(StaticSource::failing(), true);
        let (status, _) = call(app, "GET", "/trains").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_trains_after_refresh() {
        let (tracker, app) = app(StaticSource::failing(), true);
        tracker.refresh().await.unwrap();

        let (status, body) = call(app, "GET", "/trains").await;
        assert_eq!(status, StatusCode::OK);
        let response: TrainsResponse = serde_json::from_slice(&body).unwrap();
        assert!(!response.data_source.is_live);
        assert_eq!(response.trains.len(), 10);
    }

    #[tokio::test]
    async fn test_departures_endpoint() {
        let (tracker, app) = app(StaticSource::failing(), true);
        tracker.refresh().await.unwrap();

        let (status, body) = call(app.clone(), "GET", "/stations/Boulogne%20Sur%20Mer/departures").await;
        assert_eq!(status, StatusCode::OK);
        let response: DeparturesResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.station, "Boulogne Sur Mer");
        assert_eq!(response.departures.len(), 4);

        let (status, _) = call(app, "GET", "/stations/Constitucion/departures").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stations_endpoint() {
        let (_, app) = app(StaticSource::failing(), true);
        let (status, body) = call(app, "GET", "/stations").await;
        assert_eq!(status, StatusCode::OK);
        let stations: Vec<StationInfo> = serde_json::from_slice(&body).unwrap();
        assert_eq!(stations.len(), 23);
        assert_eq!(stations[22].position, 100.0);
    }

    #[tokio::test]
    async fn test_refresh_endpoint_reports_feed_failure() {
        let (_, app) = app(StaticSource::failing(), false);
        let (status, body) = call(app, "POST", "/refresh").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(String::from_utf8_lossy(&body).contains("status feed"));
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app(StaticSource::failing(), true);
        let (status, _) = call(app, "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
