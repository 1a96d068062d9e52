use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api;
use crate::config::ServerConfig;
use crate::tracker::LiveTracker;

pub async fn run(config: &ServerConfig, tracker: Arc<LiveTracker>) -> std::io::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api::router(tracker))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app).await
}
