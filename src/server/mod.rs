mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/attractions", post(handlers::attractions))
        .route("/neighborhoods", get(handlers::neighborhoods))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("hoodfinder listening on http://{}", addr);
    info!("Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
