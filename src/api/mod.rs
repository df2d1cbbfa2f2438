// API module - HTTP endpoints

pub mod cards;
pub mod middleware;
pub mod state;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(cards::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
