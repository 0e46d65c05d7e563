use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        // Statistics
        .route("/stats/genres", get(handlers::get_genre_stats))
        .route("/stats/actors", get(handlers::get_actor_stats))
        .route("/favorites", get(handlers::get_favorites))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        // Ratings
        .route("/ratings", get(handlers::get_ratings))
        .route("/ratings/unmatched", get(handlers::get_unmatched))
}
