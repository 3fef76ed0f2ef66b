use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
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
        .route("/dataset", get(handlers::dataset_summary))
        .route("/users", get(handlers::list_users))
        .route("/users/:user_id/soulmate", get(handlers::soulmate))
        .route(
            "/users/:user_id/recommendations/user-based",
            get(handlers::user_based),
        )
        .route(
            "/users/:user_id/recommendations/item-based",
            get(handlers::item_based),
        )
        .route(
            "/users/:user_id/recommendations/content-based",
            get(handlers::content_based),
        )
        .route("/users/:user_id/profile", get(handlers::profile))
        .route("/users/:user_id/report", get(handlers::report))
}
