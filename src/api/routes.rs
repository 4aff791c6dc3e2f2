use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware, session_middleware};

/// Largest accepted image upload
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/change_lang/:lang", get(handlers::change_lang))
        // Conversation
        .route("/chat", post(handlers::chat))
        .route("/new_chat", post(handlers::new_chat))
        // Catalogue
        .route("/search", post(handlers::search))
        .route("/browse_content", post(handlers::browse_content))
        .route("/get_details", post(handlers::get_details))
        // One-shot analyses
        .route(
            "/analyze_image",
            post(handlers::analyze_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/analyze_dna", post(handlers::analyze_dna))
        .route("/matchmaker", post(handlers::matchmaker))
        // Favorites
        .route("/favorites", get(handlers::get_favorites))
        .route("/favorites/add", post(handlers::add_favorite))
        .route("/favorites/remove", post(handlers::remove_favorite))
        .route_layer(from_fn_with_state(state.clone(), session_middleware))
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
