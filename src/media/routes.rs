// src/media/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};

use super::handlers;

// Headroom for the multipart framing on top of the largest accepted file.
// Without this layer the framework's default 2 MB body limit would cut the
// stream long before the handler's own size check runs.
const BODY_LIMIT: usize = handlers::MAX_FILE_SIZE + 1024 * 1024;

pub fn media_routes() -> Router {
    Router::new()
        .route(
            "/api/media",
            get(handlers::list_media).post(handlers::upload_media),
        )
        .route("/api/media/:name", delete(handlers::delete_media))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}
