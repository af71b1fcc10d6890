// src/content/routes.rs

use axum::{routing::get, Router};

use super::handlers;

/// Routes for the content collections (blogs, tools, videos, writeups).
/// One parameterized router covers all four; unknown collections 404 in
/// the handler.
pub fn content_routes() -> Router {
    Router::new()
        .route(
            "/api/:collection",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/api/:collection/:id",
            get(handlers::get_resource)
                .put(handlers::update_resource)
                .delete(handlers::delete_resource)
                .patch(handlers::method_not_allowed),
        )
}
