// src/contact/routes.rs

use axum::{routing::post, Router};

use super::handlers;

pub fn contact_routes() -> Router {
    Router::new().route("/api/contact", post(handlers::submit_contact))
}
