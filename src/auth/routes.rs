//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - password-grant sign in
/// - `POST /api/auth/register` - account creation
/// - `GET /api/auth/is-admin` - admin probe for the frontend
/// - `POST/PUT /api/auth/reset-password` - one-time-code reset flow
/// - `POST /api/auth/admin/reset-password` - admin-gated password override
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/is-admin", get(handlers::is_admin_probe))
        .route(
            "/api/auth/reset-password",
            post(handlers::request_password_reset).put(handlers::confirm_password_reset),
        )
        .route(
            "/api/auth/admin/reset-password",
            post(handlers::admin_reset_password),
        )
}
