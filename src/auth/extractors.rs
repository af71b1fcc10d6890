//! Authentication extractors for Axum
//!
//! These are the request gate: `AuthedUser` turns a bearer token into an
//! identity by delegating to the upstream Auth service (401 on failure),
//! and `AdminUser` additionally runs the admin policy (403 on failure).
//! A rejected request never reaches the downstream proxy call.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::policy::is_admin_user;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated caller, resolved once per request.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // DEV MODE: bypass token verification completely
        if app_state.dev_mode.is_enabled() {
            let dev_user = app_state.dev_mode.create_dev_user();
            let is_admin = is_admin_user(&dev_user, &app_state.config.admin_email);

            debug!(
                user_id = %dev_user.id,
                is_admin = is_admin,
                "DEV MODE: Authentication bypassed"
            );

            return Ok(AuthedUser {
                id: dev_user.id,
                email: dev_user.email,
                is_admin,
            });
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let token = match token {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("No token provided".to_string()));
            }
        };

        // Handle "Bearer <token>" format or raw token
        let bare_token = token.strip_prefix("Bearer ").unwrap_or(&token);

        let user = match app_state.supabase.verify_token(bare_token).await {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                return Err(ApiError::Unauthorized("Invalid token".to_string()));
            }
        };

        let is_admin = is_admin_user(&user, &app_state.config.admin_email);
        debug!(
            user_id = %user.id,
            email = %user.email.as_deref().map(safe_email_log).unwrap_or_default(),
            is_admin = is_admin,
            "User authenticated via upstream identity service"
        );

        Ok(AuthedUser {
            id: user.id,
            email: user.email,
            is_admin,
        })
    }
}

/// Authenticated administrator. Admin-gated routes take this extractor so
/// the 403 decision is made in one place, before any handler code runs.
#[derive(Debug)]
pub struct AdminUser(pub AuthedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authed = AuthedUser::from_request_parts(parts, state).await?;

        if !authed.is_admin {
            warn!(user_id = %authed.id, "Forbidden: admin privileges required");
            return Err(ApiError::Forbidden("Forbidden: admin only".to_string()));
        }

        Ok(AdminUser(authed))
    }
}
