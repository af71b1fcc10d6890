// src/auth/handlers.rs

use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AdminUser;
use super::models::*;
use super::policy::is_admin_user;
use crate::common::{is_valid_email, safe_email_log, ApiError, AppState};
use crate::services::{EmailTemplate, SupabaseError};

/// Upstream collection holding one-time password-reset tickets. The API
/// itself stays stateless; the tickets live in the data store like any
/// other record.
const PASSWORD_RESETS: &str = "password_resets";

const RESET_CODE_TTL_MINUTES: i64 = 15;

#[derive(serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/auth/login - password-grant sign in against the upstream Auth
/// service. The response carries the admin flag so the frontend can gate
/// its UI, though every privileged route re-evaluates the policy itself.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Unable to login. Data is incomplete.".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();

    let session = match state
        .supabase
        .sign_in_with_password(body.email.trim(), &body.password)
        .await
    {
        Ok(session) => session,
        Err(SupabaseError::Status(code)) if code < 500 => {
            warn!(
                email = %safe_email_log(body.email.trim()),
                status = code,
                "Login rejected by upstream"
            );
            return Err(ApiError::Unauthorized("Login failed.".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let is_admin = is_admin_user(&session.user, &state.config.admin_email);
    info!(
        user_id = %session.user.id,
        is_admin = is_admin,
        "Login successful"
    );

    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        user: LoginUser {
            id: session.user.id,
            email: session.user.email,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            is_admin,
        },
    }))
}

/// POST /api/auth/register - create a user through the upstream admin API.
/// The welcome email is best-effort; registration succeeds either way.
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Unable to create user. Data is incomplete.".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();
    let email = body.email.trim();

    let created = match state
        .supabase
        .create_user(email, &body.password, body.username.as_deref())
        .await
    {
        Ok(user) => user,
        Err(SupabaseError::Status(code)) => {
            warn!(status = code, "Upstream refused user creation");
            return Err(ApiError::ServiceUnavailable(
                "Unable to create user.".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let username = body
        .username
        .clone()
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
    if let Err(e) = state
        .email
        .dispatch(email, EmailTemplate::Welcome { username })
        .await
    {
        warn!(error = %e, "Welcome email could not be sent");
    }

    info!(email = %safe_email_log(email), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User was created.", "user": created })),
    ))
}

/// GET /api/auth/is-admin - lightweight admin probe. Always answers 200
/// with `{admin: bool}`; any failure is conservatively "not admin".
pub async fn is_admin_probe(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
) -> Json<AdminStatusResponse> {
    let state = state_lock.read().await.clone();

    if state.dev_mode.is_enabled() {
        let dev_user = state.dev_mode.create_dev_user();
        return Json(AdminStatusResponse {
            admin: is_admin_user(&dev_user, &state.config.admin_email),
        });
    }

    let Some(token) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) else {
        return Json(AdminStatusResponse { admin: false });
    };
    let bare_token = token.strip_prefix("Bearer ").unwrap_or(token);

    match state.supabase.verify_token(bare_token).await {
        Ok(user) => Json(AdminStatusResponse {
            admin: is_admin_user(&user, &state.config.admin_email),
        }),
        Err(_) => Json(AdminStatusResponse { admin: false }),
    }
}

/// POST /api/auth/reset-password - issue a one-time code, persist the
/// ticket upstream and email the code to the account address.
pub async fn request_password_reset(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();

    let otp = format!("{}", rand::thread_rng().gen_range(100_000..=999_999));
    let expires_at = (Utc::now() + chrono::Duration::minutes(RESET_CODE_TTL_MINUTES)).to_rfc3339();

    let ticket = json!({
        "email": email,
        "otp": otp,
        "expires_at": expires_at,
        "used": false,
    });

    if let Err(e) = state.supabase.collection(PASSWORD_RESETS).create(ticket).await {
        error!(error = %e, "Failed to store password reset ticket");
        return Err(ApiError::InternalServer(
            "Failed to generate reset code".to_string(),
        ));
    }

    if let Err(e) = state
        .email
        .dispatch(&email, EmailTemplate::PasswordReset { code: otp })
        .await
    {
        error!(error = %e, "Failed to deliver reset code");
        return Err(ApiError::InternalServer(
            "Failed to send reset code email".to_string(),
        ));
    }

    info!(email = %safe_email_log(&email), "Password reset code sent");

    Ok(Json(MessageResponse {
        message: "Reset code sent successfully".to_string(),
    }))
}

/// PUT /api/auth/reset-password - verify the one-time code and set the new
/// password upstream. The ticket is marked used afterwards so it cannot be
/// replayed.
pub async fn confirm_password_reset(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<PasswordResetConfirm>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.otp.trim().is_empty() || body.new_password.is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let state = state_lock.read().await.clone();
    let now = Utc::now().to_rfc3339();

    let tickets = state
        .supabase
        .collection(PASSWORD_RESETS)
        .find(&[
            ("email", format!("eq.{}", email)),
            ("otp", format!("eq.{}", body.otp.trim())),
            ("used", "eq.false".to_string()),
            ("expires_at", format!("gt.{}", now)),
        ])
        .await?;

    if tickets.is_empty() {
        return Err(ApiError::BadRequest(
            "Invalid or expired reset code".to_string(),
        ));
    }

    if let Err(e) = state
        .supabase
        .update_password_by_email(&email, &body.new_password)
        .await
    {
        error!(error = %e, "Upstream password update failed");
        return Err(ApiError::InternalServer(
            "Failed to update password".to_string(),
        ));
    }

    let marked = state
        .supabase
        .collection(PASSWORD_RESETS)
        .update_where(
            &[
                ("email", format!("eq.{}", email)),
                ("otp", format!("eq.{}", body.otp.trim())),
            ],
            &json!({ "used": true }),
        )
        .await;
    if !matches!(marked, Ok(true)) {
        warn!(email = %safe_email_log(&email), "Could not mark reset ticket as used");
    }

    let changed_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if let Err(e) = state
        .email
        .dispatch(&email, EmailTemplate::PasswordChanged { time: changed_at })
        .await
    {
        warn!(error = %e, "Password-changed notice could not be sent");
    }

    info!(email = %safe_email_log(&email), "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}

/// POST /api/auth/admin/reset-password - administrator sets a user's
/// password directly through the upstream admin API.
pub async fn admin_reset_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Json(body): Json<AdminPasswordReset>,
) -> Result<Json<MessageResponse>, ApiError> {
    if body.user_id.trim().is_empty() || body.password.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }
    if body.password.len() < 8 {
        return Err(ApiError::ValidationError(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let state = state_lock.read().await.clone();

    let updated = match state
        .supabase
        .update_user_password(body.user_id.trim(), &body.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, admin_id = %admin.0.id, "Admin password reset failed");
            return Err(ApiError::InternalServer(
                "An error occurred while processing your request".to_string(),
            ));
        }
    };

    // Optionally notify the affected user
    if let Some(user_email) = updated.get("email").and_then(Value::as_str) {
        let changed_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        if let Err(e) = state
            .email
            .dispatch(user_email, EmailTemplate::PasswordChanged { time: changed_at })
            .await
        {
            warn!(error = %e, "Password-changed notice could not be sent");
        }
    }

    info!(admin_id = %admin.0.id, "Admin reset a user password");

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}
