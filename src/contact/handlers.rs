// src/contact/handlers.rs

use axum::{extract::Extension, response::Json};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{ContactRequest, MessageResponse};
use super::validators::ContactValidator;
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::services::EmailTemplate;

const CONTACT_SUBMISSIONS: &str = "contact_submissions";

/// POST /api/contact - store the submission upstream and notify the site
/// administrator by email. Validation happens before anything leaves this
/// process; the upstream insert is best-effort but the notification is not.
pub async fn submit_contact(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let validation = ContactValidator.validate(&body);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await.clone();

    let name = body.name.trim().to_string();
    let email = body.email.trim().to_string();
    let message = body.message.trim().to_string();

    let submission = json!({ "name": name, "email": email, "message": message });
    if let Err(e) = state
        .supabase
        .collection(CONTACT_SUBMISSIONS)
        .create(submission)
        .await
    {
        // The notification email still carries the content; losing the
        // database copy is logged but not fatal.
        warn!(error = %e, "Failed to store contact submission");
    }

    state
        .email
        .dispatch(
            &state.config.admin_email,
            EmailTemplate::Contact {
                name: name.clone(),
                email: email.clone(),
                message,
            },
        )
        .await?;

    info!(from = %safe_email_log(&email), "Contact message relayed to admin");

    Ok(Json(MessageResponse {
        message: "Message sent".to_string(),
    }))
}
