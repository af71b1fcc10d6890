// src/media/handlers.rs
//! Object-storage endpoints for the media bucket. Listing is public;
//! upload and delete are admin-gated.

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use super::models::{MessageResponse, UploadResponse};
use crate::auth::AdminUser;
use crate::common::{ApiError, AppState};

// File size limit: 500MB
pub const MAX_FILE_SIZE: usize = 500 * 1024 * 1024;

const ALLOWED_MIME_TYPES: [&str; 8] = [
    "video/mp4",
    "video/webm",
    "video/ogg",
    "video/quicktime",
    "video/x-msvideo",
    "image/jpeg",
    "image/png",
    "image/gif",
];

/// Object names never traverse: no parent references, no separators.
pub fn is_safe_object_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// GET /api/media - list bucket objects with their public URLs
pub async fn list_media(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let state = state_lock.read().await.clone();
    let bucket = &state.config.media_bucket;

    let mut objects = state.supabase.list_objects(bucket).await?;

    for object in &mut objects {
        let url = object
            .get("name")
            .and_then(Value::as_str)
            .map(|name| state.supabase.public_object_url(bucket, name));
        if let (Some(url), Some(obj)) = (url, object.as_object_mut()) {
            obj.insert("public_url".to_string(), Value::String(url));
        }
    }

    Ok(Json(objects))
}

/// POST /api/media - upload one file into the bucket (admin only)
pub async fn upload_media(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let state = state_lock.read().await.clone();
    let bucket = state.config.media_bucket.clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?
            .to_string();

        if !is_safe_object_name(&filename) {
            return Err(ApiError::BadRequest("Invalid filename".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file data".to_string()))?;

        if data.len() > MAX_FILE_SIZE {
            return Err(ApiError::BadRequest(
                "File too large. Maximum size: 500MB".to_string(),
            ));
        }

        // Sniff the content type from the bytes, never from the client
        let mime_type = infer::get(&data)
            .map(|kind| kind.mime_type())
            .ok_or_else(|| ApiError::BadRequest("Unrecognized file type".to_string()))?;

        if !ALLOWED_MIME_TYPES.contains(&mime_type) {
            return Err(ApiError::BadRequest(format!(
                "Invalid file type '{}'. Allowed types: {}",
                mime_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }

        let safe_name = format!("{}_{}", Uuid::new_v4(), filename);

        if let Err(e) = state
            .supabase
            .upload_object(&bucket, &safe_name, data, mime_type)
            .await
        {
            error!(error = %e, bucket = %bucket, "Upload to storage failed");
            return Err(ApiError::ServiceUnavailable(
                "Unable to upload file".to_string(),
            ));
        }

        let public_url = state.supabase.public_object_url(&bucket, &safe_name);
        info!(admin_id = %admin.0.id, name = %safe_name, "Media uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                name: safe_name,
                public_url,
            }),
        ));
    }

    Err(ApiError::BadRequest("No file found in request".to_string()))
}

/// DELETE /api/media/:name - remove one object from the bucket (admin only)
pub async fn delete_media(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !is_safe_object_name(&name) {
        return Err(ApiError::BadRequest("Invalid filename".to_string()));
    }

    let state = state_lock.read().await.clone();

    match state
        .supabase
        .delete_object(&state.config.media_bucket, &name)
        .await
    {
        Ok(true) => {
            info!(admin_id = %admin.0.id, name = %name, "Media deleted");
            Ok(Json(MessageResponse {
                message: "File deleted successfully".to_string(),
            }))
        }
        Ok(false) => Err(ApiError::ServiceUnavailable(
            "Unable to delete file".to_string(),
        )),
        Err(e) => {
            error!(error = %e, "Delete from storage failed");
            Err(e.into())
        }
    }
}
