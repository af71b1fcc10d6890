// src/content/handlers.rs
//! One set of handlers serves all four content collections. Reads are
//! public; every mutation is admin-gated through the `AdminUser` extractor,
//! so a rejected caller never triggers an upstream call.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::models::{ListParams, MessageResponse, ResourceKind, DEFAULT_PAGE_SIZE};
use crate::auth::AdminUser;
use crate::common::{ApiError, AppState};

/// PATCH is outside the public contract; partial updates go through PUT.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

fn resolve_kind(segment: &str) -> Result<ResourceKind, ApiError> {
    ResourceKind::from_path(segment)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown resource '{}'", segment)))
}

/// GET /api/:collection - ranged list, newest first
pub async fn list_resources(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let state = state_lock.read().await.clone();

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let rows = state
        .supabase
        .collection(kind.collection())
        .list(page, limit)
        .await?;

    debug!(
        collection = kind.collection(),
        rows = rows.len(),
        page = page,
        "Listed resources"
    );

    Ok(Json(rows))
}

/// GET /api/:collection/:id - fetch one record by id
pub async fn get_resource(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let state = state_lock.read().await.clone();

    match state.supabase.collection(kind.collection()).get(&id).await? {
        Some(row) => Ok(Json(row)),
        None => Err(ApiError::NotFound(format!("{} not found", kind.singular()))),
    }
}

/// POST /api/:collection - create a record (admin only). The owner id is
/// always taken from the gate's resolved identity, never from the body.
pub async fn create_resource(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    admin: AdminUser,
    Path(collection): Path<String>,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let kind = resolve_kind(&collection)?;
    let state = state_lock.read().await.clone();

    let Some(record) = body.as_object_mut() else {
        return Err(ApiError::BadRequest("Invalid JSON body".to_string()));
    };
    record.insert("author_id".to_string(), Value::String(admin.0.id.clone()));

    match state.supabase.collection(kind.collection()).create(body).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse {
                message: format!("{} created successfully", kind.singular()),
            }),
        )),
        Err(e) => {
            error!(error = %e, collection = kind.collection(), "Create failed");
            Err(ApiError::ServiceUnavailable(format!(
                "Unable to create {}",
                kind.singular().to_lowercase()
            )))
        }
    }
}

/// PUT /api/:collection/:id - partial update (admin only)
pub async fn update_resource(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _admin: AdminUser,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> Result<Json<MessageResponse>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let state = state_lock.read().await.clone();

    match state
        .supabase
        .collection(kind.collection())
        .update(&id, &patch)
        .await
    {
        Ok(true) => Ok(Json(MessageResponse {
            message: format!("{} updated successfully", kind.singular()),
        })),
        Ok(false) => Err(ApiError::ServiceUnavailable(format!(
            "Unable to update {}",
            kind.singular().to_lowercase()
        ))),
        Err(e) => {
            error!(error = %e, collection = kind.collection(), "Update failed");
            Err(e.into())
        }
    }
}

/// DELETE /api/:collection/:id - delete one record (admin only)
pub async fn delete_resource(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _admin: AdminUser,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let kind = resolve_kind(&collection)?;
    let state = state_lock.read().await.clone();

    match state
        .supabase
        .collection(kind.collection())
        .delete(&id)
        .await
    {
        Ok(true) => Ok(Json(MessageResponse {
            message: format!("{} deleted successfully", kind.singular()),
        })),
        Ok(false) => Err(ApiError::ServiceUnavailable(format!(
            "Unable to delete {}",
            kind.singular().to_lowercase()
        ))),
        Err(e) => {
            error!(error = %e, collection = kind.collection(), "Delete failed");
            Err(e.into())
        }
    }
}
