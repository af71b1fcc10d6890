// src/services/supabase.rs
//! Client for the upstream Supabase services: Auth (token verification,
//! password grant, admin user management), the PostgREST data API and
//! Storage. This layer is a pure proxy; it holds no state of its own and
//! performs exactly one outbound request per call, bounded by the shared
//! client timeout.

use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::auth::models::{SignInSession, SupabaseUser};
use crate::common::AppConfig;

/// Sort order applied to every ranged list fetch: newest first.
const ORDER_NEWEST_FIRST: &str = "created_at.desc";

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
}

pub struct SupabaseService {
    http: Client,
    base_url: String,
    service_key: String,
    anon_key: String,
}

impl SupabaseService {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.service_role_key.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Exchange a bare access token for the caller's identity. Any non-200
    /// response means the token is missing, expired or malformed; callers
    /// treat that as unauthenticated.
    pub async fn verify_token(&self, access_token: &str) -> Result<SupabaseUser, SupabaseError> {
        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<SupabaseUser>().await?)
    }

    /// Password-grant sign in with the restricted (anonymous) credential.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInSession, SupabaseError> {
        let resp = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<SignInSession>().await?)
    }

    /// Create a user through the Auth admin API (service credential).
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        username: Option<&str>,
    ) -> Result<Value, SupabaseError> {
        let mut payload = serde_json::json!({ "email": email, "password": password });
        if let Some(username) = username {
            payload["user_metadata"] = serde_json::json!({ "username": username });
        }

        let resp = self
            .http
            .post(format!("{}/auth/v1/admin/users", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Value>().await?)
    }

    /// Set a user's password by id through the Auth admin API. Returns the
    /// updated user record.
    pub async fn update_user_password(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<Value, SupabaseError> {
        let resp = self
            .http
            .put(format!(
                "{}/auth/v1/admin/users/{}",
                self.base_url,
                urlencoding::encode(user_id)
            ))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Value>().await?)
    }

    /// Set a user's password by email with the service credential. This is
    /// the upstream interface the one-time-code reset flow drives.
    pub async fn update_password_by_email(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), SupabaseError> {
        let resp = self
            .http
            .put(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(())
    }

    // ========================================================================
    // Data API
    // ========================================================================

    /// Handle on one PostgREST collection.
    pub fn collection(&self, name: &'static str) -> ResourceProxy<'_> {
        ResourceProxy {
            service: self,
            collection: name,
        }
    }

    fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    // ========================================================================
    // Storage
    // ========================================================================

    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<Value>, SupabaseError> {
        let resp = self
            .http
            .get(format!(
                "{}/storage/v1/object/list/{}",
                self.base_url, bucket
            ))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Vec<Value>>().await?)
    }

    pub async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), SupabaseError> {
        let resp = self
            .http
            .post(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url,
                bucket,
                urlencoding::encode(name)
            ))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(())
    }

    pub async fn delete_object(&self, bucket: &str, name: &str) -> Result<bool, SupabaseError> {
        let resp = self
            .http
            .delete(format!(
                "{}/storage/v1/object/{}/{}",
                self.base_url,
                bucket,
                urlencoding::encode(name)
            ))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        Ok(resp.status().is_success())
    }

    pub fn public_object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            urlencoding::encode(name)
        )
    }
}

/// CRUD proxy over one upstream collection. All methods validate their
/// inputs before touching the network: a malformed id never produces an
/// upstream call.
pub struct ResourceProxy<'a> {
    service: &'a SupabaseService,
    collection: &'static str,
}

impl ResourceProxy<'_> {
    /// Ranged fetch, newest first. `page` and `limit` are clamped to sane
    /// positive values before the offset is computed.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Vec<Value>, SupabaseError> {
        let resp = self
            .service
            .http
            .get(self.service.rest_url(self.collection))
            .header("apikey", &self.service.service_key)
            .bearer_auth(&self.service.service_key)
            .query(&list_query(page, limit))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Vec<Value>>().await?)
    }

    /// Filtered fetch by id. An id that is neither all-digits nor a
    /// hyphenated UUID short-circuits to `None` without a network call.
    pub async fn get(&self, id: &str) -> Result<Option<Value>, SupabaseError> {
        if !is_valid_resource_id(id) {
            warn!(collection = self.collection, "Rejected malformed resource id");
            return Ok(None);
        }

        let mut rows = self.find(&[("id", format!("eq.{}", id))]).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Filtered fetch with arbitrary PostgREST filter expressions.
    pub async fn find(&self, filters: &[(&str, String)]) -> Result<Vec<Value>, SupabaseError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(filters.iter().map(|(k, v)| (*k, v.clone())));

        let resp = self
            .service
            .http
            .get(self.service.rest_url(self.collection))
            .header("apikey", &self.service.service_key)
            .bearer_auth(&self.service.service_key)
            .query(&query)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        Ok(resp.json::<Vec<Value>>().await?)
    }

    /// Insert one record and return the created representation.
    pub async fn create(&self, record: Value) -> Result<Value, SupabaseError> {
        let resp = self
            .service
            .http
            .post(self.service.rest_url(self.collection))
            .header("apikey", &self.service.service_key)
            .bearer_auth(&self.service.service_key)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SupabaseError::Status(resp.status().as_u16()));
        }

        let mut created = resp.json::<Value>().await?;
        // PostgREST returns an array of created rows
        if let Some(first) = created.as_array_mut().and_then(|rows| {
            if rows.is_empty() {
                None
            } else {
                Some(rows.remove(0))
            }
        }) {
            return Ok(first);
        }
        Ok(created)
    }

    /// Partial update by id. Success is judged purely from the status class.
    pub async fn update(&self, id: &str, patch: &Value) -> Result<bool, SupabaseError> {
        if !is_valid_resource_id(id) {
            warn!(collection = self.collection, "Rejected malformed resource id");
            return Ok(false);
        }
        self.update_where(&[("id", format!("eq.{}", id))], patch)
            .await
    }

    /// Partial update by filter expressions.
    pub async fn update_where(
        &self,
        filters: &[(&str, String)],
        patch: &Value,
    ) -> Result<bool, SupabaseError> {
        let resp = self
            .service
            .http
            .patch(self.service.rest_url(self.collection))
            .header("apikey", &self.service.service_key)
            .bearer_auth(&self.service.service_key)
            .query(filters)
            .json(patch)
            .send()
            .await?;

        Ok(resp.status().is_success())
    }

    /// Delete by id. Success is judged purely from the status class.
    pub async fn delete(&self, id: &str) -> Result<bool, SupabaseError> {
        if !is_valid_resource_id(id) {
            warn!(collection = self.collection, "Rejected malformed resource id");
            return Ok(false);
        }

        let resp = self
            .service
            .http
            .delete(self.service.rest_url(self.collection))
            .header("apikey", &self.service.service_key)
            .bearer_auth(&self.service.service_key)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        Ok(resp.status().is_success())
    }
}

/// Build the PostgREST query for a ranged, newest-first fetch.
pub fn list_query(page: u32, limit: u32) -> Vec<(&'static str, String)> {
    let (limit, offset) = page_window(page, limit);
    vec![
        ("select", "*".to_string()),
        ("limit", limit.to_string()),
        ("offset", offset.to_string()),
        ("order", ORDER_NEWEST_FIRST.to_string()),
    ]
}

/// Clamp pagination parameters and compute the window.
/// Returns `(limit, offset)` with `offset = (page - 1) * limit`.
pub fn page_window(page: u32, limit: u32) -> (u32, u32) {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    // `page` comes straight from the query string; saturate instead of
    // overflowing on absurd values.
    (limit, (page - 1).saturating_mul(limit))
}

/// An id is acceptable only as an unsigned integer or as a strict
/// 8-4-4-4-12 hex UUID. Anything else (path fragments, filter operators,
/// stray punctuation) is rejected before it can reach a filter expression.
pub fn is_valid_resource_id(id: &str) -> bool {
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }

    const GROUP_LENS: [usize; 5] = [8, 4, 4, 4, 12];
    let groups: Vec<&str> = id.split('-').collect();
    groups.len() == GROUP_LENS.len()
        && groups
            .iter()
            .zip(GROUP_LENS)
            .all(|(g, len)| g.len() == len && g.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> SupabaseService {
        // Reserved port on localhost: any attempted connection fails fast,
        // so a test that expects no network call would surface one as Err.
        SupabaseService {
            http: Client::new(),
            base_url: "http://127.0.0.1:1".to_string(),
            service_key: "service-key".to_string(),
            anon_key: "anon-key".to_string(),
        }
    }

    #[test]
    fn test_numeric_and_uuid_ids_accepted() {
        assert!(is_valid_resource_id("1"));
        assert!(is_valid_resource_id("9041"));
        assert!(is_valid_resource_id("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_valid_resource_id("550E8400-E29B-41D4-A716-446655440000"));
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!(!is_valid_resource_id(""));
        assert!(!is_valid_resource_id("abc"));
        assert!(!is_valid_resource_id("12/34"));
        assert!(!is_valid_resource_id("../etc/passwd"));
        assert!(!is_valid_resource_id("id=eq.1;drop"));
        // right shape, non-hex content
        assert!(!is_valid_resource_id("550e8400-e29b-41d4-a716-44665544zzzz"));
        // hyphen groups with wrong lengths
        assert!(!is_valid_resource_id("550e840-0e29b-41d4-a716-446655440000"));
        assert!(!is_valid_resource_id("-1"));
    }

    #[test]
    fn test_page_window_clamps_and_offsets() {
        assert_eq!(page_window(2, 10), (10, 10));
        assert_eq!(page_window(1, 10), (10, 0));
        assert_eq!(page_window(0, 10), (10, 0));
        assert_eq!(page_window(3, 25), (25, 50));
        // limit clamped into 1..=100
        assert_eq!(page_window(1, 0), (1, 0));
        assert_eq!(page_window(2, 1000), (100, 100));
        // absurd page values saturate rather than overflow
        assert_eq!(page_window(u32::MAX, 100), (100, u32::MAX));
        assert_eq!(page_window(u32::MAX, 1), (1, u32::MAX - 1));
    }

    #[test]
    fn test_list_query_orders_newest_first() {
        let query = list_query(2, 10);
        assert!(query.contains(&("limit", "10".to_string())));
        assert!(query.contains(&("offset", "10".to_string())));
        assert!(query.contains(&("order", "created_at.desc".to_string())));
    }

    #[tokio::test]
    async fn test_get_with_malformed_id_makes_no_upstream_call() {
        let service = offline_service();
        let proxy = service.collection("blogs");

        // The upstream is unreachable; Ok(None) proves nothing was sent.
        let result = proxy.get("../etc/passwd").await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_update_and_delete_with_malformed_id_make_no_upstream_call() {
        let service = offline_service();
        let proxy = service.collection("tools");

        let patch = serde_json::json!({ "title": "x" });
        assert!(matches!(proxy.update("a/b", &patch).await, Ok(false)));
        assert!(matches!(proxy.delete("..").await, Ok(false)));
    }

    #[test]
    fn test_public_object_url_encodes_name() {
        let service = offline_service();
        assert_eq!(
            service.public_object_url("videos", "intro to nmap.mp4"),
            "http://127.0.0.1:1/storage/v1/object/public/videos/intro%20to%20nmap.mp4"
        );
    }
}
