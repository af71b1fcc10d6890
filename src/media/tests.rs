//! Tests for media module
//!
//! The upload test drives the real router with an unreachable upstream: a
//! request that fails at the MIME sniff proves the body made it through the
//! multipart decoding intact.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::extract::Extension;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use reqwest::Client;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    use super::super::handlers::is_safe_object_name;
    use super::super::routes::media_routes;
    use crate::common::config::{AppConfig, SmtpConfig};
    use crate::common::dev_mode::DevModeConfig;
    use crate::common::AppState;
    use crate::services::{EmailService, SupabaseService};

    fn test_config() -> AppConfig {
        AppConfig {
            supabase_url: "http://127.0.0.1:1".to_string(),
            service_role_key: "service-key".to_string(),
            anon_key: "anon-key".to_string(),
            admin_email: "admin@alma101.example".to_string(),
            media_bucket: "videos".to_string(),
            site_name: "Alma101".to_string(),
            login_url: "http://localhost:8080/auth".to_string(),
            environment: "test".to_string(),
            cors_origins: vec![],
            upstream_timeout: Duration::from_secs(1),
            port: 0,
            sendgrid_api_key: None,
            smtp: SmtpConfig {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from_email: "noreply@example.com".to_string(),
                from_name: "Alma101".to_string(),
            },
        }
    }

    fn app() -> Router {
        let config = test_config();
        let http = Client::new();
        let state = AppState {
            supabase: Arc::new(SupabaseService::new(http.clone(), &config)),
            email: Arc::new(EmailService::new(http, &config)),
            config,
            dev_mode: DevModeConfig {
                enabled: true,
                user_email: "dev@test.com".to_string(),
                user_is_admin: true,
            },
        };
        media_routes().layer(Extension(Arc::new(RwLock::new(state))))
    }

    fn multipart_body(boundary: &str, filename: &str, payload: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
        body
    }

    async fn upload(payload: Vec<u8>) -> (StatusCode, String) {
        let body = multipart_body("XBOUNDARYX", "clip.mp4", &payload);
        let request = Request::builder()
            .method("POST")
            .uri("/api/media")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=XBOUNDARYX",
            )
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn test_plain_filenames_accepted() {
        assert!(is_safe_object_name("intro.mp4"));
        assert!(is_safe_object_name("nmap walkthrough.webm"));
        assert!(is_safe_object_name("c2-lab_part.2.ogg"));
    }

    #[test]
    fn test_traversal_and_separators_rejected() {
        assert!(!is_safe_object_name(""));
        assert!(!is_safe_object_name("../secrets.mp4"));
        assert!(!is_safe_object_name("a/b.mp4"));
        assert!(!is_safe_object_name("a\\b.mp4"));
        assert!(!is_safe_object_name(".."));
    }

    #[tokio::test]
    async fn test_upload_over_two_megabytes_reaches_the_type_check() {
        // A payload over the framework's 2 MB default body limit must still
        // be decoded; the zero-filled bytes then fail the MIME sniff, which
        // is only reachable once the whole file has been read.
        let (status, body) = upload(vec![0u8; 3 * 1024 * 1024]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            body.contains("Unrecognized file type"),
            "unexpected body: {}",
            body
        );
    }

    #[tokio::test]
    async fn test_small_unrecognized_upload_rejected_at_type_check() {
        let (status, body) = upload(vec![0u8; 1024]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Unrecognized file type"));
    }
}
