// Application configuration, loaded once at startup

use anyhow::{bail, Context};
use std::env;
use std::time::Duration;

/// All configuration the API needs, read from the environment exactly once.
/// Handlers never touch `env::var` directly; everything flows through this
/// struct via `AppState`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Supabase project, without a trailing slash.
    pub supabase_url: String,
    /// Privileged key for REST, Storage and the Auth admin API.
    pub service_role_key: String,
    /// Restricted key used for anonymous Auth operations (token verification,
    /// password-grant sign in).
    pub anon_key: String,
    /// Administrator address: contact-notification recipient and the
    /// last-resort admin check. Required, since contact delivery depends
    /// on it.
    pub admin_email: String,
    /// Storage bucket holding uploaded media.
    pub media_bucket: String,
    pub site_name: String,
    pub login_url: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Applied to every upstream call; a timed-out call fails closed.
    pub upstream_timeout: Duration,
    pub port: u16,
    pub sendgrid_api_key: Option<String>,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let supabase_url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL is not set")?
            .trim_end_matches('/')
            .to_string();
        let service_role_key =
            env::var("SUPABASE_SERVICE_ROLE_KEY").context("SUPABASE_SERVICE_ROLE_KEY is not set")?;
        let anon_key = env::var("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY is not set")?;

        if supabase_url.is_empty() {
            bail!("SUPABASE_URL is empty");
        }

        let admin_email = env::var("ADMIN_EMAIL")
            .context("ADMIN_EMAIL is not set")?
            .trim()
            .to_lowercase();
        if admin_email.is_empty() {
            bail!("ADMIN_EMAIL is empty");
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:5173,http://localhost:8080".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let smtp_from_email =
            env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| admin_email.clone());

        Ok(Self {
            supabase_url,
            service_role_key,
            anon_key,
            admin_email,
            media_bucket: env::var("MEDIA_BUCKET").unwrap_or_else(|_| "videos".to_string()),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "Alma101".to_string()),
            login_url: env::var("LOGIN_URL")
                .unwrap_or_else(|_| "http://localhost:8080/auth".to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            cors_origins,
            upstream_timeout: Duration::from_secs(timeout_secs),
            port,
            sendgrid_api_key: env::var("SENDGRID_API_KEY").ok().filter(|k| !k.is_empty()),
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse::<u16>().ok())
                    .unwrap_or(587),
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: env::var("SMTP_PASSWORD").unwrap_or_default(),
                from_email: smtp_from_email,
                from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Alma101".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns every env var it touches; process environment is
    // shared, so the scenarios stay in a single function.
    #[test]
    fn test_from_env_requires_admin_email() {
        env::set_var("SUPABASE_URL", "http://127.0.0.1:1/");
        env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service-key");
        env::set_var("SUPABASE_ANON_KEY", "anon-key");

        env::remove_var("ADMIN_EMAIL");
        let err = AppConfig::from_env().expect_err("missing ADMIN_EMAIL must fail");
        assert!(err.to_string().contains("ADMIN_EMAIL"));

        env::set_var("ADMIN_EMAIL", "   ");
        let err = AppConfig::from_env().expect_err("blank ADMIN_EMAIL must fail");
        assert!(err.to_string().contains("ADMIN_EMAIL"));

        env::set_var("ADMIN_EMAIL", "Admin@Alma101.Example");
        let config = AppConfig::from_env().expect("complete environment loads");
        assert_eq!(config.admin_email, "admin@alma101.example");
        assert_eq!(config.supabase_url, "http://127.0.0.1:1");
    }
}
