// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing upstream token verification for local testing

use std::env;

use crate::auth::models::SupabaseUser;

/// Fixed identity used whenever dev mode is enabled, so repeated requests
/// see a consistent author id.
const DEV_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_is_admin: bool,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email = env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string());

        let user_is_admin = env::var("DEV_USER_IS_ADMIN")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self {
            enabled,
            user_email,
            user_is_admin,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Build the dev identity as a Supabase-shaped user record so it flows
    /// through the same admin policy as a real one.
    pub fn create_dev_user(&self) -> SupabaseUser {
        SupabaseUser {
            id: DEV_USER_ID.to_string(),
            email: Some(self.user_email.clone()),
            role: self.user_is_admin.then(|| "admin".to_string()),
            app_metadata: None,
            user_metadata: None,
        }
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Token verification bypassed for testing");
        println!("   Dev User: {}", config.user_email);
        println!(
            "   Admin: {}",
            if config.user_is_admin { "Yes" } else { "No" }
        );
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args() -> Option<bool> {
    let args: Vec<String> = env::args().collect();

    for arg in &args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args() {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
