// Application state shared across all modules

use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{EmailService, SupabaseService};

/// Application state: configuration plus the external collaborators.
/// The API itself is stateless between requests; everything here is
/// read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub supabase: Arc<SupabaseService>,
    pub email: Arc<EmailService>,
    pub dev_mode: DevModeConfig,
}
