//! Authentication data models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity record returned by the upstream Auth service. Owned entirely by
/// the upstream; read-only here. Metadata stays untyped because its shape is
/// not under this layer's control.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SupabaseUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub app_metadata: Option<Value>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

/// Session returned by a successful password-grant sign in.
#[derive(Debug, Deserialize)]
pub struct SignInSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: SupabaseUser,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}

#[derive(Serialize)]
pub struct LoginUser {
    pub id: String,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub is_admin: bool,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct AdminStatusResponse {
    pub admin: bool,
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordResetConfirm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default, rename = "newPassword")]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct AdminPasswordReset {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}
