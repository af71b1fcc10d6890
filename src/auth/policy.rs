//! Admin policy evaluation
//!
//! One evaluator, used by every admin-gated route. Claims set by the
//! platform (`role`, `app_metadata`) are checked before user-editable
//! metadata, and the legacy email comparison comes last since it only
//! exists for pre-migration accounts. Malformed input evaluates to false.

use serde_json::Value;

use super::models::SupabaseUser;

/// Decide administrator status for an identity record. First match wins:
/// top-level `role`, then `app_metadata` role claims, then `user_metadata`
/// role claims, then the configured administrator address.
pub fn is_admin_user(user: &SupabaseUser, admin_email: &str) -> bool {
    if let Some(role) = &user.role {
        if role.eq_ignore_ascii_case("admin") {
            return true;
        }
    }

    if metadata_grants_admin(user.app_metadata.as_ref())
        || metadata_grants_admin(user.user_metadata.as_ref())
    {
        return true;
    }

    match (&user.email, admin_email.is_empty()) {
        (Some(email), false) => email.trim().eq_ignore_ascii_case(admin_email),
        _ => false,
    }
}

/// Accepts `role: "admin"`, `roles: "admin"` or `roles: [.., "admin", ..]`,
/// case-insensitively. Any other shape grants nothing.
fn metadata_grants_admin(metadata: Option<&Value>) -> bool {
    let Some(obj) = metadata.and_then(Value::as_object) else {
        return false;
    };

    if value_is_admin(obj.get("role")) {
        return true;
    }

    match obj.get("roles") {
        Some(Value::Array(items)) => items.iter().any(|item| value_is_admin(Some(item))),
        other => value_is_admin(other),
    }
}

fn value_is_admin(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map(|s| s.eq_ignore_ascii_case("admin"))
        .unwrap_or(false)
}
