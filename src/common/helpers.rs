// Helper functions for safe logging and input checks

use regex::Regex;
use std::sync::OnceLock;

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // First char, not first byte: the local part may be non-ASCII.
            if let Some(first) = parts[0].chars().next() {
                return format!("{}***@{}", first, parts[1]);
            }
        }
    }
    "***@***.***".to_string()
}

/// Shape check for email addresses taken from request bodies. Deliberately
/// loose: the upstream Auth service is the authority on deliverability.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });
    re.is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("ab"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_safe_email_log_handles_multibyte_local_part() {
        assert_eq!(safe_email_log("émail@example.com"), "é***@example.com");
        assert_eq!(safe_email_log("日本@example.jp"), "日***@example.jp");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn test_email_shape_check() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("  padded@example.org  "));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email(""));
    }
}
