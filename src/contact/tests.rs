//! Tests for contact module

#[cfg(test)]
mod tests {
    use super::super::models::ContactRequest;
    use super::super::validators::ContactValidator;
    use crate::common::Validator;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let result =
            ContactValidator.validate(&request("Ada", "ada@example.com", "I found a broken link."));
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_nine_character_message_is_rejected() {
        // One character under the minimum; no email may be dispatched for this.
        let result = ContactValidator.validate(&request("Ada", "ada@example.com", "123456789"));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "message"));
    }

    #[test]
    fn test_whitespace_padding_does_not_satisfy_minimum() {
        let result =
            ContactValidator.validate(&request("Ada", "ada@example.com", "   short    "));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_missing_fields_are_each_reported() {
        let result = ContactValidator.validate(&request("", "", ""));
        assert!(!result.is_valid);
        for field in ["name", "email", "message"] {
            assert!(
                result.errors.iter().any(|e| e.field == field),
                "expected an error for {}",
                field
            );
        }
    }

    #[test]
    fn test_bad_email_shape_is_rejected() {
        let result =
            ContactValidator.validate(&request("Ada", "not-an-email", "A long enough message."));
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "email"));
    }
}
