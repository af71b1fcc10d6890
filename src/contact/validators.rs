// src/contact/validators.rs

use super::models::ContactRequest;
use crate::common::{is_valid_email, ValidationResult, Validator};

const MIN_MESSAGE_LEN: usize = 10;
const MAX_MESSAGE_LEN: usize = 5000;

pub struct ContactValidator;

impl Validator<ContactRequest> for ContactValidator {
    fn validate(&self, data: &ContactRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Name is required");
        } else if data.name.len() > 255 {
            result.add_error("name", "Name must be less than 255 characters");
        }

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_valid_email(&data.email) {
            result.add_error("email", "Email must be valid");
        }

        let message = data.message.trim();
        if message.is_empty() {
            result.add_error("message", "Message is required");
        } else if message.len() < MIN_MESSAGE_LEN {
            result.add_error(
                "message",
                "Message must be at least 10 characters",
            );
        } else if message.len() > MAX_MESSAGE_LEN {
            result.add_error("message", "Message must be less than 5000 characters");
        }

        result
    }
}
