// src/contact/models.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
