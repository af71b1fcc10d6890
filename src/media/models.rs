// src/media/models.rs

use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub name: String,
    pub public_url: String,
}
