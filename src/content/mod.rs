// src/content/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use models::ResourceKind;
pub use routes::content_routes;
