// src/auth/mod.rs

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod routes;


// Re-export commonly used items
pub use extractors::{AdminUser, AuthedUser};
pub use routes::auth_routes;
