// src/media/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use routes::media_routes;
