// Public API - what other modules can use
pub use handlers::{create_chirp, delete_chirp, get_chirp, list_chirps};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
