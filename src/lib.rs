// Library crate for the Chirpy server
// This file exposes the public API for integration tests

pub mod app;
pub mod auth;
pub mod chirps;
pub mod config;
pub mod shared;
pub mod users;
pub mod webhooks;

// Re-export commonly used types for easier access in tests
pub use app::{build_state, router};
pub use auth::{AuthError, AuthService};
pub use config::AppConfig;
pub use shared::{AppError, AppState, StorageError};
