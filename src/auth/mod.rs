// Public API - what other modules can use
pub use credentials::{extract_api_key, extract_bearer, parse_authorization, Credential, CredentialSource};
pub use errors::{AuthError, CredentialError, HashingError, RefreshTokenError, TokenError};
pub use handlers::{login, refresh, revoke};
pub use hasher::SecretHasher;
pub use middleware::require_user;
pub use refresh::RefreshTokenStore;
pub use service::{AuthService, LoginSession};
pub use token::AccessTokenCodec;
pub use types::AuthenticatedUser;

// Internal modules
pub mod credentials;
pub mod errors;
mod handlers;
pub mod hasher;
mod middleware;
pub mod models;
pub mod refresh;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
