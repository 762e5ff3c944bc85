use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    credentials::{extract_api_key, extract_bearer, CredentialSource},
    errors::{AuthError, HashingError},
    hasher::SecretHasher,
    refresh::RefreshTokenStore,
    token::{clamp_ttl, AccessTokenCodec},
};
use crate::users::{models::UserModel, repository::UserRepository};

/// Result of a successful login
#[derive(Debug)]
pub struct LoginSession {
    pub user: UserModel,
    pub access_token: String,
    pub refresh_token: String,
}

/// Turns request credentials into identities and identities into sessions.
///
/// Holds no mutable state of its own; everything that changes lives behind
/// the repositories.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
    refresh_tokens: RefreshTokenStore,
    codec: AccessTokenCodec,
    hasher: SecretHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        refresh_tokens: RefreshTokenStore,
        codec: AccessTokenCodec,
        hasher: SecretHasher,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            codec,
            hasher,
        }
    }

    /// Hashes a password off the async executor
    pub async fn hash_password(&self, plaintext: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_string();

        let digest = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| HashingError(format!("hashing task failed: {}", e)))??;
        Ok(digest)
    }

    async fn verify_password(&self, digest: &str, plaintext: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let digest = digest.to_string();
        let plaintext = plaintext.to_string();

        let matched = tokio::task::spawn_blocking(move || hasher.verify(&digest, &plaintext))
            .await
            .map_err(|e| HashingError(format!("hashing task failed: {}", e)))??;
        Ok(matched)
    }

    async fn equalize(&self, plaintext: &str) {
        let hasher = self.hasher.clone();
        let plaintext = plaintext.to_string();
        let _ = tokio::task::spawn_blocking(move || hasher.equalize(&plaintext)).await;
    }

    /// Checks an email/password pair and opens a session.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`
    /// after exactly one hash computation.
    #[instrument(skip(self, email, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl_seconds: Option<i64>,
    ) -> Result<LoginSession, AuthError> {
        let user = match self.users.get_user_by_email(email).await? {
            Some(user) => user,
            None => {
                self.equalize(password).await;
                warn!("Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        // A digest we cannot parse is treated like a wrong password.
        let matched = match self.verify_password(&user.hashed_password, password).await {
            Ok(matched) => matched,
            Err(AuthError::Hashing(e)) => {
                warn!(user_id = %user.id, error = %e, "Stored password digest is unusable");
                self.equalize(password).await;
                false
            }
            Err(e) => return Err(e),
        };
        if !matched {
            warn!("Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .codec
            .issue(user.id, clamp_ttl(requested_ttl_seconds))
            .map_err(AuthError::TokenIssue)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?.token;

        info!(user_id = %user.id, "Login succeeded");
        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Identifies the caller from a bearer access token.
    ///
    /// There is no fallback to refresh tokens.
    #[instrument(skip(self, headers))]
    pub async fn authenticate<H>(&self, headers: &H) -> Result<Uuid, AuthError>
    where
        H: CredentialSource + ?Sized,
    {
        let token = extract_bearer(headers)?;
        self.codec.verify(&token).map_err(|e| {
            warn!(error = %e, "Access token rejected");
            AuthError::Unauthorized(e)
        })
    }

    /// Mints a new access token from a bearer refresh token.
    ///
    /// The refresh token itself is left untouched.
    #[instrument(skip(self, headers))]
    pub async fn refresh<H>(&self, headers: &H) -> Result<String, AuthError>
    where
        H: CredentialSource + ?Sized,
    {
        let token = extract_bearer(headers)?;
        let user_id = self.refresh_tokens.resolve(&token).await?;

        let access_token = self
            .codec
            .issue(user_id, clamp_ttl(None))
            .map_err(AuthError::TokenIssue)?;

        info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revokes the bearer refresh token
    #[instrument(skip(self, headers))]
    pub async fn logout<H>(&self, headers: &H) -> Result<(), AuthError>
    where
        H: CredentialSource + ?Sized,
    {
        let token = extract_bearer(headers)?;
        self.refresh_tokens.revoke(&token).await?;
        Ok(())
    }

    /// Checks an `ApiKey` credential against the configured service key
    #[instrument(skip(self, headers, expected_key))]
    pub fn authenticate_service_key<H>(&self, headers: &H, expected_key: &str) -> Result<(), AuthError>
    where
        H: CredentialSource + ?Sized,
    {
        let key = extract_api_key(headers)?;
        if expected_key.is_empty() || !keys_match(&key, expected_key) {
            warn!("Service key rejected");
            return Err(AuthError::InvalidServiceKey);
        }
        Ok(())
    }
}

/// Compares every byte regardless of where the first difference is
fn keys_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}
