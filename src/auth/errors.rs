use thiserror::Error;

use crate::shared::StorageError;

/// Failures while reading a credential off the `Authorization` header
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("authorization header is missing")]
    Missing,

    #[error("authorization header is malformed")]
    Malformed,
}

/// Failures while issuing or verifying an access token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token has expired")]
    Expired,

    #[error("token subject is not a valid user id")]
    MalformedSubject,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Failures while issuing, resolving or revoking a refresh token
#[derive(Error, Debug)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token has been revoked")]
    Revoked,

    #[error("refresh token has expired")]
    Expired,

    #[error("failed to generate refresh token: {0}")]
    Generation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The password hashing primitive failed or was handed a malformed digest
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("hashing error: {0}")]
pub struct HashingError(pub String);

/// Everything the authentication service can report to its caller
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately the same case.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("unauthorized: {0}")]
    Unauthorized(#[source] TokenError),

    #[error("failed to issue access token: {0}")]
    TokenIssue(#[source] TokenError),

    #[error(transparent)]
    RefreshToken(#[from] RefreshTokenError),

    #[error("service key does not match")]
    InvalidServiceKey,

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
