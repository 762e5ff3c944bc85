use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::errors::CredentialError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// A credential read off the `Authorization` header, alive for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

/// Anything that can hand over the raw `Authorization` header value.
///
/// `Ok(None)` means the header is absent; a value that is present but not
/// readable as text is `Malformed`.
pub trait CredentialSource {
    fn authorization(&self) -> Result<Option<&str>, CredentialError>;
}

impl CredentialSource for HeaderMap {
    fn authorization(&self) -> Result<Option<&str>, CredentialError> {
        match self.get(AUTHORIZATION) {
            Some(value) => value
                .to_str()
                .map(Some)
                .map_err(|_| CredentialError::Malformed),
            None => Ok(None),
        }
    }
}

impl CredentialSource for Option<&str> {
    fn authorization(&self) -> Result<Option<&str>, CredentialError> {
        Ok(*self)
    }
}

impl CredentialSource for str {
    fn authorization(&self) -> Result<Option<&str>, CredentialError> {
        Ok(Some(self))
    }
}

/// Parses an `Authorization` value into either scheme.
///
/// An empty value counts as no header at all.
pub fn parse_authorization(value: Option<&str>) -> Result<Credential, CredentialError> {
    let value = value
        .filter(|value| !value.is_empty())
        .ok_or(CredentialError::Missing)?;

    if let Some(rest) = value.strip_prefix(BEARER_PREFIX) {
        return non_blank(rest).map(Credential::Bearer);
    }
    if let Some(rest) = value.strip_prefix(API_KEY_PREFIX) {
        return non_blank(rest).map(Credential::ApiKey);
    }

    Err(CredentialError::Malformed)
}

/// Reads a `Bearer <token>` credential
pub fn extract_bearer<S>(headers: &S) -> Result<String, CredentialError>
where
    S: CredentialSource + ?Sized,
{
    match parse_authorization(headers.authorization()?)? {
        Credential::Bearer(token) => Ok(token),
        Credential::ApiKey(_) => Err(CredentialError::Malformed),
    }
}

/// Reads an `ApiKey <key>` credential
pub fn extract_api_key<S>(headers: &S) -> Result<String, CredentialError>
where
    S: CredentialSource + ?Sized,
{
    match parse_authorization(headers.authorization()?)? {
        Credential::ApiKey(key) => Ok(key),
        Credential::Bearer(_) => Err(CredentialError::Malformed),
    }
}

fn non_blank(rest: &str) -> Result<String, CredentialError> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::Malformed);
    }
    Ok(trimmed.to_string())
}
