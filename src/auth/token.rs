use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::errors::TokenError;
use super::types::AccessClaims;

/// Issuer stamped into every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Longest lifetime an access token may be issued with
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Clamps a requested access-token lifetime to the ceiling.
///
/// No request, zero, or a negative value means the ceiling.
pub fn clamp_ttl(requested_seconds: Option<i64>) -> Duration {
    let seconds = match requested_seconds {
        Some(s) if s > 0 && s <= MAX_ACCESS_TOKEN_TTL_SECONDS => s,
        _ => MAX_ACCESS_TOKEN_TTL_SECONDS,
    };
    Duration::seconds(seconds)
}

/// Stateless HS256 codec for access tokens
#[derive(Clone)]
pub struct AccessTokenCodec {
    secret: String,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

impl AccessTokenCodec {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Signs a token asserting `user_id`, valid from now for `ttl`
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        debug!(exp_timestamp = claims.exp, "Issuing access token");

        encode(
            &Header::new(SIGNING_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode access token");
            TokenError::Signing(e.to_string())
        })
    }

    /// Verifies signature, algorithm and expiry, then returns the subject
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let algorithm = Self::peek_algorithm(token)?;
        if algorithm != "HS256" {
            debug!(algorithm = %algorithm, "Rejecting token with unexpected algorithm");
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to decode access token");
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAlgorithm => {
                    TokenError::UnsupportedAlgorithm("unknown".to_string())
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::MalformedSubject)
    }

    /// Reads the `alg` field before any signature work is done, so a token
    /// declaring another method (including `none`) never reaches the verifier.
    fn peek_algorithm(token: &str) -> Result<String, TokenError> {
        let mut segments = token.split('.');
        let header_segment = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(_), Some(_), None) => header,
            _ => return Err(TokenError::Malformed("expected three segments".to_string())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(header_segment)
            .map_err(|e| TokenError::Malformed(format!("header encoding: {}", e)))?;
        let header: RawHeader = serde_json::from_slice(&bytes)
            .map_err(|e| TokenError::Malformed(format!("header json: {}", e)))?;

        Ok(header.alg)
    }
}
