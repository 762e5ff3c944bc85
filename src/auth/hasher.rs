use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::warn;

use super::errors::HashingError;

/// Fixed salt used only to burn an equivalent amount of CPU when there is no
/// stored digest to compare against.
const EQUALIZER_SALT: &str = "Y2hpcnB5LWVxdWFsaXplcg";

/// Salted one-way password hashing with Argon2id
///
/// The parameter set is fixed for the lifetime of the hasher; digests are PHC
/// strings so they carry their own parameters and salt.
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    /// Hasher with the recommended Argon2id parameters (19 MiB, 2 passes, 1 lane)
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// Hasher with explicit memory/time/parallelism costs
    pub fn with_costs(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashingError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HashingError(format!("invalid hashing parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes the plaintext with a freshly generated random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let mut salt_bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut salt_bytes).map_err(|e| {
            warn!(error = %e, "Failed to gather salt entropy");
            HashingError(format!("salt generation failed: {}", e))
        })?;

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| HashingError(format!("salt encoding failed: {}", e)))?;

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| {
                warn!(error = %e, "Password hashing failed");
                HashingError(e.to_string())
            })
    }

    /// Checks a plaintext against a stored digest.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable digest is an error. The
    /// final comparison inside argon2 is constant time.
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| HashingError(format!("malformed digest: {}", e)))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(ArgonError::Password) => Ok(false),
            Err(e) => Err(HashingError(e.to_string())),
        }
    }

    /// Performs one hash computation and throws the result away.
    ///
    /// Used on the unknown-user login path so it costs the same as a verify.
    pub fn equalize(&self, plaintext: &str) {
        if let Ok(salt) = SaltString::from_b64(EQUALIZER_SALT) {
            let _ = self.argon2.hash_password(plaintext.as_bytes(), &salt);
        }
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new()
    }
}
