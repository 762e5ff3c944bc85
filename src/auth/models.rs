use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Days a refresh token stays usable after issue
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 60;

/// Database model for the refresh_tokens table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshTokenModel {
    pub token: String, // 64 lowercase hex chars
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Where a refresh token sits in its lifecycle at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

impl RefreshTokenModel {
    /// Creates an active record that expires after the standard lifetime
    pub fn new(token: String, user_id: Uuid) -> Self {
        let now = Utc::now();

        Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(REFRESH_TOKEN_LIFETIME_DAYS),
            revoked_at: None,
        }
    }

    /// Revocation wins over expiry; both are terminal.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now > self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// Stamps `revoked_at` unless it is already set
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if self.revoked_at.is_none() {
            self.revoked_at = Some(now);
            self.updated_at = now;
        }
    }
}
