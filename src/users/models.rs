use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

impl UserModel {
    /// Creates a new user with a generated id and timestamps
    pub fn new(email: String, hashed_password: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email,
            hashed_password,
            is_chirpy_red: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_model() {
        let user = UserModel::new("a@b.com".to_string(), "$argon2id$digest".to_string());

        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.created_at, user.updated_at);
        assert!(!user.is_chirpy_red);
    }

    #[test]
    fn test_digest_never_serialized() {
        let user = UserModel::new("a@b.com".to_string(), "$argon2id$digest".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("hashed_password"));
    }
}
