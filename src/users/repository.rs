use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::UserModel;
use crate::shared::StorageError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    async fn create_user(&self, user: &UserModel) -> Result<(), StorageError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, StorageError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, StorageError>;
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserModel>, StorageError>;
    /// Returns false when no such user exists
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StorageError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|users| users.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserModel>>, StorageError> {
        self.users
            .lock()
            .map_err(|_| StorageError::Database("user store poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), StorageError> {
        debug!(user_id = %user.id, "Creating user in memory");

        let mut users = self.lock()?;
        if users.values().any(|existing| existing.email == user.email) {
            warn!(user_id = %user.id, "Email already registered in memory");
            return Err(StorageError::Conflict("email already registered".to_string()));
        }
        users.insert(user.id, user.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, StorageError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    #[instrument(skip(self, email))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, StorageError> {
        let users = self.lock()?;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    #[instrument(skip(self, email, hashed_password))]
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserModel>, StorageError> {
        let mut users = self.lock()?;
        if users
            .values()
            .any(|existing| existing.id != id && existing.email == email)
        {
            return Err(StorageError::Conflict("email already registered".to_string()));
        }

        let Some(user) = users.get_mut(&id) else {
            debug!(user_id = %id, "User not found for update in memory");
            return Ok(None);
        };
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    #[instrument(skip(self))]
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut users = self.lock()?;
        match users.get_mut(&id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: PgRow) -> UserModel {
        UserModel {
            id: row.get("id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            email: row.get("email"),
            hashed_password: row.get("hashed_password"),
            is_chirpy_red: row.get("is_chirpy_red"),
        }
    }
}

const USER_COLUMNS: &str = "id, created_at, updated_at, email, hashed_password, is_chirpy_red";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<(), StorageError> {
        debug!(user_id = %user.id, "Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, created_at, updated_at, email, hashed_password, is_chirpy_red) VALUES ($1, $2, $3, $4, $5, $6)"
        )
        .bind(user.id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.is_chirpy_red)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create user in database");
            StorageError::from(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> Result<Option<UserModel>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = %id, "Failed to fetch user from database");
                StorageError::from(e)
            })?;

        Ok(row.map(Self::from_row))
    }

    #[instrument(skip(self, email))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserModel>, StorageError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch user by email from database");
                StorageError::from(e)
            })?;

        Ok(row.map(Self::from_row))
    }

    #[instrument(skip(self, email, hashed_password))]
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserModel>, StorageError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET email = $2, hashed_password = $3, updated_at = $4 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %id, "Failed to update user in database");
            StorageError::from(e)
        })?;

        Ok(row.map(Self::from_row))
    }

    #[instrument(skip(self))]
    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<bool, StorageError> {
        let result =
            sqlx::query("UPDATE users SET is_chirpy_red = TRUE, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, user_id = %id, "Failed to upgrade user in database");
                    StorageError::from(e)
                })?;

        Ok(result.rows_affected() > 0)
    }
}
