use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::ChirpModel;
use crate::shared::StorageError;

/// Trait for chirp repository operations
#[async_trait]
pub trait ChirpRepository {
    async fn create_chirp(&self, chirp: &ChirpModel) -> Result<(), StorageError>;
    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpModel>, StorageError>;
    /// Oldest first, optionally restricted to one author
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<ChirpModel>, StorageError>;
    /// Deletes only when `user_id` is the author. Returns false otherwise.
    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool, StorageError>;
}

/// In-memory implementation of ChirpRepository for development and testing
pub struct InMemoryChirpRepository {
    chirps: Mutex<HashMap<Uuid, ChirpModel>>,
}

impl Default for InMemoryChirpRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChirpRepository {
    pub fn new() -> Self {
        Self {
            chirps: Mutex::new(HashMap::new()),
        }
    }

    pub fn chirp_count(&self) -> usize {
        self.lock().map(|chirps| chirps.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, ChirpModel>>, StorageError> {
        self.chirps
            .lock()
            .map_err(|_| StorageError::Database("chirp store poisoned".to_string()))
    }
}

#[async_trait]
impl ChirpRepository for InMemoryChirpRepository {
    #[instrument(skip(self, chirp))]
    async fn create_chirp(&self, chirp: &ChirpModel) -> Result<(), StorageError> {
        debug!(chirp_id = %chirp.id, user_id = %chirp.user_id, "Creating chirp in memory");
        self.lock()?.insert(chirp.id, chirp.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpModel>, StorageError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<ChirpModel>, StorageError> {
        let mut chirps: Vec<ChirpModel> = self
            .lock()?
            .values()
            .filter(|chirp| author_id.map_or(true, |author| chirp.user_id == author))
            .cloned()
            .collect();
        chirps.sort_by_key(|chirp| chirp.created_at);

        Ok(chirps)
    }

    #[instrument(skip(self))]
    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool, StorageError> {
        let mut chirps = self.lock()?;
        match chirps.get(&id) {
            Some(chirp) if chirp.user_id == user_id => {
                chirps.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// PostgreSQL implementation of chirp repository
pub struct PostgresChirpRepository {
    pool: PgPool,
}

impl PostgresChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: PgRow) -> ChirpModel {
        ChirpModel {
            id: row.get("id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            body: row.get("body"),
            user_id: row.get("user_id"),
        }
    }
}

#[async_trait]
impl ChirpRepository for PostgresChirpRepository {
    #[instrument(skip(self, chirp))]
    async fn create_chirp(&self, chirp: &ChirpModel) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO chirps (id, created_at, updated_at, body, user_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(chirp.id)
        .bind(chirp.created_at)
        .bind(chirp.updated_at)
        .bind(&chirp.body)
        .bind(chirp.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create chirp in database");
            StorageError::from(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_chirp(&self, id: Uuid) -> Result<Option<ChirpModel>, StorageError> {
        let row = sqlx::query(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, chirp_id = %id, "Failed to fetch chirp from database");
            StorageError::from(e)
        })?;

        Ok(row.map(Self::from_row))
    }

    #[instrument(skip(self))]
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<ChirpModel>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, created_at, updated_at, body, user_id FROM chirps WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list chirps from database");
            StorageError::from(e)
        })?;

        Ok(rows.into_iter().map(Self::from_row).collect())
    }

    #[instrument(skip(self))]
    async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, chirp_id = %id, "Failed to delete chirp from database");
                StorageError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn chirp_at(user_id: Uuid, body: &str, minutes_ago: i64) -> ChirpModel {
        let mut chirp = ChirpModel::new(body.to_string(), user_id);
        chirp.created_at = Utc::now() - Duration::minutes(minutes_ago);
        chirp
    }

    #[tokio::test]
    async fn test_create_and_get_chirp() {
        let repo = InMemoryChirpRepository::new();
        let chirp = ChirpModel::new("hello".to_string(), Uuid::new_v4());
        repo.create_chirp(&chirp).await.unwrap();

        let found = repo.get_chirp(chirp.id).await.unwrap().unwrap();
        assert_eq!(found.body, "hello");
        assert!(repo.get_chirp(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_oldest_first_and_filters_author() {
        let repo = InMemoryChirpRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.create_chirp(&chirp_at(alice, "second", 5)).await.unwrap();
        repo.create_chirp(&chirp_at(bob, "first", 10)).await.unwrap();
        repo.create_chirp(&chirp_at(alice, "third", 1)).await.unwrap();

        let all: Vec<String> = repo
            .list_chirps(None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.body)
            .collect();
        assert_eq!(all, vec!["first", "second", "third"]);

        let alices = repo.list_chirps(Some(alice)).await.unwrap();
        assert_eq!(alices.len(), 2);
        assert!(alices.iter().all(|c| c.user_id == alice));
    }

    #[tokio::test]
    async fn test_delete_requires_author() {
        let repo = InMemoryChirpRepository::new();
        let author = Uuid::new_v4();
        let chirp = ChirpModel::new("mine".to_string(), author);
        repo.create_chirp(&chirp).await.unwrap();

        assert!(!repo.delete_chirp(chirp.id, Uuid::new_v4()).await.unwrap());
        assert_eq!(repo.chirp_count(), 1);
        assert!(repo.delete_chirp(chirp.id, author).await.unwrap());
        assert_eq!(repo.chirp_count(), 0);
    }
}
