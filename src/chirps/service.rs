use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    models::ChirpModel,
    repository::ChirpRepository,
    types::{ChirpResponse, SortOrder},
};
use crate::shared::AppError;

pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

/// Replaces whole space-separated profane words, ignoring case
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Service for chirp business logic
pub struct ChirpService {
    repository: Arc<dyn ChirpRepository + Send + Sync>,
}

impl ChirpService {
    pub fn new(repository: Arc<dyn ChirpRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, body))]
    pub async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<ChirpResponse, AppError> {
        if body.chars().count() > MAX_CHIRP_LENGTH {
            warn!(user_id = %user_id, "Chirp rejected for length");
            return Err(AppError::BadRequest("Chirp is too long".to_string()));
        }

        let chirp = ChirpModel::new(clean_body(body), user_id);
        self.repository.create_chirp(&chirp).await?;

        info!(chirp_id = %chirp.id, user_id = %user_id, "Chirp created");
        Ok(chirp.into())
    }

    #[instrument(skip(self))]
    pub async fn list_chirps(
        &self,
        author_id: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Vec<ChirpResponse>, AppError> {
        let author_id = author_id
            .filter(|id| !id.is_empty())
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| AppError::BadRequest("Invalid author ID".to_string()))?;
        let sort = sort
            .and_then(|s| SortOrder::from_str(s).ok())
            .unwrap_or_default();

        let mut chirps = self.repository.list_chirps(author_id).await?;
        if sort == SortOrder::Desc {
            chirps.reverse();
        }

        Ok(chirps.into_iter().map(ChirpResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_chirp(&self, chirp_id: &str) -> Result<ChirpResponse, AppError> {
        let id = parse_chirp_id(chirp_id)?;
        self.repository
            .get_chirp(id)
            .await?
            .map(ChirpResponse::from)
            .ok_or_else(|| AppError::NotFound("No chirp found with provided ID".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete_chirp(&self, chirp_id: &str, user_id: Uuid) -> Result<(), AppError> {
        let id = parse_chirp_id(chirp_id)?;
        let chirp = self
            .repository
            .get_chirp(id)
            .await?
            .ok_or_else(|| AppError::NotFound("No chirp found with provided ID".to_string()))?;

        if chirp.user_id != user_id {
            warn!(chirp_id = %id, user_id = %user_id, "Delete attempted by non-author");
            return Err(AppError::Forbidden("User didn't create chirp".to_string()));
        }

        if !self.repository.delete_chirp(id, user_id).await? {
            return Err(AppError::NotFound("No chirp found with provided ID".to_string()));
        }

        info!(chirp_id = %id, "Chirp deleted");
        Ok(())
    }
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid chirp ID".to_string()))
}
