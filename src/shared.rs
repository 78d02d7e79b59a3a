use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::battle::{BattleArena, BattleError};
use crate::config::{AppConfig, RandomSourceKind};
use crate::meal::{InMemoryMealRepository, MealError, MealRepository, PostgresMealRepository};
use crate::random::{LocalRandomSource, RandomOrgSource, RandomSource, RandomSourceError};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub meal_repository: Arc<dyn MealRepository>,
    pub random_source: Arc<dyn RandomSource>,
}

impl AppState {
    pub fn new(
        meal_repository: Arc<dyn MealRepository>,
        random_source: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            meal_repository,
            random_source,
        }
    }

    /// Wires collaborators as the configuration asks
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let meal_repository: Arc<dyn MealRepository> = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(url)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!("Using PostgreSQL meal catalog");
                Arc::new(PostgresMealRepository::new(pool))
            }
            None => {
                info!("Using in-memory meal catalog");
                Arc::new(InMemoryMealRepository::new())
            }
        };

        let random_source: Arc<dyn RandomSource> = match config.random_source {
            RandomSourceKind::Remote => Arc::new(RandomOrgSource::new(
                &config.random_org_url,
                config.random_timeout,
            )?),
            RandomSourceKind::Local => Arc::new(LocalRandomSource::new()),
        };
        info!(random_source = %config.random_source, "Random source ready");

        Ok(Self::new(meal_repository, random_source))
    }

    /// A fresh arena, one per game session
    pub fn new_arena(&self) -> BattleArena {
        BattleArena::new(self.meal_repository.clone(), self.random_source.clone())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Meal(#[from] MealError),

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error(transparent)]
    RandomSource(#[from] RandomSourceError),
}
