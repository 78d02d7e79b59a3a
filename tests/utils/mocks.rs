use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use meal_max::meal::{
    BattleOutcome, InMemoryMealRepository, LeaderboardEntry, LeaderboardSort, MealError,
    MealRecord, MealRepository, NewMeal,
};
use meal_max::random::{RandomSource, RandomSourceError};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Hands out queued draws in order, then fails as unavailable
#[derive(Clone, Default)]
pub struct ScriptedRandomSource {
    draws: Arc<Mutex<VecDeque<Result<f64, RandomSourceError>>>>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedRandomSource {
    pub fn with_draws(draws: &[f64]) -> Self {
        let source = Self::default();
        for draw in draws {
            source.push(Ok(*draw));
        }
        source
    }

    pub fn push(&self, draw: Result<f64, RandomSourceError>) {
        self.draws.lock().unwrap().push_back(draw);
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RandomSource for ScriptedRandomSource {
    async fn random_fraction(&self) -> Result<f64, RandomSourceError> {
        *self.calls.lock().unwrap() += 1;
        self.draws.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(RandomSourceError::SourceUnavailable(
                "no scripted draws left".to_string(),
            ))
        })
    }
}

/// In-memory catalog that remembers every recorded outcome
#[derive(Clone, Default)]
pub struct RecordingMealRepository {
    inner: Arc<InMemoryMealRepository>,
    outcomes: Arc<Mutex<Vec<(i64, BattleOutcome)>>>,
}

impl RecordingMealRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<(i64, BattleOutcome)> {
        self.outcomes.lock().unwrap().clone()
    }

    pub fn stats_for(&self, meal_id: i64) -> Option<(i64, i64)> {
        self.inner.stats_for(meal_id)
    }
}

#[async_trait]
impl MealRepository for RecordingMealRepository {
    async fn create_meal(&self, meal: &NewMeal) -> Result<MealRecord, MealError> {
        self.inner.create_meal(meal).await
    }

    async fn clear_meals(&self) -> Result<(), MealError> {
        self.inner.clear_meals().await
    }

    async fn delete_meal(&self, meal_id: i64) -> Result<(), MealError> {
        self.inner.delete_meal(meal_id).await
    }

    async fn get_meal_by_id(&self, meal_id: i64) -> Result<MealRecord, MealError> {
        self.inner.get_meal_by_id(meal_id).await
    }

    async fn get_meal_by_name(&self, name: &str) -> Result<MealRecord, MealError> {
        self.inner.get_meal_by_name(name).await
    }

    async fn record_outcome(&self, meal_id: i64, outcome: BattleOutcome) -> Result<(), MealError> {
        self.outcomes.lock().unwrap().push((meal_id, outcome));
        self.inner.record_outcome(meal_id, outcome).await
    }

    async fn leaderboard(&self, sort: LeaderboardSort) -> Result<Vec<LeaderboardEntry>, MealError> {
        self.inner.leaderboard(sort).await
    }
}
