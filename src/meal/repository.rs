use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::models::{
    sort_leaderboard, win_percentage, BattleOutcome, Difficulty, LeaderboardEntry, LeaderboardSort,
    MealRecord, NewMeal,
};
use super::MealError;

/// Catalog store for meals and their battle statistics.
///
/// Every lookup treats soft-deleted meals as absent.
#[async_trait]
pub trait MealRepository: Send + Sync {
    async fn create_meal(&self, meal: &NewMeal) -> Result<MealRecord, MealError>;
    async fn clear_meals(&self) -> Result<(), MealError>;
    async fn delete_meal(&self, meal_id: i64) -> Result<(), MealError>;
    async fn get_meal_by_id(&self, meal_id: i64) -> Result<MealRecord, MealError>;
    async fn get_meal_by_name(&self, name: &str) -> Result<MealRecord, MealError>;

    /// Atomically bumps the battle count, and the win count for a win
    async fn record_outcome(&self, meal_id: i64, outcome: BattleOutcome) -> Result<(), MealError>;

    /// Non-deleted meals that have fought at least once, best first
    async fn leaderboard(&self, sort: LeaderboardSort) -> Result<Vec<LeaderboardEntry>, MealError>;
}

#[derive(Debug, Clone)]
struct StoredMeal {
    record: MealRecord,
    battles: i64,
    wins: i64,
}

#[derive(Debug)]
struct MealTable {
    meals: BTreeMap<i64, StoredMeal>,
    next_id: i64,
}

impl Default for MealTable {
    fn default() -> Self {
        Self {
            meals: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl MealTable {
    fn active(&self, meal_id: i64) -> Result<&StoredMeal, MealError> {
        match self.meals.get(&meal_id) {
            None => Err(MealError::id_not_found(meal_id)),
            Some(stored) if stored.record.deleted => Err(MealError::id_deleted(meal_id)),
            Some(stored) => Ok(stored),
        }
    }

    fn active_mut(&mut self, meal_id: i64) -> Result<&mut StoredMeal, MealError> {
        match self.meals.get_mut(&meal_id) {
            None => Err(MealError::id_not_found(meal_id)),
            Some(stored) if stored.record.deleted => Err(MealError::id_deleted(meal_id)),
            Some(stored) => Ok(stored),
        }
    }
}

/// In-memory implementation of MealRepository for development and testing
///
/// Data lives only as long as the repository does.
#[derive(Debug, Default)]
pub struct InMemoryMealRepository {
    table: Mutex<MealTable>,
}

impl InMemoryMealRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored meals, soft-deleted ones included
    pub fn meal_count(&self) -> usize {
        self.table().map(|t| t.meals.len()).unwrap_or_default()
    }

    /// Current (battles, wins) for a meal, soft-deleted ones included
    pub fn stats_for(&self, meal_id: i64) -> Option<(i64, i64)> {
        let table = self.table().ok()?;
        table.meals.get(&meal_id).map(|m| (m.battles, m.wins))
    }

    fn table(&self) -> Result<MutexGuard<'_, MealTable>, MealError> {
        self.table
            .lock()
            .map_err(|_| MealError::Database("meal table lock poisoned".to_string()))
    }
}

#[async_trait]
impl MealRepository for InMemoryMealRepository {
    #[instrument(skip(self, meal), fields(name = %meal.name))]
    async fn create_meal(&self, meal: &NewMeal) -> Result<MealRecord, MealError> {
        meal.validate()?;

        let mut table = self.table()?;
        let taken = table
            .meals
            .values()
            .any(|m| !m.record.deleted && m.record.name == meal.name);
        if taken {
            warn!(name = %meal.name, "Meal name already taken in memory");
            return Err(MealError::Duplicate(format!(
                "Meal with name '{}' already exists",
                meal.name
            )));
        }

        let id = table.next_id;
        table.next_id += 1;

        let record = MealRecord {
            id,
            name: meal.name.clone(),
            cuisine: meal.cuisine.clone(),
            price: meal.price,
            difficulty: meal.difficulty,
            deleted: false,
        };
        table.meals.insert(
            id,
            StoredMeal {
                record: record.clone(),
                battles: 0,
                wins: 0,
            },
        );

        info!(meal_id = id, name = %record.name, "Meal created in memory");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn clear_meals(&self) -> Result<(), MealError> {
        let mut table = self.table()?;
        *table = MealTable::default();
        info!("All meals cleared from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_meal(&self, meal_id: i64) -> Result<(), MealError> {
        let mut table = self.table()?;
        let stored = table.active_mut(meal_id)?;
        stored.record.deleted = true;
        info!(meal_id, "Meal soft-deleted in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_meal_by_id(&self, meal_id: i64) -> Result<MealRecord, MealError> {
        let table = self.table()?;
        let record = table.active(meal_id)?.record.clone();
        debug!(meal_id, name = %record.name, "Meal found in memory");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn get_meal_by_name(&self, name: &str) -> Result<MealRecord, MealError> {
        let table = self.table()?;
        // A deleted meal may share its name with a live one
        let mut saw_deleted = false;
        for stored in table.meals.values().filter(|m| m.record.name == name) {
            if !stored.record.deleted {
                debug!(meal_id = stored.record.id, name = %name, "Meal found in memory");
                return Ok(stored.record.clone());
            }
            saw_deleted = true;
        }

        if saw_deleted {
            Err(MealError::name_deleted(name))
        } else {
            Err(MealError::name_not_found(name))
        }
    }

    #[instrument(skip(self))]
    async fn record_outcome(&self, meal_id: i64, outcome: BattleOutcome) -> Result<(), MealError> {
        let mut table = self.table()?;
        let stored = table.active_mut(meal_id)?;
        stored.battles += 1;
        if outcome == BattleOutcome::Win {
            stored.wins += 1;
        }
        debug!(
            meal_id,
            %outcome,
            battles = stored.battles,
            wins = stored.wins,
            "Battle outcome recorded in memory"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, sort: LeaderboardSort) -> Result<Vec<LeaderboardEntry>, MealError> {
        let table = self.table()?;
        let mut entries: Vec<LeaderboardEntry> = table
            .meals
            .values()
            .filter(|m| !m.record.deleted && m.battles > 0)
            .map(|m| leaderboard_entry(m.record.clone(), m.battles, m.wins))
            .collect();

        sort_leaderboard(&mut entries, sort);
        debug!(entries = entries.len(), %sort, "Leaderboard built from memory");
        Ok(entries)
    }
}

/// PostgreSQL implementation of MealRepository
///
/// Expects the `meals` table to exist:
///
/// ```sql
/// CREATE TABLE meals (
///     id BIGSERIAL PRIMARY KEY,
///     meal TEXT NOT NULL,
///     cuisine TEXT NOT NULL,
///     price DOUBLE PRECISION NOT NULL CHECK (price > 0),
///     difficulty TEXT NOT NULL CHECK (difficulty IN ('LOW', 'MED', 'HIGH')),
///     battles BIGINT NOT NULL DEFAULT 0,
///     wins BIGINT NOT NULL DEFAULT 0,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// CREATE UNIQUE INDEX meals_active_name ON meals (meal) WHERE NOT deleted;
/// ```
///
/// Row mapping and leaderboard ordering are unit-tested; the queries
/// themselves need a live database and are exercised by manual runs.
pub struct PostgresMealRepository {
    pool: PgPool,
}

impl PostgresMealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes a missing id from a soft-deleted one after a no-op update
    async fn missing_meal_error(&self, meal_id: i64) -> MealError {
        let row = sqlx::query("SELECT deleted FROM meals WHERE id = $1")
            .bind(meal_id)
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(Some(row)) if row.get::<bool, _>("deleted") => MealError::id_deleted(meal_id),
            Ok(_) => MealError::id_not_found(meal_id),
            Err(e) => database_error(e),
        }
    }
}

fn database_error(e: sqlx::Error) -> MealError {
    warn!(error = %e, "Meal query failed");
    MealError::Database(e.to_string())
}

fn meal_from_row(row: &PgRow) -> Result<MealRecord, MealError> {
    let difficulty: String = row.get("difficulty");
    meal_record(
        row.get("id"),
        row.get("meal"),
        row.get("cuisine"),
        row.get("price"),
        &difficulty,
        row.get("deleted"),
    )
}

/// Builds a record from column values; difficulty is stored as text
fn meal_record(
    id: i64,
    name: String,
    cuisine: String,
    price: f64,
    difficulty: &str,
    deleted: bool,
) -> Result<MealRecord, MealError> {
    Ok(MealRecord {
        id,
        name,
        cuisine,
        price,
        difficulty: Difficulty::parse(difficulty)?,
        deleted,
    })
}

fn leaderboard_entry(record: MealRecord, battles: i64, wins: i64) -> LeaderboardEntry {
    LeaderboardEntry {
        id: record.id,
        name: record.name,
        cuisine: record.cuisine,
        price: record.price,
        difficulty: record.difficulty,
        battles,
        wins,
        win_pct: win_percentage(wins, battles),
    }
}

/// SQL ordering for a leaderboard sort, ties broken by ascending id.
///
/// Ranks on the unrounded ratio, matching `sort_leaderboard`.
fn leaderboard_order_clause(sort: LeaderboardSort) -> &'static str {
    match sort {
        LeaderboardSort::Wins => "wins DESC, id ASC",
        LeaderboardSort::WinPct => "(wins::float8 / battles) DESC, id ASC",
    }
}

#[async_trait]
impl MealRepository for PostgresMealRepository {
    #[instrument(skip(self, meal), fields(name = %meal.name))]
    async fn create_meal(&self, meal: &NewMeal) -> Result<MealRecord, MealError> {
        meal.validate()?;

        let row = sqlx::query(
            "INSERT INTO meals (meal, cuisine, price, difficulty) VALUES ($1, $2, $3, $4) \
             RETURNING id, meal, cuisine, price, difficulty, deleted",
        )
        .bind(&meal.name)
        .bind(&meal.cuisine)
        .bind(meal.price)
        .bind(meal.difficulty.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                warn!(name = %meal.name, "Meal name already taken in database");
                MealError::Duplicate(format!("Meal with name '{}' already exists", meal.name))
            }
            other => database_error(other),
        })?;

        let record = meal_from_row(&row)?;
        info!(meal_id = record.id, name = %record.name, "Meal created in database");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn clear_meals(&self) -> Result<(), MealError> {
        sqlx::query("TRUNCATE TABLE meals RESTART IDENTITY")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        info!("All meals cleared from database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_meal(&self, meal_id: i64) -> Result<(), MealError> {
        let result = sqlx::query("UPDATE meals SET deleted = TRUE WHERE id = $1 AND NOT deleted")
            .bind(meal_id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(self.missing_meal_error(meal_id).await);
        }

        info!(meal_id, "Meal soft-deleted in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_meal_by_id(&self, meal_id: i64) -> Result<MealRecord, MealError> {
        let row = sqlx::query(
            "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals WHERE id = $1",
        )
        .bind(meal_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or_else(|| MealError::id_not_found(meal_id))?;

        let record = meal_from_row(&row)?;
        if record.deleted {
            debug!(meal_id, "Meal is soft-deleted in database");
            return Err(MealError::id_deleted(meal_id));
        }

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn get_meal_by_name(&self, name: &str) -> Result<MealRecord, MealError> {
        // Live rows sort first so a deleted namesake never shadows one
        let row = sqlx::query(
            "SELECT id, meal, cuisine, price, difficulty, deleted FROM meals \
             WHERE meal = $1 ORDER BY deleted ASC, id DESC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .ok_or_else(|| MealError::name_not_found(name))?;

        let record = meal_from_row(&row)?;
        if record.deleted {
            debug!(name = %name, "Meal is soft-deleted in database");
            return Err(MealError::name_deleted(name));
        }

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn record_outcome(&self, meal_id: i64, outcome: BattleOutcome) -> Result<(), MealError> {
        let win_increment: i64 = match outcome {
            BattleOutcome::Win => 1,
            BattleOutcome::Loss => 0,
        };

        let result = sqlx::query(
            "UPDATE meals SET battles = battles + 1, wins = wins + $2 \
             WHERE id = $1 AND NOT deleted",
        )
        .bind(meal_id)
        .bind(win_increment)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(self.missing_meal_error(meal_id).await);
        }

        debug!(meal_id, %outcome, "Battle outcome recorded in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, sort: LeaderboardSort) -> Result<Vec<LeaderboardEntry>, MealError> {
        let query = format!(
            "SELECT id, meal, cuisine, price, difficulty, deleted, battles, wins FROM meals \
             WHERE NOT deleted AND battles > 0 ORDER BY {}",
            leaderboard_order_clause(sort)
        );

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let record = meal_from_row(&row)?;
            entries.push(leaderboard_entry(record, row.get("battles"), row.get("wins")));
        }

        debug!(entries = entries.len(), %sort, "Leaderboard fetched from database");
        Ok(entries)
    }
}
