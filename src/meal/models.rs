use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::MealError;

/// How hard a meal is to prepare. Stored and displayed as `LOW`, `MED`, `HIGH`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Difficulty {
    #[strum(serialize = "LOW")]
    #[serde(rename = "LOW")]
    Low,
    #[strum(serialize = "MED")]
    #[serde(rename = "MED")]
    Med,
    #[strum(serialize = "HIGH")]
    #[serde(rename = "HIGH")]
    High,
}

impl Difficulty {
    pub fn parse(value: &str) -> Result<Self, MealError> {
        value.parse().map_err(|_| {
            MealError::Validation(format!(
                "Invalid difficulty level: {}. Must be 'LOW', 'MED', or 'HIGH'.",
                value
            ))
        })
    }

    /// Points subtracted from a meal's battle score.
    pub fn modifier(self) -> f64 {
        match self {
            Difficulty::Low => 1.0,
            Difficulty::Med => 2.0,
            Difficulty::High => 3.0,
        }
    }
}

/// A catalog entry as fetched from a repository. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub deleted: bool,
}

/// Input for creating a catalog entry; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
}

impl NewMeal {
    pub fn new(name: &str, cuisine: &str, price: f64, difficulty: Difficulty) -> Self {
        Self {
            name: name.to_string(),
            cuisine: cuisine.to_string(),
            price,
            difficulty,
        }
    }

    pub fn validate(&self) -> Result<(), MealError> {
        if self.name.trim().is_empty() {
            return Err(MealError::Validation(
                "Meal name cannot be empty".to_string(),
            ));
        }

        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(MealError::Validation(format!(
                "Invalid price: {}. Price must be a positive number.",
                self.price
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BattleOutcome {
    Win,
    Loss,
}

impl BattleOutcome {
    pub fn parse(value: &str) -> Result<Self, MealError> {
        value.parse().map_err(|_| {
            MealError::Validation(format!(
                "Invalid result: {}. Expected 'win' or 'loss'.",
                value
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum LeaderboardSort {
    #[default]
    #[strum(serialize = "wins")]
    Wins,
    #[strum(serialize = "win_pct")]
    WinPct,
}

impl LeaderboardSort {
    pub fn parse(value: &str) -> Result<Self, MealError> {
        value
            .parse()
            .map_err(|_| MealError::Validation(format!("Invalid sort_by parameter: {}", value)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub price: f64,
    pub difficulty: Difficulty,
    pub battles: i64,
    pub wins: i64,
    /// Percentage, rounded to one decimal place
    pub win_pct: f64,
}

/// wins / battles * 100, rounded to one decimal place. Zero battles yields 0.
pub fn win_percentage(wins: i64, battles: i64) -> f64 {
    if battles <= 0 {
        return 0.0;
    }
    let pct = wins as f64 / battles as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

impl LeaderboardEntry {
    /// Unrounded wins / battles; zero battles yields 0
    pub fn win_ratio(&self) -> f64 {
        if self.battles <= 0 {
            return 0.0;
        }
        self.wins as f64 / self.battles as f64
    }
}

/// Orders entries best-first, breaking ties by ascending id.
///
/// Percentage ordering compares the unrounded ratio; `win_pct` is for display.
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry], sort: LeaderboardSort) {
    match sort {
        LeaderboardSort::Wins => entries.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.id.cmp(&b.id))),
        LeaderboardSort::WinPct => entries.sort_by(|a, b| {
            b.win_ratio()
                .total_cmp(&a.win_ratio())
                .then(a.id.cmp(&b.id))
        }),
    }
}
