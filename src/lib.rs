// Library crate for the meal battle game
// This file exposes the public API for integration tests

pub mod battle;
pub mod config;
pub mod meal;
pub mod random;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use battle::{BattleArena, BattleError};
pub use config::AppConfig;
pub use meal::{MealError, MealRecord, MealRepository};
pub use random::{RandomSource, RandomSourceError};
pub use shared::{AppError, AppState};
