mod errors;
pub mod models;
pub mod repository;

pub use errors::MealError;
pub use models::*;
pub use repository::{InMemoryMealRepository, MealRepository, PostgresMealRepository};
