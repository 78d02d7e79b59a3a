use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MealError {
    /// Absent or soft-deleted; the message says which
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl MealError {
    pub fn id_not_found(id: i64) -> Self {
        MealError::NotFound(format!("Meal with ID {} not found", id))
    }

    pub fn id_deleted(id: i64) -> Self {
        MealError::NotFound(format!("Meal with ID {} has been deleted", id))
    }

    pub fn name_not_found(name: &str) -> Self {
        MealError::NotFound(format!("Meal with name {} not found", name))
    }

    pub fn name_deleted(name: &str) -> Self {
        MealError::NotFound(format!("Meal with name {} has been deleted", name))
    }
}
