use thiserror::Error;

use crate::meal::MealError;
use crate::random::RandomSourceError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BattleError {
    #[error("Combatant list is full, cannot add more combatants.")]
    Capacity,

    #[error("Two combatants must be prepped for a battle.")]
    InsufficientCombatants,

    #[error(transparent)]
    RandomSource(#[from] RandomSourceError),

    #[error(transparent)]
    Catalog(#[from] MealError),
}
