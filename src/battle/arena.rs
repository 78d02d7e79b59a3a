use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{score, win_probability, BattleError};
use crate::meal::{BattleOutcome, MealRecord, MealRepository};
use crate::random::RandomSource;

/// Combatants a single battle consumes
pub const MAX_COMBATANTS: usize = 2;

/// Staging area for two meals and the randomized battle between them.
///
/// The arena owns its combatant list; collaborators are injected at
/// construction. Mutation goes through `&mut self`, so sharing one arena
/// across tasks needs an outer lock.
pub struct BattleArena {
    combatants: Vec<MealRecord>,
    repository: Arc<dyn MealRepository>,
    random_source: Arc<dyn RandomSource>,
}

impl BattleArena {
    pub fn new(repository: Arc<dyn MealRepository>, random_source: Arc<dyn RandomSource>) -> Self {
        Self {
            combatants: Vec::with_capacity(MAX_COMBATANTS),
            repository,
            random_source,
        }
    }

    /// Adds a combatant, failing once two are staged
    #[instrument(skip(self, meal), fields(meal_id = meal.id, name = %meal.name))]
    pub fn stage(&mut self, meal: MealRecord) -> Result<(), BattleError> {
        if self.is_full() {
            warn!("Combatant list is full");
            return Err(BattleError::Capacity);
        }

        self.combatants.push(meal);
        debug!(staged = self.combatants.len(), "Combatant staged");
        Ok(())
    }

    /// Looks a meal up by name and stages it
    pub async fn stage_by_name(&mut self, name: &str) -> Result<MealRecord, BattleError> {
        if self.is_full() {
            return Err(BattleError::Capacity);
        }
        let meal = self.repository.get_meal_by_name(name).await?;
        self.stage(meal.clone())?;
        Ok(meal)
    }

    /// Looks a meal up by id and stages it
    pub async fn stage_by_id(&mut self, meal_id: i64) -> Result<MealRecord, BattleError> {
        if self.is_full() {
            return Err(BattleError::Capacity);
        }
        let meal = self.repository.get_meal_by_id(meal_id).await?;
        self.stage(meal.clone())?;
        Ok(meal)
    }

    /// Staged combatants in staging order
    pub fn combatants(&self) -> &[MealRecord] {
        &self.combatants
    }

    pub fn clear(&mut self) {
        debug!(cleared = self.combatants.len(), "Clearing combatants");
        self.combatants.clear();
    }

    fn is_full(&self) -> bool {
        self.combatants.len() >= MAX_COMBATANTS
    }

    /// Fights the two staged combatants and returns the winner.
    ///
    /// Outcomes are persisted before the loser leaves the arena. If either
    /// write fails the staged list is left as it was; a win already written
    /// for the winner is not undone.
    #[instrument(skip(self))]
    pub async fn resolve(&mut self) -> Result<MealRecord, BattleError> {
        if self.combatants.len() != MAX_COMBATANTS {
            warn!(staged = self.combatants.len(), "Battle needs two combatants");
            return Err(BattleError::InsufficientCombatants);
        }

        let score_a = score(&self.combatants[0]);
        let score_b = score(&self.combatants[1]);
        let threshold = win_probability(score_a, score_b);

        let draw = self.random_source.random_fraction().await?;

        let (winner_idx, loser_idx) = if draw < threshold { (0, 1) } else { (1, 0) };
        let winner = self.combatants[winner_idx].clone();
        let loser_id = self.combatants[loser_idx].id;

        debug!(
            score_a,
            score_b,
            threshold,
            draw,
            winner_id = winner.id,
            loser_id,
            "Battle decided"
        );

        self.repository.record_outcome(winner.id, BattleOutcome::Win).await?;
        self.repository.record_outcome(loser_id, BattleOutcome::Loss).await?;

        self.combatants.remove(loser_idx);

        info!(winner_id = winner.id, winner = %winner.name, "Battle won");
        Ok(winner)
    }
}
