use std::sync::Arc;

use meal_max::{
    meal::{Difficulty, MealRecord, MealRepository, NewMeal},
    AppState, BattleArena,
};

use super::mocks::{RecordingMealRepository, ScriptedRandomSource};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub repository: RecordingMealRepository,
    pub random_source: ScriptedRandomSource,
    pub state: AppState,
    pub meals: Vec<MealRecord>,
}

impl TestSetup {
    pub fn arena(&self) -> BattleArena {
        self.state.new_arena()
    }

    pub fn meal(&self, name: &str) -> MealRecord {
        self.meals
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("meal {name} was not seeded"))
    }
}

pub struct TestSetupBuilder {
    meals: Vec<NewMeal>,
    draws: Vec<f64>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            meals: vec![],
            draws: vec![],
        }
    }

    pub fn with_meal(
        mut self,
        name: &str,
        cuisine: &str,
        price: f64,
        difficulty: Difficulty,
    ) -> Self {
        self.meals.push(NewMeal::new(name, cuisine, price, difficulty));
        self
    }

    /// sushi (japanese, 3.95, MED) and pizza (italian, 24.95, LOW)
    pub fn with_sushi_and_pizza(self) -> Self {
        self.with_meal("sushi", "japanese", 3.95, Difficulty::Med)
            .with_meal("pizza", "italian", 24.95, Difficulty::Low)
    }

    pub fn with_draws(mut self, draws: &[f64]) -> Self {
        self.draws.extend_from_slice(draws);
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = RecordingMealRepository::new();
        let random_source = ScriptedRandomSource::with_draws(&self.draws);

        let mut meals = Vec::new();
        for meal in &self.meals {
            meals.push(repository.create_meal(meal).await.unwrap());
        }

        let state = AppState::new(
            Arc::new(repository.clone()),
            Arc::new(random_source.clone()),
        );

        TestSetup {
            repository,
            random_source,
            state,
            meals,
        }
    }
}
