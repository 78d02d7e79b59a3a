use crate::meal::MealRecord;

/// Battle score: price times cuisine length, less the difficulty modifier.
pub fn score(meal: &MealRecord) -> f64 {
    let cuisine_len = meal.cuisine.chars().count() as f64;
    meal.price * cuisine_len - meal.difficulty.modifier()
}

/// Chance that the first combatant wins, given both scores.
///
/// The relative score gap is squashed through a logistic curve, so the
/// result is 0.5 for equal scores. A zero score sum counts as no gap.
pub fn win_probability(score_a: f64, score_b: f64) -> f64 {
    let total = score_a + score_b;
    let delta = if total == 0.0 {
        0.0
    } else {
        (score_a - score_b).abs() / total
    };
    1.0 / (1.0 + (-delta).exp())
}
