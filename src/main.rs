use meal_max::{
    meal::{Difficulty, LeaderboardSort, MealRepository, NewMeal},
    AppConfig, AppError, AppState,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sample menu for runs without a database
const SAMPLE_MENU: &[(&str, &str, f64, Difficulty)] = &[
    ("sushi", "japanese", 3.95, Difficulty::Med),
    ("pizza", "italian", 24.95, Difficulty::Low),
    ("steak", "american", 33.3, Difficulty::Med),
    ("salmon", "norwegian", 27.3, Difficulty::Low),
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meal_max=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(in_memory = config.database_url.is_none(), "Starting meal battle");

    let state = AppState::from_config(&config).await?;

    if config.database_url.is_none() {
        for (name, cuisine, price, difficulty) in SAMPLE_MENU {
            state
                .meal_repository
                .create_meal(&NewMeal::new(name, cuisine, *price, *difficulty))
                .await?;
        }
    }

    // Usage: meal-max <first meal> <second meal>
    let mut args = std::env::args().skip(1);
    let (first, second) = match (args.next(), args.next()) {
        (Some(first), Some(second)) => (first, second),
        _ => ("sushi".to_string(), "pizza".to_string()),
    };

    let mut arena = state.new_arena();
    arena.stage_by_name(&first).await?;
    arena.stage_by_name(&second).await?;

    match arena.resolve().await {
        Ok(winner) => info!(winner = %winner.name, cuisine = %winner.cuisine, "Battle finished"),
        Err(e) => {
            warn!(error = %e, "Battle could not be resolved");
            return Err(e.into());
        }
    }

    for (rank, entry) in state
        .meal_repository
        .leaderboard(LeaderboardSort::Wins)
        .await?
        .iter()
        .enumerate()
    {
        info!(
            rank = rank + 1,
            meal = %entry.name,
            wins = entry.wins,
            battles = entry.battles,
            win_pct = %format!("{:.1}", entry.win_pct),
            "Leaderboard"
        );
    }

    Ok(())
}
