mod utils;
use utils::TestSetupBuilder;

use meal_max::{
    battle::{score, win_probability},
    meal::{BattleOutcome, Difficulty, LeaderboardSort, MealRepository},
    BattleError, MealError, RandomSourceError,
};

#[tokio::test]
async fn battle_records_one_win_and_one_loss() {
    let setup = TestSetupBuilder::new()
        .with_sushi_and_pizza()
        .with_draws(&[0.39])
        .build()
        .await;
    let sushi = setup.meal("sushi");
    let pizza = setup.meal("pizza");

    let mut arena = setup.arena();
    arena.stage_by_name("sushi").await.unwrap();
    arena.stage_by_name("pizza").await.unwrap();

    let winner = arena.resolve().await.expect("battle should resolve");

    assert_eq!(winner, sushi);
    assert_eq!(arena.combatants(), &[sushi.clone()]);
    assert_eq!(
        setup.repository.outcomes(),
        vec![(sushi.id, BattleOutcome::Win), (pizza.id, BattleOutcome::Loss)]
    );
    assert_eq!(setup.random_source.calls(), 1);
}

#[tokio::test]
async fn winner_stays_to_face_the_next_challenger() {
    let setup = TestSetupBuilder::new()
        .with_sushi_and_pizza()
        .with_meal("steak", "american", 33.3, Difficulty::Med)
        .with_draws(&[0.99, 0.1])
        .build()
        .await;
    let pizza = setup.meal("pizza");
    let steak = setup.meal("steak");

    let mut arena = setup.arena();
    arena.stage_by_name("sushi").await.unwrap();
    arena.stage_by_name("pizza").await.unwrap();
    assert_eq!(arena.resolve().await.unwrap(), pizza);

    // pizza is now combatant 0, so a low draw keeps it on top
    arena.stage_by_name("steak").await.unwrap();
    assert_eq!(arena.combatants(), &[pizza.clone(), steak.clone()]);
    assert_eq!(arena.resolve().await.unwrap(), pizza);

    assert_eq!(setup.repository.stats_for(pizza.id), Some((2, 2)));
    assert_eq!(setup.repository.stats_for(steak.id), Some((1, 0)));

    let leaderboard = setup
        .state
        .meal_repository
        .leaderboard(LeaderboardSort::Wins)
        .await
        .unwrap();
    assert_eq!(leaderboard[0].id, pizza.id);
    assert_eq!(leaderboard[0].wins, 2);
    assert!((leaderboard[0].win_pct - 100.0).abs() < 1e-9);
    assert_eq!(leaderboard.len(), 3);
}

#[tokio::test]
async fn threshold_splits_the_two_branches() {
    let setup = TestSetupBuilder::new().with_sushi_and_pizza().build().await;
    let sushi = setup.meal("sushi");
    let pizza = setup.meal("pizza");
    let threshold = win_probability(score(&sushi), score(&pizza));

    setup.random_source.push(Ok(threshold - 1e-6));
    setup.random_source.push(Ok(threshold));

    let mut arena = setup.arena();
    arena.stage(sushi.clone()).unwrap();
    arena.stage(pizza.clone()).unwrap();
    assert_eq!(arena.resolve().await.unwrap(), sushi);

    arena.clear();
    arena.stage(sushi.clone()).unwrap();
    arena.stage(pizza.clone()).unwrap();
    assert_eq!(arena.resolve().await.unwrap(), pizza);
}

#[tokio::test]
async fn stage_fails_on_third_call_until_cleared() {
    let setup = TestSetupBuilder::new().with_sushi_and_pizza().build().await;
    let mut arena = setup.arena();

    arena.stage_by_name("sushi").await.unwrap();
    arena.stage_by_name("pizza").await.unwrap();
    assert_eq!(
        arena.stage(setup.meal("sushi")).unwrap_err(),
        BattleError::Capacity
    );

    arena.clear();
    assert!(arena.combatants().is_empty());
    arena.stage(setup.meal("sushi")).unwrap();
    assert_eq!(arena.combatants().len(), 1);
}

#[tokio::test]
async fn resolve_with_one_combatant_touches_nothing() {
    let setup = TestSetupBuilder::new()
        .with_sushi_and_pizza()
        .with_draws(&[0.5])
        .build()
        .await;
    let mut arena = setup.arena();
    arena.stage_by_name("sushi").await.unwrap();

    assert_eq!(
        arena.resolve().await.unwrap_err(),
        BattleError::InsufficientCombatants
    );
    assert_eq!(setup.random_source.calls(), 0);
    assert!(setup.repository.outcomes().is_empty());
}

#[tokio::test]
async fn malformed_draw_surfaces_verbatim() {
    let setup = TestSetupBuilder::new().with_sushi_and_pizza().build().await;
    let malformed = RandomSourceError::MalformedResponse("invalid_response".to_string());
    setup.random_source.push(Err(malformed.clone()));

    let mut arena = setup.arena();
    arena.stage_by_name("sushi").await.unwrap();
    arena.stage_by_name("pizza").await.unwrap();

    let err = arena.resolve().await.unwrap_err();
    assert_eq!(err, BattleError::RandomSource(malformed));
    assert_eq!(
        err.to_string(),
        "Invalid response from random.org: invalid_response"
    );
    assert_eq!(arena.combatants().len(), 2);
    assert!(setup.repository.outcomes().is_empty());
}

#[tokio::test]
async fn meal_deleted_while_staged_fails_the_battle() {
    let setup = TestSetupBuilder::new()
        .with_sushi_and_pizza()
        .with_draws(&[0.99])
        .build()
        .await;
    let sushi = setup.meal("sushi");
    let pizza = setup.meal("pizza");

    let mut arena = setup.arena();
    arena.stage_by_id(sushi.id).await.unwrap();
    arena.stage_by_id(pizza.id).await.unwrap();
    setup.state.meal_repository.delete_meal(pizza.id).await.unwrap();

    // pizza wins the draw but its record can no longer be updated
    let err = arena.resolve().await.unwrap_err();
    assert_eq!(
        err,
        BattleError::Catalog(MealError::NotFound(
            "Meal with ID 2 has been deleted".to_string()
        ))
    );
    assert_eq!(arena.combatants(), &[sushi.clone(), pizza.clone()]);
    assert_eq!(setup.repository.stats_for(sushi.id), Some((0, 0)));
}

#[tokio::test]
async fn deleted_meals_cannot_be_staged() {
    let setup = TestSetupBuilder::new().with_sushi_and_pizza().build().await;
    let sushi = setup.meal("sushi");
    setup.state.meal_repository.delete_meal(sushi.id).await.unwrap();

    let mut arena = setup.arena();
    assert!(matches!(
        arena.stage_by_name("sushi").await,
        Err(BattleError::Catalog(MealError::NotFound(_)))
    ));
    assert!(matches!(
        arena.stage_by_id(sushi.id).await,
        Err(BattleError::Catalog(MealError::NotFound(_)))
    ));
    assert!(arena.combatants().is_empty());
}
