//! Passive income: fixed-timestep accounting, split-interval
//! equivalence, pause/stop semantics.

use idle_core::{
    engine::GameEngine,
    event::EconomyEvent,
    ledger::PlayerEconomy,
    scheduler::{IncomeScheduler, TICK_MS},
    snapshot::{HoldingSnapshot, PlayerSnapshot},
};

const PLAYER: &str = "worker";

/// Engine with one restored player producing `workshops` per second
/// (workshop income is 1.0 flat).
fn engine_with_rate(workshops: u32) -> GameEngine {
    let mut engine = GameEngine::build(7);
    engine
        .load_snapshot(PlayerSnapshot {
            player_id: PLAYER.to_string(),
            economy: PlayerEconomy::default(),
            holdings: vec![HoldingSnapshot {
                upgrade_id: "workshop".to_string(),
                count: workshops,
            }],
            achievements: Default::default(),
        })
        .unwrap();
    engine
}

fn balance(engine: &GameEngine) -> f64 {
    engine.economy(PLAYER).unwrap().balance
}

#[test]
fn one_second_grants_ten_ticks_of_a_tenth_each() {
    let mut scheduler = IncomeScheduler::new();
    assert_eq!(scheduler.ticks_per_second(), 10.0);
    assert_eq!(scheduler.advance(1_000), 10);
    assert_eq!(scheduler.credit_per_tick(50.0), 5.0);
}

#[test]
fn split_intervals_never_lose_or_double_count_ticks() {
    let mut whole = IncomeScheduler::new();
    let mut split = IncomeScheduler::new();

    let whole_ticks = whole.advance(1_000);

    let mut split_ticks = 0;
    for elapsed in [333, 333, 333, 1] {
        split_ticks += split.advance(elapsed);
    }
    assert_eq!(whole_ticks, split_ticks);

    // Sub-tick reports accumulate without loss.
    let mut dribble = IncomeScheduler::new();
    let mut ticks = 0;
    for _ in 0..100 {
        ticks += dribble.advance(10);
    }
    assert_eq!(ticks, 10);
}

#[test]
fn fractional_remainder_carries_across_calls() {
    let mut scheduler = IncomeScheduler::new();
    assert_eq!(scheduler.advance(TICK_MS - 1), 0);
    assert_eq!(scheduler.advance(1), 1);
    assert_eq!(scheduler.advance(250), 2);
    assert_eq!(scheduler.advance(50), 1); // 50 carried + 50
}

#[test]
fn engine_credits_rate_per_second() {
    let mut engine = engine_with_rate(50);
    assert_eq!(engine.passive_income_rate(PLAYER), 50.0);

    engine.tick(1_000).unwrap();
    assert!((balance(&engine) - 50.0).abs() < 1e-9);

    // One consolidated grant event for the interval.
    let events = engine.drain_events();
    let grants: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            EconomyEvent::PassiveIncomeGranted { amount, ticks, .. } => Some((*amount, *ticks)),
            _ => None,
        })
        .collect();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].1, 10);
    assert!((grants[0].0 - 50.0).abs() < 1e-9);
}

#[test]
fn engine_split_ticks_match_one_big_tick() {
    let mut whole = engine_with_rate(50);
    let mut split = engine_with_rate(50);

    whole.tick(1_000).unwrap();
    for _ in 0..10 {
        split.tick(100).unwrap();
    }
    assert!((balance(&whole) - balance(&split)).abs() < 1e-9);
}

#[test]
fn pause_ignores_elapsed_time_entirely() {
    let mut engine = engine_with_rate(50);

    engine.pause_income();
    engine.tick(5_000).unwrap();
    assert_eq!(balance(&engine), 0.0);
    assert!(engine.drain_events().is_empty());

    // No banked catch-up after resume.
    engine.resume_income();
    engine.tick(100).unwrap();
    assert!((balance(&engine) - 5.0).abs() < 1e-9);
}

#[test]
fn stop_discards_the_fractional_accumulator() {
    let mut engine = engine_with_rate(50);

    engine.tick(50).unwrap(); // half a tick banked
    engine.stop_income();
    engine.resume_income();

    engine.tick(50).unwrap(); // would complete the tick had it survived
    assert_eq!(balance(&engine), 0.0);

    engine.tick(50).unwrap();
    engine.tick(50).unwrap();
    assert!((balance(&engine) - 5.0).abs() < 1e-9);
}

#[test]
fn zero_rate_grants_nothing() {
    let mut engine = GameEngine::build(7);
    // Known player with no holdings.
    engine.click(PLAYER, 0).unwrap();
    engine.drain_events();

    engine.tick(10_000).unwrap();
    assert_eq!(balance(&engine), 1.0); // the click only
    assert!(engine.drain_events().is_empty());
}
