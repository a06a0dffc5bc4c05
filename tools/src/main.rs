//! econ-runner: headless session runner for the idle economy core.
//!
//! Drives a seeded engine with two simulated players — an honest one
//! with jittered click timing and a scripted bot clicking on a fixed
//! timer — alongside the passive-income tick loop, then prints a run
//! summary. Doubles as a smoke test and a demo of the public API.
//!
//! Usage:
//!   econ-runner --seed 12345 --seconds 120

use anyhow::Result;
use idle_core::{engine::GameEngine, event::EconomyEvent, format, PurchaseOutcome};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let seconds = parse_arg(&args, "--seconds", 120u64);

    println!("idle economy — econ-runner");
    println!("  seed:    {seed}");
    println!("  seconds: {seconds}");
    println!();

    let mut engine = GameEngine::build(seed);
    // Driver jitter only; game randomness proper lives in idle-core's
    // seeded streams.
    let mut jitter = Pcg64Mcg::seed_from_u64(seed | 1);

    let honest = "player-honest";
    let bot = "player-bot";

    let mut now: u64 = 0;
    let mut next_honest_click = 0u64;
    let mut next_bot_click = 0u64;
    let mut bot_rejections = 0u64;
    let mut items_won = Vec::new();

    // 10 ms simulation step; the engine's scheduler reduces this to
    // its own 100 ms ticks.
    let step_ms = 10u64;
    let end = seconds * 1_000;

    while now < end {
        now += step_ms;
        engine.tick(step_ms)?;

        // Honest player: ~4 clicks/s with 150–400 ms jitter.
        if now >= next_honest_click {
            engine.click(honest, now)?;
            next_honest_click = now + 150 + jitter.gen_range(0..250u64);
        }

        // Scripted bot: metronomic 50 ms clicks.
        if now >= next_bot_click {
            let decision = engine.click(bot, now)?;
            if !decision.allowed {
                bot_rejections += 1;
            }
            next_bot_click = now + 50;
        }

        // Greedy buyer: every simulated second, the honest player
        // buys the most expensive thing it can afford.
        if now % 1_000 == 0 {
            if let Some(upgrade_id) = best_affordable(&engine, honest) {
                let (outcome, item) = engine.purchase(honest, &upgrade_id, now)?;
                if let PurchaseOutcome::Purchased { cost, .. } = outcome {
                    log::info!("{honest} bought {upgrade_id} for {}", format::compact(cost));
                }
                if let Some(item) = item {
                    items_won.push(item);
                }
            }
        }
    }

    print_summary(&mut engine, honest, bot, bot_rejections, &items_won);
    Ok(())
}

/// The costliest upgrade the player can currently afford and unlock.
fn best_affordable(engine: &GameEngine, player_id: &str) -> Option<String> {
    let balance = engine.economy(player_id)?.balance;
    let ledger = engine.ledger(player_id)?;
    engine
        .catalog()
        .iter()
        .filter_map(|def| ledger.holding(&def.upgrade_id))
        .filter(|h| h.unlocked && h.current_cost <= balance)
        .max_by(|a, b| a.current_cost.total_cmp(&b.current_cost))
        .map(|h| h.upgrade_id.clone())
}

fn print_summary(
    engine: &mut GameEngine,
    honest: &str,
    bot: &str,
    bot_rejections: u64,
    items: &[idle_core::items::UniqueItem],
) {
    let events = engine.drain_events();
    let blocks = events
        .iter()
        .filter(|e| matches!(e, EconomyEvent::PlayerBlocked { .. }))
        .count();
    let unlocks = events
        .iter()
        .filter(|e| matches!(e, EconomyEvent::AchievementUnlocked { .. }))
        .count();

    println!("=== RUN SUMMARY ===");
    for player in [honest, bot] {
        let rate = engine.passive_income_rate(player);
        if let Some(economy) = engine.economy(player) {
            println!(
                "  {player}: balance={} earned={} clicks={} purchases={} rate={}/s",
                format::compact(economy.balance),
                format::compact(economy.lifetime_earned),
                economy.lifetime_clicks,
                economy.lifetime_purchases,
                format::compact(rate),
            );
        }
    }
    println!("  bot rejections:   {bot_rejections}");
    println!("  blocks issued:    {blocks}");
    println!("  achievements:     {unlocks}");
    println!("  unique items:     {}", items.len());
    for item in items {
        println!(
            "    #{} {} (rarity {:.1}, x{:.2})",
            item.serial, item.name, item.rarity, item.bonus_multiplier
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
