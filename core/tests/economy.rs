//! Ledger invariants: exponential scaling, non-negative balance,
//! all-or-nothing purchases, composite gating.

use idle_core::{
    catalog::UpgradeCatalog,
    error::EconomyError,
    ledger::{EconomyLedger, PurchaseOutcome},
};

fn funded_ledger(catalog: &UpgradeCatalog, balance: f64) -> EconomyLedger {
    let mut ledger = EconomyLedger::new(catalog);
    ledger.credit(balance).unwrap();
    ledger
}

#[test]
fn cost_scales_geometrically_and_strictly_increases() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 1_000_000.0);

    let base_cost = catalog.get("auto_clicker").unwrap().base_cost;
    let ratio = catalog.get("auto_clicker").unwrap().cost_ratio;

    let mut prev_cost = 0.0;
    for n in 0..20u32 {
        let cost_now = ledger.holding("auto_clicker").unwrap().current_cost;
        let expected = base_cost * ratio.powi(n as i32);
        assert!(
            (cost_now - expected).abs() < 1e-6 * expected,
            "cost at count {n}: expected {expected}, got {cost_now}"
        );
        assert!(cost_now > prev_cost, "cost must strictly increase");
        prev_cost = cost_now;

        let outcome = ledger.purchase(&catalog, "auto_clicker").unwrap();
        assert!(outcome.is_purchased());
    }
    assert_eq!(ledger.holding("auto_clicker").unwrap().count, 20);
    assert_eq!(ledger.economy.lifetime_purchases, 20);
}

#[test]
fn balance_never_negative() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 100.0);

    ledger.debit(40.0).unwrap();
    ledger.debit(40.0).unwrap();
    ledger.debit(40.0).unwrap(); // would go negative; clamps
    assert_eq!(ledger.economy.balance, 0.0);

    // Clamped debit does not touch lifetime earnings.
    assert_eq!(ledger.economy.lifetime_earned, 100.0);

    ledger.credit(5.0).unwrap();
    ledger.debit(1_000.0).unwrap();
    assert_eq!(ledger.economy.balance, 0.0);
}

#[test]
fn credit_and_debit_reject_invalid_amounts() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = EconomyLedger::new(&catalog);

    for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(matches!(
            ledger.credit(bad),
            Err(EconomyError::InvalidAmount { .. })
        ));
        assert!(matches!(
            ledger.debit(bad),
            Err(EconomyError::InvalidAmount { .. })
        ));
    }
    assert_eq!(ledger.economy.balance, 0.0);
    assert_eq!(ledger.economy.lifetime_earned, 0.0);
}

#[test]
fn insufficient_funds_leaves_state_unchanged() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 10.0); // auto_clicker costs 15

    let before_economy = ledger.economy.clone();
    let before_count = ledger.holding("auto_clicker").unwrap().count;

    let outcome = ledger.purchase(&catalog, "auto_clicker").unwrap();
    assert!(matches!(outcome, PurchaseOutcome::InsufficientFunds { .. }));

    assert_eq!(ledger.economy, before_economy, "no partial debit");
    assert_eq!(ledger.holding("auto_clicker").unwrap().count, before_count);
}

#[test]
fn unknown_upgrade_is_a_policy_rejection() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 1_000.0);
    let outcome = ledger.purchase(&catalog, "does_not_exist").unwrap();
    assert_eq!(outcome, PurchaseOutcome::UnknownUpgrade);
}

#[test]
fn composite_upgrade_locked_until_requirements_met() {
    let catalog = UpgradeCatalog::standard();
    // assembly_line needs forge >= 10 and foundry >= 1.
    let mut ledger = funded_ledger(&catalog, 1e9);

    let outcome = ledger.purchase(&catalog, "assembly_line").unwrap();
    assert_eq!(outcome, PurchaseOutcome::RequirementsNotMet);

    for _ in 0..10 {
        assert!(ledger.purchase(&catalog, "forge").unwrap().is_purchased());
    }
    // Still one prerequisite short.
    assert_eq!(
        ledger.purchase(&catalog, "assembly_line").unwrap(),
        PurchaseOutcome::RequirementsNotMet
    );

    assert!(ledger.purchase(&catalog, "foundry").unwrap().is_purchased());
    assert!(ledger
        .purchase(&catalog, "assembly_line")
        .unwrap()
        .is_purchased());
}

#[test]
fn requirements_are_evaluated_fresh_each_attempt() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 1e9);

    for _ in 0..10 {
        ledger.purchase(&catalog, "forge").unwrap();
    }
    ledger.purchase(&catalog, "foundry").unwrap();

    let def = catalog.get("assembly_line").unwrap();
    assert!(ledger.requirements_satisfied(def));

    // Re-evaluation reflects the roster as it is now; satisfying once
    // is not a permanent unlock.
    ledger
        .restore_holdings(&catalog, vec![("forge".to_string(), 3u32)])
        .unwrap();
    assert!(!ledger.requirements_satisfied(def));
    assert_eq!(
        ledger.purchase(&catalog, "assembly_line").unwrap(),
        PurchaseOutcome::RequirementsNotMet
    );
}

#[test]
fn passive_rate_sums_income_per_unit_times_count() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = funded_ledger(&catalog, 1e6);

    assert_eq!(ledger.passive_income_rate(), 0.0);

    // workshop: base income 1.0, income_ratio 1.0
    for _ in 0..3 {
        ledger.purchase(&catalog, "workshop").unwrap();
    }
    assert!((ledger.passive_income_rate() - 3.0).abs() < 1e-9);

    // forge: base income 8.0
    ledger.purchase(&catalog, "forge").unwrap();
    assert!((ledger.passive_income_rate() - 11.0).abs() < 1e-9);
}

#[test]
fn manual_action_bumps_click_counter() {
    let catalog = UpgradeCatalog::standard();
    let mut ledger = EconomyLedger::new(&catalog);
    for _ in 0..5 {
        ledger.credit_manual_action(0.1).unwrap();
    }
    assert_eq!(ledger.economy.lifetime_clicks, 5);
    assert!((ledger.economy.balance - 0.5).abs() < 1e-12);
    assert!((ledger.economy.lifetime_earned - 0.5).abs() < 1e-12);
}
