//! Ledger and dividend properties.

use proptest::prelude::*;
use venue_core::governance::pay_dividends;
use venue_core::ledger::{
    accrue_tax, add_fixed_asset, net_worth, take_loan, tick_depreciation, tick_loans,
    weekly_payment,
};
use venue_state::{Investor, InvestorKind, WeekEvent, WorldState};

#[test]
fn test_loan_amortizes_to_zero_over_term() {
    let mut world = WorldState {
        cash: 1_000_000.0,
        ..Default::default()
    };
    take_loan(&mut world, 100_000.0, 0.10, 52, "Bank");
    let scheduled = weekly_payment(100_000.0, 0.10, 52);

    let mut paid = 0.0;
    let mut principal = 0.0;
    for week in 0..52 {
        world.week = week;
        let tick = tick_loans(&mut world);
        paid += tick.payment;
        principal += tick.principal;
        assert!(tick.events.iter().all(|e| !matches!(e, WeekEvent::LoanShortPaid { .. })));
    }

    assert!(world.loans.is_empty(), "Loan should settle on its final payment");
    assert!((principal - 100_000.0).abs() < 0.01);
    assert!((paid - scheduled * 52.0).abs() < 0.01);
    assert!((world.cash - (1_100_000.0 - paid)).abs() < 1e-6);
}

#[test]
fn test_short_payment_never_overdraws() {
    let mut world = WorldState::default();
    take_loan(&mut world, 50_000.0, 0.12, 26, "Bank");
    world.cash = 100.0;

    let tick = tick_loans(&mut world);
    assert_eq!(world.cash, 0.0);
    assert_eq!(tick.payment, 100.0);
    assert!(matches!(tick.events[0], WeekEvent::LoanShortPaid { .. }));

    // Interest not covered is added to the balance.
    let interest = 50_000.0 * 0.12 / 52.0;
    assert!((world.loans[0].balance - (50_000.0 + interest - 100.0)).abs() < 1e-6);
}

#[test]
fn test_depreciation_moves_value_not_worth() {
    let mut world = WorldState {
        cash: 10_000.0,
        ..Default::default()
    };
    add_fixed_asset(&mut world, "Fit-out", 26_000.0, 260);
    let before = net_worth(&world);
    let (dep, _) = tick_depreciation(&mut world);
    assert!((dep - 100.0).abs() < 1e-9);
    assert!((net_worth(&world) - (before - 100.0)).abs() < 1e-9);
}

fn partner(id: &str, equity: f64) -> Investor {
    Investor {
        id: id.to_string(),
        kind: InvestorKind::Silent,
        equity,
        cash_in: 50_000.0,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn prop_tax_accrual_never_decreases(profits in prop::collection::vec(-50_000.0f64..50_000.0, 1..40)) {
        let mut world = WorldState::default();
        let mut last = world.tax_accrued;
        for profit in profits {
            let tax = accrue_tax(&mut world, profit);
            prop_assert!(tax >= 0.0);
            prop_assert!(world.tax_accrued >= last);
            last = world.tax_accrued;
        }
    }

    #[test]
    fn prop_dividends_capped_by_cash(
        cash in 0.0f64..500_000.0,
        net in -20_000.0f64..200_000.0,
        ratio in 0.0f64..0.8,
        equities in prop::collection::vec(0.01f64..0.3, 1..4),
        pref_accrued in 0.0f64..20_000.0,
    ) {
        let mut world = WorldState {
            cash,
            payout_ratio: ratio,
            ..Default::default()
        };
        for (i, equity) in equities.iter().enumerate() {
            world.investors.push(partner(&format!("inv_{i:04}"), *equity));
        }
        world.investors.push(Investor {
            id: "inv_pref".into(),
            kind: InvestorKind::Preferred,
            equity: 0.05,
            cash_in: 80_000.0,
            pref_rate: Some(0.08),
            pref_accrued,
            ..Default::default()
        });

        let out = pay_dividends(&mut world, net);
        prop_assert!(out.paid >= 0.0);
        prop_assert!(out.paid <= cash * 0.35 + 1e-6);
        prop_assert!(out.paid <= net.max(0.0) * ratio + 1e-6);
        prop_assert!(world.cash >= -1e-6);
        prop_assert!((world.cash - (cash - out.paid)).abs() < 1e-6);
    }
}
