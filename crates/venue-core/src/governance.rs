//! Governance Model
//!
//! Outside investors: offers, dividends, preferred returns, performance
//! pressure and buyouts.
//!
//! Dividends never take more than 35% of the cash on hand. A failed
//! pressure target raises board pressure at most once every four weeks per
//! investor, and sustained pressure can force a reinvest policy to balanced.

use tracing::{info, warn};
use venue_state::{
    generate_investor_id, DividendPolicy, Investor, InvestorKind, PressureStatus, PressureTerms,
    WeekEvent, WorldState,
};

use crate::catalog::city_or_default;
use crate::error::GovernanceError;
use crate::numeric::{clamp, clamp_score};
use crate::valuation::estimate_sale;

/// Constants for partner governance
pub mod governance_constants {
    pub const MAX_OUTSIDE_EQUITY: f64 = 0.95;
    pub const MIN_OFFER_EQUITY: f64 = 0.06;
    pub const MAX_OFFER_EQUITY: f64 = 0.40;
    pub const MAX_PAYOUT_RATIO: f64 = 0.80;
    /// Share of cash a dividend pool may never exceed
    pub const DIVIDEND_CASH_CAP: f64 = 0.35;
    pub const PRESSURE_WINDOW_WEEKS: usize = 4;
    pub const PENALTY_INTERVAL_WEEKS: u32 = 4;
    pub const FAIL_BOARD_PRESSURE: f64 = 6.0;
    pub const FAIL_REPUTATION: f64 = 2.0;
    /// Board pressure at which a reinvest policy is forced to balanced
    pub const FORCED_POLICY_PRESSURE: f64 = 35.0;
    pub const BUYOUT_COST_MULTIPLE: f64 = 1.25;
    pub const SALE_APPROVAL_PREMIUM: f64 = 1.06;
}

use governance_constants::*;

/// An investment on the table this week.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorOffer {
    pub template: &'static str,
    pub name: &'static str,
    pub kind: InvestorKind,
    pub cash: f64,
    pub equity: f64,
    pub pref_rate: Option<f64>,
    pub sale_approval: bool,
    pub capex_approval_over: f64,
    pub expansion_approval: bool,
    pub pressure: PressureTerms,
}

fn offer_templates() -> [InvestorOffer; 3] {
    [
        InvestorOffer {
            template: "silent",
            name: "Silent Investor Group",
            kind: InvestorKind::Silent,
            cash: 150_000.0,
            equity: 0.18,
            pref_rate: None,
            sale_approval: false,
            capex_approval_over: 60_000.0,
            expansion_approval: true,
            pressure: PressureTerms {
                target_weekly_net: 1_200.0,
                deadline_weeks: 10,
            },
        },
        InvestorOffer {
            template: "operator_partner",
            name: "Operator Partner",
            kind: InvestorKind::OperatorPartner,
            cash: 60_000.0,
            equity: 0.10,
            pref_rate: None,
            sale_approval: false,
            capex_approval_over: 30_000.0,
            expansion_approval: false,
            pressure: PressureTerms {
                target_weekly_net: 800.0,
                deadline_weeks: 12,
            },
        },
        InvestorOffer {
            template: "preferred",
            name: "Preferred Equity Fund",
            kind: InvestorKind::Preferred,
            cash: 250_000.0,
            equity: 0.22,
            pref_rate: Some(0.09),
            sale_approval: true,
            capex_approval_over: 40_000.0,
            expansion_approval: true,
            pressure: PressureTerms {
                target_weekly_net: 1_800.0,
                deadline_weeks: 8,
            },
        },
    ]
}

/// This week's offers, adjusted for the home city's risk.
pub fn generate_offers(world: &WorldState) -> Vec<InvestorOffer> {
    let city = city_or_default(&world.home_city);
    let risk = city.critic_harshness * city.rent_index;
    offer_templates()
        .into_iter()
        .map(|mut o| {
            o.equity = clamp(o.equity + (risk - 1.0) * 0.03, MIN_OFFER_EQUITY, MAX_OFFER_EQUITY);
            o.cash = (o.cash * (0.95 + (risk - 1.0) * 0.10)).round();
            o
        })
        .collect()
}

/// Total outside equity, capped.
pub fn total_outside_equity(world: &WorldState) -> f64 {
    let sum: f64 = world.investors.iter().map(|i| i.equity.max(0.0)).sum();
    sum.min(MAX_OUTSIDE_EQUITY)
}

/// Whether any investor holds a veto over selling the group.
pub fn requires_sale_approval(world: &WorldState) -> bool {
    world.investors.iter().any(|i| i.sale_approval)
}

/// Accepts one of this week's offers. Returns the new investor's id.
pub fn accept_offer(world: &mut WorldState, template: &str) -> Result<String, GovernanceError> {
    let offer = generate_offers(world)
        .into_iter()
        .find(|o| o.template == template)
        .ok_or_else(|| GovernanceError::UnknownOffer(template.to_string()))?;

    let held: f64 = world.investors.iter().map(|i| i.equity.max(0.0)).sum();
    let available = (MAX_OUTSIDE_EQUITY - held).max(0.0);
    if offer.equity > available + 1e-9 {
        return Err(GovernanceError::EquityExhausted {
            requested: offer.equity,
            available,
        });
    }

    let id = generate_investor_id(world.next_sequence());
    world.cash += offer.cash;
    world.investors.push(Investor {
        id: id.clone(),
        name: offer.name.to_string(),
        kind: offer.kind,
        equity: offer.equity,
        cash_in: offer.cash,
        pref_rate: offer.pref_rate,
        sale_approval: offer.sale_approval,
        capex_approval_over: Some(offer.capex_approval_over),
        expansion_approval: offer.expansion_approval,
        pressure: Some(offer.pressure.clone()),
        joined_week: world.week,
        ..Default::default()
    });

    let relief = match offer.kind {
        InvestorKind::OperatorPartner => 18.0,
        InvestorKind::Preferred => 6.0,
        InvestorKind::Silent => 0.0,
    };
    world.owner_dependence = clamp_score(world.owner_dependence - relief);

    info!(investor = %id, template, cash = offer.cash, equity = offer.equity, "Investor joined");
    Ok(id)
}

/// Switches dividend policy and resets the payout ratio to its default.
pub fn set_dividend_policy(world: &mut WorldState, policy: DividendPolicy) {
    world.dividend_policy = policy;
    world.payout_ratio = policy.default_ratio();
    info!(policy = %policy, "Dividend policy set");
}

/// Sets the payout ratio, clamped to `[0, MAX_PAYOUT_RATIO]`, and returns it.
pub fn set_payout_ratio(world: &mut WorldState, ratio: f64) -> f64 {
    world.payout_ratio = clamp(ratio, 0.0, MAX_PAYOUT_RATIO);
    world.payout_ratio
}

/// What one week's distribution paid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DividendOutcome {
    /// Total paid, preferred included
    pub paid: f64,
    pub preferred_paid: f64,
    pub events: Vec<WeekEvent>,
}

/// Accrues preferred returns, then pays preferred arrears and pro-rata
/// dividends out of `max(net, 0) × payout ratio`, capped at 35% of cash.
pub fn pay_dividends(world: &mut WorldState, weekly_net: f64) -> DividendOutcome {
    let mut out = DividendOutcome::default();

    for inv in world.investors.iter_mut() {
        if inv.kind == InvestorKind::Preferred {
            if let Some(rate) = inv.pref_rate {
                inv.pref_accrued += inv.cash_in * rate / 52.0;
            }
        }
    }

    let equity_sum: f64 = world.investors.iter().map(|i| i.equity.max(0.0)).sum();
    if equity_sum <= 1e-4 {
        return out;
    }

    let ratio = clamp(world.payout_ratio, 0.0, MAX_PAYOUT_RATIO);
    let mut pool = (weekly_net.max(0.0) * ratio).min((world.cash * DIVIDEND_CASH_CAP).max(0.0));
    if pool <= 1.0 {
        return out;
    }

    for inv in world.investors.iter_mut() {
        if inv.kind != InvestorKind::Preferred || inv.pref_accrued <= 0.5 {
            continue;
        }
        let pay = pool.min(inv.pref_accrued);
        world.cash -= pay;
        inv.paid_out += pay;
        inv.pref_accrued -= pay;
        pool -= pay;
        out.preferred_paid += pay;
        out.events.push(WeekEvent::DividendPaid {
            investor_id: inv.id.clone(),
            amount: pay,
            preferred: true,
        });
        if pool <= 0.0 {
            break;
        }
    }
    out.paid = out.preferred_paid;

    if pool > 1.0 {
        for inv in world.investors.iter_mut() {
            let share = pool * inv.equity.max(0.0) / equity_sum;
            if share <= 0.5 {
                continue;
            }
            let pay = share.min(world.cash.max(0.0));
            world.cash -= pay;
            inv.paid_out += pay;
            out.paid += pay;
            out.events.push(WeekEvent::DividendPaid {
                investor_id: inv.id.clone(),
                amount: pay,
                preferred: false,
            });
        }
    }

    if out.paid > 1.0 {
        info!(paid = out.paid, preferred = out.preferred_paid, "Dividends paid");
    }
    out
}

/// An investor's standing against their pressure terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureReport {
    pub status: PressureStatus,
    /// Weeks until the deadline, negative once past it
    pub weeks_left: Option<i64>,
    pub rolling_net: f64,
    pub target: f64,
}

/// Evaluates an investor's terms against the rolling four-week net.
pub fn pressure_status(world: &WorldState, investor: &Investor) -> PressureReport {
    let rolling_net = world
        .net_history
        .tail_mean(PRESSURE_WINDOW_WEEKS)
        .or(world.last_week_net)
        .unwrap_or(0.0);
    let Some(terms) = &investor.pressure else {
        return PressureReport {
            status: PressureStatus::None,
            weeks_left: None,
            rolling_net,
            target: 0.0,
        };
    };

    let deadline = investor.joined_week as i64 + terms.deadline_weeks as i64;
    let weeks_left = deadline - world.week as i64;
    let on_track = rolling_net >= terms.target_weekly_net;
    let status = match (on_track, weeks_left) {
        (true, _) => PressureStatus::Ok,
        (false, w) if w > 2 => PressureStatus::Warn,
        (false, w) if w >= 0 => PressureStatus::Danger,
        (false, _) => PressureStatus::Failed,
    };
    PressureReport {
        status,
        weeks_left: Some(weeks_left),
        rolling_net,
        target: terms.target_weekly_net,
    }
}

/// Updates investor statuses and applies failed-target penalties.
pub fn tick_governance(world: &mut WorldState, weekly_net: f64) -> Vec<WeekEvent> {
    let mut events = Vec::new();
    if weekly_net > 0.0 {
        world.board_pressure = (world.board_pressure - 1.0).max(0.0);
    }

    let statuses: Vec<PressureStatus> = world
        .investors
        .iter()
        .map(|inv| pressure_status(world, inv).status)
        .collect();
    let week = world.week;

    for (idx, status) in statuses.into_iter().enumerate() {
        let inv = &mut world.investors[idx];
        if inv.status != status {
            info!(investor = %inv.id, from = ?inv.status, to = ?status, "Investor status");
        }
        inv.status = status;
        if status != PressureStatus::Failed {
            continue;
        }
        let due = inv
            .last_penalty_week
            .map_or(true, |last| week.saturating_sub(last) >= PENALTY_INTERVAL_WEEKS);
        if !due {
            continue;
        }

        inv.fail_count += 1;
        inv.last_penalty_week = Some(week);
        let investor_id = inv.id.clone();
        world.board_pressure = clamp_score(world.board_pressure + FAIL_BOARD_PRESSURE);
        world.reputation = clamp_score(world.reputation - FAIL_REPUTATION);
        warn!(
            investor = %investor_id,
            board_pressure = world.board_pressure,
            "Investor profit target missed"
        );
        events.push(WeekEvent::InvestorFailed {
            investor_id,
            board_pressure: world.board_pressure,
        });

        if world.board_pressure >= FORCED_POLICY_PRESSURE
            && world.dividend_policy == DividendPolicy::Reinvest
        {
            set_dividend_policy(world, DividendPolicy::Balanced);
            warn!("Board pressure forced a balanced dividend policy");
            events.push(WeekEvent::PolicyForced {
                from: DividendPolicy::Reinvest.to_string(),
                to: DividendPolicy::Balanced.to_string(),
            });
        }
    }
    events
}

/// Buyout price: the higher of a cost-basis floor and the investor's slice
/// of the sale valuation.
pub fn estimate_buyout(world: &WorldState, investor_id: &str) -> Result<f64, GovernanceError> {
    let inv = world
        .investor(investor_id)
        .ok_or_else(|| GovernanceError::UnknownInvestor(investor_id.to_string()))?;
    let floor = inv.cash_in * BUYOUT_COST_MULTIPLE + inv.pref_accrued.max(0.0);
    let sale = estimate_sale(world).sale_price;
    let premium = if inv.sale_approval {
        SALE_APPROVAL_PREMIUM
    } else {
        1.0
    };
    let market = if sale > 0.0 {
        sale * inv.equity * 0.98 * premium
    } else {
        floor
    };
    Ok(floor.max(market))
}

/// Buys an investor out for cash. Returns the price paid.
pub fn buy_out(world: &mut WorldState, investor_id: &str) -> Result<f64, GovernanceError> {
    let cost = estimate_buyout(world, investor_id)?;
    if world.cash < cost {
        return Err(GovernanceError::InsufficientCash {
            cost,
            cash: world.cash,
        });
    }
    world.cash -= cost;
    world.investors.retain(|i| i.id != investor_id);
    info!(investor = investor_id, cost, "Investor bought out");
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldState {
        WorldState {
            cash: 10_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_offers_follow_city_risk() {
        let mut w = world();
        let perth = generate_offers(&w);
        w.home_city = "paris".into();
        let paris = generate_offers(&w);
        assert_eq!(perth.len(), 3);
        // perth risk 0.9: cash x 0.94
        assert_eq!(perth[0].cash, 141_000.0);
        assert!(paris[0].equity > perth[0].equity);
        assert!(paris.iter().all(|o| (MIN_OFFER_EQUITY..=MAX_OFFER_EQUITY).contains(&o.equity)));
    }

    #[test]
    fn test_accept_offer() {
        let mut w = world();
        let id = accept_offer(&mut w, "operator_partner").unwrap();
        assert_eq!(id, "inv_0001");
        assert_eq!(w.cash, 10_000.0 + 56_400.0);
        assert_eq!(w.owner_dependence, 52.0);
        assert_eq!(w.investors[0].joined_week, 0);
        assert_eq!(
            accept_offer(&mut w, "angel"),
            Err(GovernanceError::UnknownOffer("angel".into()))
        );
    }

    #[test]
    fn test_equity_cap() {
        let mut w = world();
        w.investors.push(Investor {
            id: "inv_0009".into(),
            equity: 0.90,
            ..Default::default()
        });
        assert!(matches!(
            accept_offer(&mut w, "silent"),
            Err(GovernanceError::EquityExhausted { .. })
        ));
        assert_eq!(total_outside_equity(&w), 0.90);
    }

    #[test]
    fn test_preferred_paid_first() {
        let mut w = world();
        w.cash = 100_000.0;
        w.payout_ratio = 0.5;
        w.investors = vec![
            Investor {
                id: "a".into(),
                kind: InvestorKind::Preferred,
                equity: 0.2,
                cash_in: 52_000.0,
                pref_rate: Some(0.10),
                ..Default::default()
            },
            Investor {
                id: "b".into(),
                equity: 0.2,
                ..Default::default()
            },
        ];
        let out = pay_dividends(&mut w, 2_000.0);
        // pool 1000; 100 preferred, 900 split evenly
        assert!((out.preferred_paid - 100.0).abs() < 1e-9);
        assert!((out.paid - 1_000.0).abs() < 1e-9);
        assert!((w.investors[0].paid_out - 550.0).abs() < 1e-9);
        assert!((w.investors[1].paid_out - 450.0).abs() < 1e-9);
        assert!((w.cash - 99_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_accrues_without_pool() {
        let mut w = world();
        w.investors = vec![Investor {
            id: "a".into(),
            kind: InvestorKind::Preferred,
            equity: 0.2,
            cash_in: 52_000.0,
            pref_rate: Some(0.10),
            ..Default::default()
        }];
        let out = pay_dividends(&mut w, -5_000.0);
        assert_eq!(out.paid, 0.0);
        assert!((w.investors[0].pref_accrued - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_dividend_cash_cap() {
        let mut w = world();
        w.cash = 1_000.0;
        w.payout_ratio = 0.8;
        w.investors = vec![Investor {
            id: "a".into(),
            equity: 0.3,
            ..Default::default()
        }];
        let out = pay_dividends(&mut w, 1_000_000.0);
        assert!((out.paid - 350.0).abs() < 1e-9);
        assert!((w.cash - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_payout_ratio_is_clamped() {
        let mut w = world();
        assert_eq!(set_payout_ratio(&mut w, 0.5), 0.5);
        assert_eq!(w.payout_ratio, 0.5);
        assert_eq!(set_payout_ratio(&mut w, 1.4), MAX_PAYOUT_RATIO);
        assert_eq!(w.payout_ratio, 0.80);
        assert_eq!(set_payout_ratio(&mut w, -0.2), 0.0);
        assert_eq!(set_payout_ratio(&mut w, f64::NAN), 0.0);

        set_dividend_policy(&mut w, DividendPolicy::Balanced);
        assert_eq!(w.payout_ratio, DividendPolicy::Balanced.default_ratio());
    }

    #[test]
    fn test_pressure_transitions() {
        let mut w = world();
        let inv = Investor {
            id: "a".into(),
            pressure: Some(PressureTerms {
                target_weekly_net: 1_000.0,
                deadline_weeks: 10,
            }),
            ..Default::default()
        };
        w.net_history.push(500.0);
        assert_eq!(pressure_status(&w, &inv).status, PressureStatus::Warn);
        w.week = 9;
        assert_eq!(pressure_status(&w, &inv).status, PressureStatus::Danger);
        w.week = 11;
        assert_eq!(pressure_status(&w, &inv).status, PressureStatus::Failed);
        w.net_history.push(2_000.0);
        assert_eq!(pressure_status(&w, &inv).status, PressureStatus::Ok);

        let silent = Investor::default();
        assert_eq!(pressure_status(&w, &silent).status, PressureStatus::None);
    }

    #[test]
    fn test_failure_penalty_is_rate_limited() {
        let mut w = world();
        w.board_pressure = 30.0;
        w.investors = vec![Investor {
            id: "a".into(),
            pressure: Some(PressureTerms {
                target_weekly_net: 1_000.0,
                deadline_weeks: 1,
            }),
            ..Default::default()
        }];
        w.week = 5;

        let events = tick_governance(&mut w, -100.0);
        assert_eq!(w.board_pressure, 36.0);
        assert_eq!(w.reputation, 48.0);
        assert_eq!(w.dividend_policy, DividendPolicy::Balanced);
        assert_eq!(w.payout_ratio, 0.30);
        assert_eq!(events.len(), 2);

        for week in 6..9 {
            w.week = week;
            assert!(tick_governance(&mut w, -100.0).is_empty());
        }
        assert_eq!(w.investors[0].fail_count, 1);
        w.week = 9;
        assert_eq!(tick_governance(&mut w, -100.0).len(), 1);
        assert_eq!(w.investors[0].fail_count, 2);
    }

    #[test]
    fn test_buyout() {
        let mut w = world();
        w.investors = vec![Investor {
            id: "a".into(),
            equity: 0.1,
            cash_in: 20_000.0,
            pref_accrued: 500.0,
            ..Default::default()
        }];
        // no history: the floor wins
        let cost = estimate_buyout(&w, "a").unwrap();
        assert!(cost >= 25_500.0);
        assert!(matches!(
            buy_out(&mut w, "a"),
            Err(GovernanceError::InsufficientCash { .. })
        ));
        w.cash = 1_000_000.0;
        buy_out(&mut w, "a").unwrap();
        assert!(w.investors.is_empty());
        assert_eq!(
            estimate_buyout(&w, "a"),
            Err(GovernanceError::UnknownInvestor("a".into()))
        );
    }
}
