//! World Tick Orchestrator
//!
//! `run_week` advances the whole world by one week. The tick is a fixed
//! pipeline of named stages:
//!
//! 1. repair every persisted shape
//! 2. advance the shared supply market
//! 3. run each venue, in stored order, and aggregate
//! 4. drift world reputation and owner dependence
//! 5. finance: net into cash, depreciation, loans, tax
//! 6. governance: dividends, investor pressure
//! 7. push net history
//! 8. count down closures that were already running at the start of the tick
//! 9. quests
//!
//! The report is built from the finished stages and the week counter moves
//! last. A world with no venues skips stages 3 to 8 but still repairs,
//! advances the market, ticks quests and moves the week.

use std::collections::BTreeSet;

use tracing::info;
use venue_state::{
    generate_report_id, ComplianceSummary, FacilitySummary, FeedbackSummary, FinanceSummary,
    GovernanceSummary, InventorySummary, SupplySummary, VenueWeekSummary, WeekDate, WeekEvent,
    WeekTotals, WeeklyReport, WorldState, WorldSummary,
};

use crate::catalog::{city_or_default, macro_inflation, seasonality};
use crate::collab::{Collaborators, StandardCollaborators};
use crate::engine::{compute_week, VenueWeekResult, WorldSignals};
use crate::governance::{pay_dividends, tick_governance, total_outside_equity};
use crate::ledger::{
    accrue_tax, assets_book, debt_outstanding, net_worth, tick_depreciation, tick_loans,
};
use crate::numeric::{clamp_score, mean};
use crate::quests::tick_quests;
use crate::repair::Repairable;
use crate::rng::{Draws, RandomSource, SeededSource};

/// Constants for world-level drift
pub mod world_constants {
    pub const PROFIT_REPUTATION: f64 = 0.4;
    pub const LOSS_REPUTATION: f64 = -0.8;
    pub const PRESTIGE_PIVOT: f64 = 40.0;
    pub const PRESTIGE_REPUTATION: f64 = 0.01;
    pub const DELEGATE_OPS: f64 = 1.2;
    pub const DELEGATE_MENU: f64 = 0.9;
    pub const DELEGATE_FOH: f64 = 0.6;
    pub const DELEGATION_RELIEF: f64 = 0.8;
    /// Weekly creep back toward the owner doing everything
    pub const OWNER_CREEP: f64 = 0.35;
    pub const MAX_FEATURED_REVIEWS: usize = 3;
}

use world_constants::*;

/// Everything the venue loop produced, in venue order.
#[derive(Debug, Default)]
pub struct VenueStage {
    pub results: Vec<VenueWeekResult>,
    pub summaries: Vec<VenueWeekSummary>,
    /// Venues that began the tick closed
    pub closed_at_start: BTreeSet<String>,
    pub events: Vec<WeekEvent>,
}

impl VenueStage {
    pub fn net(&self) -> f64 {
        self.results.iter().map(|r| r.net).sum()
    }
}

#[derive(Debug, Default)]
pub struct FinanceStage {
    pub summary: FinanceSummary,
    pub events: Vec<WeekEvent>,
}

#[derive(Debug, Default)]
pub struct GovernanceStage {
    pub summary: GovernanceSummary,
    pub events: Vec<WeekEvent>,
}

/// Advances the world one week with the seeded source and stock models.
pub fn step(world: &mut WorldState) -> WeeklyReport {
    let source = SeededSource::new(world.seed);
    run_week(world, &source, &StandardCollaborators)
}

/// Advances the world one week.
pub fn run_week<C: Collaborators + ?Sized>(
    world: &mut WorldState,
    source: &dyn RandomSource,
    collab: &C,
) -> WeeklyReport {
    let week = world.week;
    let draws = Draws::new(source, week);

    stage_repair(world);
    let mut events = stage_market(world, collab, &draws);

    let mut venues = VenueStage::default();
    let mut finance = FinanceStage::default();
    let mut governance = GovernanceStage::default();
    if !world.venues.is_empty() {
        venues = stage_venues(world, collab, &draws);
        let net = venues.net();
        stage_world_drift(world, net);
        finance = stage_finance(world, net);
        governance = stage_governance(world, net);
        stage_history(world, net);
        stage_closures(world, &venues.closed_at_start);
    }

    events.append(&mut venues.events);
    events.append(&mut finance.events);
    events.append(&mut governance.events);
    events.extend(stage_quests(world));

    let report = build_report(world, &venues, finance.summary, governance.summary, events);
    info!(
        week,
        date = %report.date,
        covers = report.totals.covers,
        sales = report.totals.sales,
        net = report.totals.net,
        cash = world.cash,
        "Week complete"
    );
    world.week += 1;
    report
}

// ---- Stages ----

pub fn stage_repair(world: &mut WorldState) {
    world.ensure_defaults();
}

/// Moves every category's price index. Runs before any venue reads it.
pub fn stage_market<C: Collaborators + ?Sized>(
    world: &mut WorldState,
    collab: &C,
    draws: &Draws,
) -> Vec<WeekEvent> {
    collab.advance_market(&mut world.supply, draws)
}

/// Runs every venue in stored order, debiting plant costs as it goes.
pub fn stage_venues<C: Collaborators + ?Sized>(
    world: &mut WorldState,
    collab: &C,
    draws: &Draws,
) -> VenueStage {
    let city = city_or_default(&world.home_city);
    let season = seasonality(world.week);
    let inflation = macro_inflation(world.week);
    let mut stage = VenueStage::default();

    for venue in world.venues.iter_mut() {
        if venue.is_closed() {
            stage.closed_at_start.insert(venue.id.clone());
        }
        let signals = WorldSignals {
            base_demand: city.base_demand,
            seasonality: season,
            macro_inflation: inflation,
            world_reputation: world.reputation,
            critic_harshness: city.critic_harshness,
            cash_available: world.cash.max(0.0),
        };
        let result = compute_week(venue, &signals, &world.supply, collab, draws);

        // Maintenance was only paid if affordable; energy is always billed.
        world.cash -= result.facility.maintenance_paid;
        world.cash = (world.cash - result.facility.energy).max(0.0);
        world.prestige = clamp_score(world.prestige + result.prestige_delta);

        stage.events.extend(result.events());
        stage.summaries.push(result.summary(venue));
        stage.results.push(result);
    }
    stage
}

/// Reputation follows profit and prestige; delegation wears owner
/// dependence down while it otherwise creeps back up.
pub fn stage_world_drift(world: &mut WorldState, net: f64) {
    let swing = if net > 0.0 {
        PROFIT_REPUTATION
    } else {
        LOSS_REPUTATION
    };
    world.reputation = clamp_score(
        world.reputation + swing + (world.prestige - PRESTIGE_PIVOT) * PRESTIGE_REPUTATION,
    );

    let delegation: f64 = world
        .venues
        .iter()
        .map(|v| {
            let staff = &v.staff;
            let d = staff.delegation;
            let mut score = 0.0;
            if d.ops && staff.gm.is_some() {
                score += DELEGATE_OPS;
            }
            if d.menu && staff.chef.is_some() {
                score += DELEGATE_MENU;
            }
            if d.foh && staff.foh.is_some() {
                score += DELEGATE_FOH;
            }
            score
        })
        .sum();
    world.owner_dependence =
        clamp_score(world.owner_dependence - delegation * DELEGATION_RELIEF + OWNER_CREEP);
}

/// Books the week's net, then depreciation, loan service and tax.
pub fn stage_finance(world: &mut WorldState, net: f64) -> FinanceStage {
    world.cash += net;
    let (depreciation, mut events) = tick_depreciation(world);
    let loans = tick_loans(world);
    events.extend(loans.events);

    let profit_before_tax = net - depreciation - loans.interest;
    let tax_expense = accrue_tax(world, profit_before_tax);
    let profit_after_tax = profit_before_tax - tax_expense;
    world.retained_earnings += profit_after_tax;

    FinanceStage {
        summary: FinanceSummary {
            depreciation,
            interest: loans.interest,
            loan_payment: loans.payment,
            principal_paid: loans.principal,
            profit_before_tax,
            tax_expense,
            profit_after_tax,
            tax_accrued: world.tax_accrued,
            debt_outstanding: debt_outstanding(world),
            assets_book: assets_book(world),
            net_worth: net_worth(world),
        },
        events,
    }
}

/// Dividends from this week's net, then investor pressure.
pub fn stage_governance(world: &mut WorldState, net: f64) -> GovernanceStage {
    let dividends = pay_dividends(world, net);
    let mut events = dividends.events;
    events.extend(tick_governance(world, net));
    GovernanceStage {
        summary: GovernanceSummary {
            dividends_paid: dividends.paid,
            preferred_paid: dividends.preferred_paid,
            outside_equity: total_outside_equity(world),
            board_pressure: world.board_pressure,
            payout_ratio: world.payout_ratio,
        },
        events,
    }
}

pub fn stage_history(world: &mut WorldState, net: f64) {
    world.net_history.push(net);
    world.last_week_net = Some(net);
}

/// Counts down closures that were running when the tick started. A closure
/// ordered during this tick starts counting next week.
pub fn stage_closures(world: &mut WorldState, closed_at_start: &BTreeSet<String>) {
    for venue in world.venues.iter_mut() {
        if closed_at_start.contains(&venue.id) {
            venue.closure_weeks = venue.closure_weeks.saturating_sub(1);
            if venue.closure_weeks == 0 {
                info!(venue = %venue.id, "Venue reopens");
            }
        }
    }
}

pub fn stage_quests(world: &mut WorldState) -> Vec<WeekEvent> {
    tick_quests(world)
}

// ---- Report ----

fn build_report(
    world: &WorldState,
    stage: &VenueStage,
    finance: FinanceSummary,
    governance: GovernanceSummary,
    events: Vec<WeekEvent>,
) -> WeeklyReport {
    let results = &stage.results;
    let city = city_or_default(&world.home_city);

    let mut totals = WeekTotals::default();
    for r in results {
        totals.covers += r.covers;
        totals.sales += r.sales;
        totals.food += r.food;
        totals.labor += r.labor;
        totals.wages += r.wages;
        totals.occupancy += r.occupancy;
        totals.other += r.other;
        totals.net += r.net;
        totals.regulars_delta += r.regulars_delta;
    }
    if totals.sales > 0.0 {
        totals.prime_pct = (totals.food + totals.labor) / totals.sales;
        totals.occupancy_pct = totals.occupancy / totals.sales;
    }

    let mut feedback = FeedbackSummary::default();
    let mut stars_sum = 0u32;
    for r in results {
        let f = &r.feedback;
        for (tag, n) in &f.praise {
            *feedback.praise.entry(tag.clone()).or_default() += n;
        }
        for (tag, n) in &f.complaints {
            *feedback.complaints.entry(tag.clone()).or_default() += n;
        }
        if let Some(featured) = &f.featured {
            if feedback.featured_reviews.len() < MAX_FEATURED_REVIEWS {
                feedback.featured_reviews.push(featured.clone());
            }
        }
        feedback.reviews_new += f.reviews_new;
        feedback.reviews_negative += f.reviews_negative;
        stars_sum += f.stars_sum;
        if f.viral_shock.is_some() {
            feedback.viral_events += 1;
        }
    }
    if feedback.reviews_new > 0 {
        feedback.avg_stars = stars_sum as f64 / feedback.reviews_new as f64;
    }

    // Average index weighted by what each venue actually bought.
    let weight: f64 = results.iter().map(|r| r.supply.contracted).sum();
    let avg_index = if weight > 0.0 {
        results
            .iter()
            .map(|r| r.supply.index_avg * r.supply.contracted)
            .sum::<f64>()
            / weight
    } else {
        1.0
    };
    let supply = SupplySummary {
        index: world.supply.index.clone(),
        avg_index,
        stockouts: results.iter().map(|r| r.supply.stockouts).sum(),
        emergency_spend: results.iter().map(|r| r.supply.emergency).sum(),
    };

    let mut inventory = InventorySummary::default();
    for r in results {
        let i = &r.inventory;
        inventory.waste += i.waste;
        inventory.stockouts += i.stockouts;
        inventory.emergency += i.emergency;
        inventory.on_hand += i.on_hand;
        inventory.incoming += i.incoming;
    }

    let conditions: Vec<f64> = results.iter().map(|r| r.facility.condition).collect();
    let facilities = FacilitySummary {
        maintenance: results.iter().map(|r| r.facility.maintenance_paid).sum(),
        energy: results.iter().map(|r| r.facility.energy).sum(),
        new_issues: results.iter().map(|r| r.facility.breakdowns.len() as u32).sum(),
        down_venues: results
            .iter()
            .filter(|r| r.facility.downtime_weeks > 0)
            .count() as u32,
        avg_condition: mean(&conditions).unwrap_or(0.0),
    };

    let compliance_scores: Vec<f64> = stage.summaries.iter().map(|s| s.compliance).collect();
    let mut compliance = ComplianceSummary {
        avg_compliance: mean(&compliance_scores).unwrap_or(0.0),
        ..Default::default()
    };
    for c in results.iter().filter_map(|r| r.compliance.as_ref()) {
        if c.inspection.is_some() {
            compliance.inspections += 1;
        }
        if c.mystery.is_some() {
            compliance.mystery_visits += 1;
        }
        compliance.fines += c.fine();
        if c.closure_started() {
            compliance.closures_started += 1;
        }
    }

    let governance = if results.is_empty() {
        GovernanceSummary {
            outside_equity: total_outside_equity(world),
            board_pressure: world.board_pressure,
            payout_ratio: world.payout_ratio,
            ..Default::default()
        }
    } else {
        governance
    };
    let finance = if results.is_empty() {
        FinanceSummary {
            tax_accrued: world.tax_accrued,
            debt_outstanding: debt_outstanding(world),
            assets_book: assets_book(world),
            net_worth: net_worth(world),
            ..Default::default()
        }
    } else {
        finance
    };

    WeeklyReport {
        report_id: generate_report_id(world.week),
        week: world.week,
        date: WeekDate::from_week(world.week),
        city: city.name.to_string(),
        seasonality: seasonality(world.week),
        macro_inflation: macro_inflation(world.week),
        totals,
        feedback,
        supply,
        inventory,
        facilities,
        compliance,
        finance,
        governance,
        world: WorldSummary {
            cash: world.cash,
            reputation: world.reputation,
            prestige: world.prestige,
            owner_dependence: world.owner_dependence,
        },
        venues: stage.summaries.clone(),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::CannedSource;
    use venue_state::{Hire, StaffRole, Venue};

    fn venue(id: &str) -> Venue {
        Venue {
            id: id.into(),
            ..Default::default()
        }
    }

    fn world_with(venues: Vec<Venue>) -> WorldState {
        WorldState {
            cash: 50_000.0,
            venues,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_world_still_advances() {
        let mut w = WorldState::default();
        let report = step(&mut w);
        assert_eq!(w.week, 1);
        assert_eq!(report.week, 0);
        assert_eq!(report.report_id, "wk_000000");
        assert_eq!(report.totals, WeekTotals::default());
        assert!(report.venues.is_empty());
        // a quest still rolls on week 0
        assert_eq!(w.quests.active.len(), 1);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, WeekEvent::QuestStarted { .. })));
        // no finance stage without venues
        assert!(w.net_history.is_empty());
        assert_eq!(w.reputation, 50.0);
    }

    #[test]
    fn test_report_totals_match_venues() {
        let mut w = world_with(vec![venue("v_0001"), venue("v_0002")]);
        let report = step(&mut w);
        let sales: f64 = report.venues.iter().map(|v| v.sales).sum();
        let net: f64 = report.venues.iter().map(|v| v.net).sum();
        assert!((report.totals.sales - sales).abs() < 1e-6);
        assert!((report.totals.net - net).abs() < 1e-6);
        assert_eq!(report.venues[0].venue_id, "v_0001");
        assert_eq!(report.venues[1].venue_id, "v_0002");
        assert_eq!(w.net_history.last(), Some(report.totals.net));
        assert_eq!(w.last_week_net, Some(report.totals.net));
    }

    #[test]
    fn test_closure_counts_down_only_when_closed_at_start() {
        let mut closed = venue("v_0001");
        closed.closure_weeks = 2;
        let mut w = world_with(vec![closed, venue("v_0002")]);
        let report = step(&mut w);
        assert_eq!(report.venues[0].covers, 0);
        assert_eq!(report.venues[0].sales, 0.0);
        assert!(report.venues[0].closed);
        assert_eq!(w.venues[0].closure_weeks, 1);

        let mut set = BTreeSet::new();
        set.insert("v_0001".to_string());
        w.venues[1].closure_weeks = 3;
        stage_closures(&mut w, &set);
        assert_eq!(w.venues[0].closure_weeks, 0);
        assert_eq!(w.venues[1].closure_weeks, 3);
    }

    #[test]
    fn test_cash_never_negative_from_plant_costs() {
        let mut w = world_with(vec![venue("v_0001"), venue("v_0002")]);
        w.cash = 10.0;
        w.venues[1].closure_weeks = 4;
        let src = CannedSource::constant(0.5);
        let draws = Draws::new(&src, 0);
        stage_repair(&mut w);
        let stage = stage_venues(&mut w, &StandardCollaborators, &draws);
        assert!(w.cash >= 0.0);
        assert!(stage.results.iter().all(|r| r.facility.energy > 0.0));
        assert!(stage.closed_at_start.contains("v_0002"));
    }

    #[test]
    fn test_world_drift() {
        let mut w = WorldState {
            prestige: 40.0,
            ..Default::default()
        };
        stage_world_drift(&mut w, 100.0);
        assert!((w.reputation - 50.4).abs() < 1e-12);
        assert!((w.owner_dependence - 70.35).abs() < 1e-12);

        let mut v = venue("v_0001");
        v.staff.delegation.ops = true;
        *v.staff.slot_mut(StaffRole::Gm) = Some(Hire {
            name: "Sam Ng".into(),
            role: StaffRole::Gm,
            wage_weekly: 1_800.0,
            skills: Default::default(),
            traits: Vec::new(),
        });
        w.venues.push(v);
        stage_world_drift(&mut w, -1.0);
        assert!((w.reputation - 49.6).abs() < 1e-9);
        // 70.35 - 1.2 x 0.8 + 0.35
        assert!((w.owner_dependence - 69.74).abs() < 1e-9);
    }

    #[test]
    fn test_finance_stage_books_profit() {
        let mut w = WorldState::default();
        let f = stage_finance(&mut w, 1_000.0);
        assert_eq!(w.cash, 1_000.0);
        assert_eq!(f.summary.profit_before_tax, 1_000.0);
        assert_eq!(f.summary.tax_expense, 250.0);
        assert_eq!(w.retained_earnings, 750.0);
        assert_eq!(f.summary.net_worth, 1_000.0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let run = || {
            let mut w = world_with(vec![venue("v_0001"), venue("v_0002")]);
            let reports: Vec<String> = (0..6)
                .map(|_| serde_json::to_string(&step(&mut w)).unwrap())
                .collect();
            (reports, w)
        };
        let (a, wa) = run();
        let (b, wb) = run();
        assert_eq!(a, b);
        assert_eq!(wa, wb);
    }
}
