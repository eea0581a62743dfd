//! Whole-world tick scenarios.

use std::collections::BTreeSet;

use venue_core::config::SimConfig;
use venue_core::orchestrator::stage_repair;
use venue_core::{acquire_venue, build_world, step, SeededSource, VenueRequest};
use venue_state::{fixtures, WorldState, NET_HISTORY_LEN};

fn two_venue_world() -> WorldState {
    let mut config = SimConfig::default();
    config.world.starting_cash = 400_000.0;
    config.venues = vec![
        VenueRequest::default(),
        VenueRequest {
            type_id: "casual_dining".into(),
            concept_id: "family_value".into(),
            ..Default::default()
        },
    ];
    build_world(&config, &SeededSource::new(config.simulation.seed)).unwrap()
}

#[test]
fn test_report_matches_world() {
    let mut world = two_venue_world();
    let report = step(&mut world);

    assert_eq!(report.report_id, "wk_000000");
    assert_eq!(report.week, 0);
    assert_eq!(world.week, 1);
    assert_eq!(report.venues.len(), 2);
    assert_eq!(report.world.cash, world.cash);
    assert_eq!(report.world.reputation, world.reputation);

    let net: f64 = report.venues.iter().map(|v| v.net).sum();
    assert!((report.totals.net - net).abs() < 1e-6);
    let covers: u32 = report.venues.iter().map(|v| v.covers).sum();
    assert_eq!(report.totals.covers, covers);
    let last = world.net_history.last().unwrap();
    assert!((last - report.totals.net).abs() < 1e-6);
}

#[test]
fn test_closure_suppresses_only_the_closed_week() {
    let mut world = two_venue_world();
    world.venues[0].closure_weeks = 1;

    let closed = step(&mut world);
    assert!(closed.venues[0].closed);
    assert_eq!(closed.venues[0].covers, 0);
    assert_eq!(closed.venues[0].sales, 0.0);
    assert!(!closed.venues[1].closed);
    assert!(closed.venues[1].covers > 0);

    let reopened = step(&mut world);
    assert!(!reopened.venues[0].closed);
    assert!(reopened.venues[0].covers > 0);
}

#[test]
fn test_empty_world_only_rolls_quests() {
    let mut world = WorldState {
        cash: 5_000.0,
        ..Default::default()
    };
    for _ in 0..4 {
        let report = step(&mut world);
        assert!(report.venues.is_empty());
        assert_eq!(report.totals.sales, 0.0);
    }
    assert_eq!(world.week, 4);
    assert_eq!(world.cash, 5_000.0);
    assert_eq!(world.tax_accrued, 0.0);
    assert!(world.net_history.is_empty());
    assert_eq!(world.quests.active.len(), 2);
}

#[test]
fn test_legacy_world_is_repaired_before_the_tick() {
    let mut world = fixtures::legacy_world();
    stage_repair(&mut world);

    assert_eq!(world.reputation, 100.0);
    assert_eq!(world.net_history.len(), NET_HISTORY_LEN);
    assert!(world.next_seq > 2);

    let v = &world.venues[0];
    assert_eq!(v.burnout, 100.0);
    assert_eq!(v.compliance, 0.0);
    assert_eq!(v.waste_pct, 0.16);
    assert_eq!(v.staff.roster.open_days, 7);
    assert_eq!(v.facility.maintenance_level, 1.5);
    assert_eq!(v.inventory.par_weeks, 2.2);
    assert_eq!(v.menu.items[0].popularity, 5.0);
    assert_eq!(v.concept_id, "modern_a_la_carte");

    let report = step(&mut world);
    assert_eq!(report.week, 30);
    assert_eq!(report.city, "Melbourne");
    assert_eq!(world.week, 31);
    assert_eq!(world.net_history.len(), NET_HISTORY_LEN);
}

#[test]
fn test_mid_run_acquisition_gets_a_fresh_id() {
    let mut world = two_venue_world();
    for _ in 0..6 {
        step(&mut world);
    }
    let source = SeededSource::new(world.seed);
    let id = acquire_venue(&mut world, &VenueRequest::default(), &source).unwrap();
    assert_eq!(world.venues.last().unwrap().acquired_week, 6);

    let ids: BTreeSet<&str> = world
        .venues
        .iter()
        .map(|v| v.id.as_str())
        .chain(world.fixed_assets.iter().map(|a| a.id.as_str()))
        .chain(world.quests.active.iter().map(|q| q.id.as_str()))
        .collect();
    let total = world.venues.len() + world.fixed_assets.len() + world.quests.active.len();
    assert_eq!(ids.len(), total);
    assert!(ids.contains(id.as_str()));

    let report = step(&mut world);
    assert_eq!(report.venues.len(), 3);
}
