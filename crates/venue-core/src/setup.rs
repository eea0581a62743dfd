//! World Setup
//!
//! Creates a fresh world from configuration and adds venues to it, either
//! as a new lease or as an existing business bought from a seller.

use serde::{Deserialize, Serialize};
use tracing::info;
use venue_state::{generate_venue_id, Venue, WorldState};

use crate::catalog::{city, concept, venue_type, VenueType};
use crate::collab::inventory::seed_stock;
use crate::collab::menu::starter_menu;
use crate::config::{SimConfig, WorldConfig};
use crate::engine::engine_constants::{OCCUPANCY_MAX, OCCUPANCY_MIN};
use crate::error::SetupError;
use crate::ledger::add_fixed_asset;
use crate::ledger::ledger_constants::{FITOUT_LIFE_WEEKS, GOODWILL_LIFE_WEEKS};
use crate::numeric::{clamp, clamp_score, round_half_up};
use crate::repair::Repairable;
use crate::rng::{Draws, RandomSource};

/// Constants for acquisitions
pub mod setup_constants {
    /// Share of the type's capex spent fitting out an empty site
    pub const FRESH_CAPEX_SHARE: f64 = 0.35;
    /// Refresh spend when an existing business is kept as-is
    pub const KEEP_CAPEX_SHARE: f64 = 0.06;
    /// Rebuild spend when an existing business is converted
    pub const CONVERT_CAPEX_SHARE: f64 = 0.18;
    pub const BOND_WEEKS: f64 = 8.0;
    pub const LEGAL_FEE: f64 = 3_500.0;
    pub const APPROVALS_FEE: f64 = 600.0;
    pub const DEFAULT_OCCUPANCY: f64 = 0.09;
    pub const FITOUT_MIN: f64 = 20.0;
    pub const FITOUT_MAX: f64 = 95.0;
    /// Share of regulars who stay through a conversion
    pub const CONVERT_REGULARS_KEPT: f64 = 0.35;
}

use setup_constants::*;

// ---- Requests ----

/// Seller-provided state of an existing business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InheritedBaseline {
    pub local_reputation: f64,
    pub regulars: u32,
    pub fitout_quality: f64,
    pub chef_skill: f64,
    pub manager_skill: f64,
    pub cleanliness: f64,
    /// How reliable the seller's supply chain was, 0..100
    pub supplier_stability: f64,
    pub asking_price: f64,
    /// Keep the business as-is; otherwise convert it to the new concept
    pub keep: bool,
}

impl Default for InheritedBaseline {
    fn default() -> Self {
        Self {
            local_reputation: 50.0,
            regulars: 0,
            fitout_quality: 50.0,
            chef_skill: 46.0,
            manager_skill: 42.0,
            cleanliness: 60.0,
            supplier_stability: 50.0,
            asking_price: 0.0,
            keep: true,
        }
    }
}

/// A venue to add to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueRequest {
    pub type_id: String,
    pub concept_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price_position: f64,
    pub foot_traffic: f64,
    /// Rent as a fraction of sales; estimated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_pct: Option<f64>,
    pub lease_years: f64,
    /// Present when buying an existing business
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited: Option<InheritedBaseline>,
}

impl Default for VenueRequest {
    fn default() -> Self {
        Self {
            type_id: "bistro".to_string(),
            concept_id: "modern_a_la_carte".to_string(),
            name: None,
            price_position: 0.0,
            foot_traffic: 50.0,
            occupancy_pct: None,
            lease_years: 5.0,
            inherited: None,
        }
    }
}

/// What an acquisition costs up front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcquisitionCost {
    pub capex: f64,
    pub purchase: f64,
    pub bond: f64,
    pub fees: f64,
    pub total: f64,
}

// ---- World ----

/// Creates an empty world from the `[world]` section.
pub fn new_world(config: &WorldConfig, seed: u64) -> Result<WorldState, SetupError> {
    if city(&config.home_city).is_none() {
        return Err(SetupError::UnknownCity(config.home_city.clone()));
    }
    let mut world = WorldState {
        seed,
        home_city: config.home_city.clone(),
        cash: config.starting_cash.max(0.0),
        tax_rate: config.tax_rate,
        reputation: clamp_score(config.reputation),
        owner_dependence: clamp_score(config.owner_dependence),
        dividend_policy: config.dividend_policy,
        payout_ratio: config.dividend_policy.default_ratio(),
        ..Default::default()
    };
    world.supply.ensure_defaults();
    info!(city = %world.home_city, cash = world.cash, seed, "World created");
    Ok(world)
}

/// Creates the world and acquires every configured venue in order.
pub fn build_world(config: &SimConfig, source: &dyn RandomSource) -> Result<WorldState, SetupError> {
    let mut world = new_world(&config.world, config.simulation.seed)?;
    for request in &config.venues {
        acquire_venue(&mut world, request, source)?;
    }
    Ok(world)
}

// ---- Acquisition ----

fn expected_weekly_sales(t: &VenueType, request: &VenueRequest) -> f64 {
    t.capacity
        * 0.95
        * (t.avg_spend * (1.0 + request.price_position / 100.0))
        * (0.85 + request.foot_traffic / 200.0)
}

fn occupancy_for(request: &VenueRequest) -> f64 {
    match request.occupancy_pct {
        Some(occ) if occ.is_finite() => clamp(occ, OCCUPANCY_MIN, OCCUPANCY_MAX),
        _ => DEFAULT_OCCUPANCY,
    }
}

/// Prices an acquisition without touching the world.
pub fn acquisition_cost(request: &VenueRequest) -> Result<AcquisitionCost, SetupError> {
    let t = venue_type(&request.type_id)
        .ok_or_else(|| SetupError::UnknownVenueType(request.type_id.clone()))?;

    let (capex, purchase) = match &request.inherited {
        None => (round_half_up(t.capex_base * FRESH_CAPEX_SHARE), 0.0),
        Some(b) => {
            let share = if b.keep { KEEP_CAPEX_SHARE } else { CONVERT_CAPEX_SHARE };
            (round_half_up(t.capex_base * share), b.asking_price.max(0.0))
        }
    };
    let weekly_rent = expected_weekly_sales(t, request) * occupancy_for(request);
    let bond = round_half_up(weekly_rent * BOND_WEEKS);
    let fees = LEGAL_FEE + APPROVALS_FEE;

    Ok(AcquisitionCost {
        capex,
        purchase,
        bond,
        fees,
        total: capex + purchase + bond + fees,
    })
}

/// Adds a venue to the world and pays for it. Returns the new venue id.
///
/// Fit-out spend and any purchase price are capitalized as fixed assets.
/// Baseline noise is drawn from a stream keyed by the new venue id, so the
/// same world and request always produce the same venue.
pub fn acquire_venue(
    world: &mut WorldState,
    request: &VenueRequest,
    source: &dyn RandomSource,
) -> Result<String, SetupError> {
    let t = venue_type(&request.type_id)
        .ok_or_else(|| SetupError::UnknownVenueType(request.type_id.clone()))?;
    let cs = concept(&request.concept_id)
        .ok_or_else(|| SetupError::UnknownConcept(request.concept_id.clone()))?;

    let cost = acquisition_cost(request)?;
    if world.cash < cost.total {
        return Err(SetupError::InsufficientCash {
            needed: cost.total,
            available: world.cash,
        });
    }

    let id = generate_venue_id(world.next_sequence());
    let mut draws = Draws::new(source, world.week).stream(&format!("acquire:{id}"));

    let mut venue = Venue {
        id: id.clone(),
        name: request
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {} {}", cs.name, t.name, world.venues.len() + 1)),
        type_id: t.id.to_string(),
        concept_id: cs.id.to_string(),
        price_position: request.price_position,
        foot_traffic: clamp_score(request.foot_traffic),
        occupancy_pct: occupancy_for(request),
        lease_years_remaining: request.lease_years,
        purchase_price: cost.purchase,
        acquired_week: world.week,
        ..Default::default()
    };
    venue.fitout_quality = clamp(
        50.0 + draws.int_in(-5, 15) as f64,
        FITOUT_MIN,
        FITOUT_MAX,
    );

    if let Some(b) = &request.inherited {
        venue.local_reputation = clamp_score(b.local_reputation);
        venue.regulars = b.regulars;
        venue.fitout_quality = clamp(b.fitout_quality, FITOUT_MIN, FITOUT_MAX);
        venue.chef_skill = clamp_score(b.chef_skill);
        venue.manager_skill = clamp_score(b.manager_skill);
        venue.cleanliness = clamp_score(b.cleanliness);
        venue.procurement_skill = clamp_score(
            35.0 + (b.supplier_stability - 50.0) * 0.4 + draws.int_in(-6, 6) as f64,
        );
        venue.waste_pct = clamp(
            0.08 + (70.0 - venue.procurement_skill) * 0.001 + draws.int_in(-1, 2) as f64 / 100.0,
            0.03,
            0.14,
        );
        venue.staff_stress = clamp_score(40.0 + draws.int_in(-15, 20) as f64);

        if !b.keep {
            venue.regulars = round_half_up(venue.regulars as f64 * CONVERT_REGULARS_KEPT) as u32;
            venue.local_reputation = clamp_score(venue.local_reputation - 12.0);
            venue.staff_stress = clamp_score(venue.staff_stress + 18.0);
            venue.cleanliness = clamp_score(venue.cleanliness - 6.0);
            venue.fitout_quality = clamp(venue.fitout_quality + 6.0, FITOUT_MIN, FITOUT_MAX);
        }
    }

    venue.menu.style = t.menu_style.to_string();
    venue.menu.items = starter_menu(t.id, t.menu_style, &id, &mut draws);
    seed_stock(&mut venue, expected_weekly_sales(t, request) * t.food_cost_base);
    venue.ensure_defaults();

    world.cash -= cost.total;
    if cost.capex > 0.0 {
        add_fixed_asset(world, "Fit-out", cost.capex, FITOUT_LIFE_WEEKS);
    }
    if cost.purchase > 0.0 {
        add_fixed_asset(world, "Goodwill", cost.purchase, GOODWILL_LIFE_WEEKS);
    }

    info!(
        venue = %id,
        venue_type = t.id,
        concept = cs.id,
        inherited = request.inherited.is_some(),
        upfront = cost.total,
        "Venue acquired"
    );
    world.venues.push(venue);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    fn rich_world() -> WorldState {
        let config = WorldConfig {
            starting_cash: 1_000_000.0,
            ..Default::default()
        };
        new_world(&config, 42).unwrap()
    }

    #[test]
    fn test_new_world() {
        let config = WorldConfig {
            dividend_policy: venue_state::DividendPolicy::Balanced,
            ..Default::default()
        };
        let world = new_world(&config, 9).unwrap();
        assert_eq!(world.seed, 9);
        assert_eq!(world.cash, config.starting_cash);
        assert_eq!(world.payout_ratio, 0.30);
        assert!(world.venues.is_empty());
        assert_eq!(
            world.supply.index.len(),
            crate::catalog::SUPPLY_CATEGORIES.len()
        );
    }

    #[test]
    fn test_unknown_city() {
        let config = WorldConfig {
            home_city: "atlantis".into(),
            ..Default::default()
        };
        assert_eq!(
            new_world(&config, 1),
            Err(SetupError::UnknownCity("atlantis".into()))
        );
    }

    #[test]
    fn test_fresh_lease() {
        let mut world = rich_world();
        let source = SeededSource::new(42);
        let request = VenueRequest::default();
        let cost = acquisition_cost(&request).unwrap();
        // bistro 110_000 x 0.35
        assert_eq!(cost.capex, 38_500.0);
        assert_eq!(cost.purchase, 0.0);

        let id = acquire_venue(&mut world, &request, &source).unwrap();
        assert_eq!(id, "v_0001");
        assert!((world.cash - (1_000_000.0 - cost.total)).abs() < 1e-6);

        let venue = world.venue(&id).unwrap();
        assert!((45.0..=65.0).contains(&venue.fitout_quality));
        assert_eq!(venue.chef_skill, 46.0);
        assert_eq!(venue.menu.style, "a_la_carte");
        assert!(!venue.menu.items.is_empty());
        assert!(venue.inventory.stock.values().all(|s| s.on_hand > 0.0));

        assert_eq!(world.fixed_assets.len(), 1);
        assert_eq!(world.fixed_assets[0].label, "Fit-out");
        assert_eq!(world.fixed_assets[0].life_weeks, FITOUT_LIFE_WEEKS);
    }

    #[test]
    fn test_converted_purchase() {
        let mut world = rich_world();
        let source = SeededSource::new(42);
        let request = VenueRequest {
            inherited: Some(InheritedBaseline {
                local_reputation: 60.0,
                regulars: 100,
                fitout_quality: 70.0,
                asking_price: 80_000.0,
                keep: false,
                ..Default::default()
            }),
            ..Default::default()
        };
        let id = acquire_venue(&mut world, &request, &source).unwrap();
        let venue = world.venue(&id).unwrap();
        assert_eq!(venue.regulars, 35);
        assert_eq!(venue.local_reputation, 48.0);
        assert_eq!(venue.fitout_quality, 76.0);
        assert_eq!(venue.purchase_price, 80_000.0);
        assert!((0.03..=0.14).contains(&venue.waste_pct));

        let goodwill = world
            .fixed_assets
            .iter()
            .find(|a| a.label == "Goodwill")
            .unwrap();
        assert_eq!(goodwill.cost, 80_000.0);
        assert_eq!(goodwill.life_weeks, GOODWILL_LIFE_WEEKS);
        // bistro 110_000 x 0.18
        assert!(world
            .fixed_assets
            .iter()
            .any(|a| a.label == "Fit-out" && a.cost == 19_800.0));
    }

    #[test]
    fn test_insufficient_cash_leaves_world_untouched() {
        let mut world = new_world(&WorldConfig::default(), 42).unwrap();
        world.cash = 1_000.0;
        let before = world.clone();
        let err = acquire_venue(&mut world, &VenueRequest::default(), &SeededSource::new(1))
            .unwrap_err();
        assert!(matches!(err, SetupError::InsufficientCash { available, .. } if available == 1_000.0));
        assert_eq!(world, before);
    }

    #[test]
    fn test_unknown_catalog_ids() {
        let mut world = rich_world();
        let source = SeededSource::new(1);
        let bad_type = VenueRequest {
            type_id: "yacht".into(),
            ..Default::default()
        };
        assert_eq!(
            acquire_venue(&mut world, &bad_type, &source),
            Err(SetupError::UnknownVenueType("yacht".into()))
        );
        let bad_concept = VenueRequest {
            concept_id: "molecular".into(),
            ..Default::default()
        };
        assert_eq!(
            acquire_venue(&mut world, &bad_concept, &source),
            Err(SetupError::UnknownConcept("molecular".into()))
        );
    }

    #[test]
    fn test_same_seed_same_venue() {
        let source = SeededSource::new(7);
        let mut a = rich_world();
        let mut b = rich_world();
        acquire_venue(&mut a, &VenueRequest::default(), &source).unwrap();
        acquire_venue(&mut b, &VenueRequest::default(), &source).unwrap();
        assert_eq!(a.venues, b.venues);
    }
}
