//! Menu Model
//!
//! Popularity-weighted metrics over the active menu, price elasticity drift,
//! ticket time estimates and starter menus for new venues.

use std::collections::{BTreeMap, BTreeSet};

use venue_state::{MenuItem, Venue, WorldState};

use super::{venue_entry, MenuMetrics, MenuModel, StandardCollaborators};
use crate::catalog::{attach_rate, ticket_base_minutes, venue_type_or_default};
use crate::error::ActionError;
use crate::numeric::{clamp, clamp_score, round_half_up};
use crate::rng::DrawStream;

/// Constants for menu metrics
pub mod menu_constants {
    pub const DEFAULT_POPULARITY: f64 = 3.0;
    /// Price moves beyond this fraction shift popularity
    pub const ELASTICITY_BAND: f64 = 0.06;
    pub const PRICE_RISE_PENALTY: f64 = 0.3;
    pub const PRICE_CUT_BONUS: f64 = 0.2;
    /// Weekly pull of popularity back toward the default
    pub const POPULARITY_REVERSION: f64 = 0.08;
    pub const NO_MENU_PREP: f64 = 45.0;
    pub const NO_MENU_IMBALANCE: f64 = 35.0;
    pub const NO_MENU_VARIETY: f64 = 25.0;
}

use menu_constants::*;

fn weight(item: &MenuItem) -> f64 {
    clamp(item.popularity, 1.0, 5.0)
}

fn station_imbalance(weights: &BTreeMap<String, f64>) -> f64 {
    if weights.len() <= 1 {
        return 80.0;
    }
    let n = weights.len() as f64;
    let mean = weights.values().sum::<f64>() / n;
    let var = weights.values().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
    clamp_score(var.sqrt() / mean.max(1.0) * 120.0 + 20.0)
}

fn variety(categories: usize, items: usize) -> f64 {
    let size = clamp(items as f64 / 14.0, 0.35, 1.0);
    let bonus = if items >= 10 { 15.0 } else { 0.0 };
    clamp_score(categories as f64 / 6.0 * 100.0 * size + bonus)
}

/// Metrics for a venue's active items.
pub fn menu_metrics(venue: &Venue) -> MenuMetrics {
    let vt = venue_type_or_default(&venue.type_id);
    let fallback = vt.avg_spend * 0.70;
    let items: Vec<&MenuItem> = venue.menu.items.iter().filter(|i| i.active).collect();

    if items.is_empty() {
        return MenuMetrics {
            has_menu: false,
            item_count: 0,
            avg_price: fallback,
            food_cost_pct: vt.food_cost_base,
            prep_load: NO_MENU_PREP,
            station_imbalance: NO_MENU_IMBALANCE,
            variety: NO_MENU_VARIETY,
            avg_spend_per_cover: vt.avg_spend,
            station_weights: BTreeMap::new(),
        };
    }

    let mut w_sum = 0.0;
    let mut price_w = 0.0;
    let mut cost_w = 0.0;
    let mut prep_w = 0.0;
    let mut stations: BTreeMap<String, f64> = BTreeMap::new();
    let mut categories: BTreeSet<&str> = BTreeSet::new();

    for item in &items {
        let w = weight(item);
        w_sum += w;
        price_w += clamp(item.price, 0.0, 999.0) * w;
        cost_w += clamp(item.cost, 0.0, 999.0) * w;
        prep_w += clamp(item.prep, 0.0, 100.0) * w;
        *stations.entry(item.station.clone()).or_insert(0.0) += w;
        categories.insert(item.category.as_str());
    }

    let avg_price = price_w / w_sum.max(1.0);
    let avg_cost = cost_w / w_sum.max(1.0);
    let avg_spend = clamp(
        avg_price * attach_rate(&venue.menu.style),
        fallback * 0.7,
        fallback * 2.0,
    );

    MenuMetrics {
        has_menu: true,
        item_count: items.len(),
        avg_price,
        food_cost_pct: clamp(avg_cost / avg_price.max(1.0), 0.18, 0.45),
        prep_load: clamp(prep_w / w_sum.max(1.0), 0.0, 100.0),
        station_imbalance: station_imbalance(&stations),
        variety: variety(categories.len(), items.len()),
        avg_spend_per_cover: avg_spend,
        station_weights: stations,
    }
}

/// Average and 95th-percentile ticket minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TicketTimes {
    pub avg_minutes: f64,
    pub p95_minutes: f64,
}

/// Estimates ticket times from menu load, station cover, stress and skill.
pub fn ticket_times(venue: &Venue) -> TicketTimes {
    let m = menu_metrics(venue);
    let eff = super::staff::effective_skills(venue).skills;
    let staff = &venue.staff;
    let delegated_menu = staff.delegation.menu && staff.chef.is_some();
    let delegated_ops = staff.delegation.ops && staff.gm.is_some();
    let delegated_foh = staff.delegation.foh && staff.foh.is_some();

    let prep = m.prep_load;
    let imb = m.station_imbalance;
    let prep_help = (staff.stations.prep as f64 * 0.12).min(0.35);
    let prep_penalty = (prep - 45.0) * if delegated_menu { 0.15 } else { 0.18 } * (1.0 - prep_help);
    let dominant = m.dominant_station().unwrap_or("pan");
    let dom_help = (staff.stations.get(dominant).unwrap_or(0) as f64 * 0.18).min(0.45);
    let imb_penalty = (imb - 35.0).max(0.0) * 0.10 * (1.0 - dom_help);
    let stress = clamp_score(venue.staff_stress) * if delegated_ops { 0.04 } else { 0.06 };
    let pace_skill = clamp(
        (eff.pace - 50.0)
            + (eff.ops - 50.0) * 0.6
            + (eff.culinary - 50.0) * 0.3
            + if delegated_foh { 6.0 } else { 0.0 },
        -40.0,
        50.0,
    );

    let avg = clamp(
        ticket_base_minutes(&venue.menu.style) + prep_penalty + imb_penalty + stress
            - pace_skill * 0.06,
        4.0,
        60.0,
    );
    let variance = 1.25 + (imb - 50.0).max(0.0) / 200.0 + (prep - 60.0).max(0.0) / 300.0;
    TicketTimes {
        avg_minutes: avg,
        p95_minutes: clamp(avg * variance, avg + 2.0, 75.0),
    }
}

impl MenuModel for StandardCollaborators {
    fn menu_metrics(&self, venue: &Venue) -> MenuMetrics {
        menu_metrics(venue)
    }

    fn popularity_drift(&self, venue: &mut Venue) {
        for item in &mut venue.menu.items {
            let now = item.price;
            let last = item.last_price.unwrap_or(now);
            let change = if last > 0.0 { (now - last) / last } else { 0.0 };
            let mut pop = clamp(item.popularity, 1.0, 5.0);
            if change > ELASTICITY_BAND {
                pop = clamp(pop - PRICE_RISE_PENALTY, 1.0, 5.0);
            } else if change < -ELASTICITY_BAND {
                pop = clamp(pop + PRICE_CUT_BONUS, 1.0, 5.0);
            }
            item.last_price = Some(now);
            item.popularity = clamp(
                pop + (DEFAULT_POPULARITY - pop) * POPULARITY_REVERSION,
                1.0,
                5.0,
            );
        }
    }
}

// ---- Player actions ----

/// Changes an item's price. Popularity reacts at the next drift.
pub fn set_price(
    world: &mut WorldState,
    venue_id: &str,
    item_id: &str,
    price: f64,
) -> Result<(), ActionError> {
    let venue = venue_entry(world, venue_id)?;
    if let Some(item) = venue.menu.items.iter_mut().find(|i| i.id == item_id) {
        item.price = clamp(price, 0.0, 999.0);
    }
    Ok(())
}

/// Builds a starter menu for a venue's style, priced off its type's spend.
pub fn starter_menu(type_id: &str, style: &str, venue_id: &str, draws: &mut DrawStream) -> Vec<MenuItem> {
    let base = venue_type_or_default(type_id).avg_spend;
    let template: &[(&str, &str, &str, f64, f64, f64, f64)] = match style {
        "tasting" => &[
            ("Amuse, seasonal bite", "snacks", "cold", 0.22, 0.07, 72.0, 3.0),
            ("Cured fish, citrus", "entrees", "cold", 0.28, 0.09, 74.0, 3.0),
            ("Pasta, butter and umami", "mains", "pan", 0.32, 0.11, 78.0, 3.0),
            ("Roast with sauce", "mains", "grill", 0.40, 0.14, 80.0, 3.0),
            ("Set dessert", "dessert", "pastry", 0.26, 0.09, 76.0, 3.0),
        ],
        "cafe" => &[
            ("House eggs and toast", "mains", "pan", 0.55, 0.18, 55.0, 4.0),
            ("Seasonal salad bowl", "mains", "cold", 0.45, 0.14, 42.0, 3.0),
            ("Chicken sandwich", "mains", "pan", 0.50, 0.16, 48.0, 4.0),
            ("Pastry of the day", "dessert", "pastry", 0.30, 0.10, 50.0, 3.0),
            ("Flat white", "coffee", "coffee", 0.18, 0.05, 22.0, 5.0),
        ],
        "truck" => &[
            ("Signature wrap", "mains", "pan", 0.45, 0.16, 50.0, 5.0),
            ("Loaded fries", "sides", "fryer", 0.28, 0.10, 40.0, 4.0),
            ("Slaw and pickles", "sides", "cold", 0.18, 0.06, 28.0, 3.0),
            ("Soft drink", "drinks", "bar", 0.12, 0.03, 10.0, 4.0),
        ],
        "pub" => &[
            ("Chicken parmigiana", "mains", "fryer", 0.70, 0.26, 55.0, 5.0),
            ("Steak and chips", "mains", "grill", 0.85, 0.32, 58.0, 4.0),
            ("Fish and chips", "mains", "fryer", 0.78, 0.28, 52.0, 4.0),
            ("Garden salad", "sides", "cold", 0.24, 0.08, 25.0, 3.0),
            ("Pint of beer", "drinks", "bar", 0.22, 0.06, 12.0, 4.0),
        ],
        _ => &[
            ("Bread and whipped butter", "snacks", "cold", 0.18, 0.06, 25.0, 4.0),
            ("Crispy calamari", "entrees", "fryer", 0.34, 0.12, 45.0, 4.0),
            ("Seasonal veg entree", "entrees", "cold", 0.32, 0.11, 40.0, 3.0),
            ("Roast chicken and jus", "mains", "grill", 0.62, 0.22, 55.0, 4.0),
            ("Fish of the day", "mains", "pan", 0.64, 0.23, 58.0, 3.0),
            ("Fries", "sides", "fryer", 0.22, 0.07, 22.0, 4.0),
            ("Cheesecake", "dessert", "pastry", 0.28, 0.10, 46.0, 3.0),
            ("House wine, glass", "drinks", "bar", 0.24, 0.07, 12.0, 3.0),
        ],
    };

    let half_step = |x: f64| round_half_up(x * 2.0) / 2.0;
    template
        .iter()
        .enumerate()
        .map(|(i, (name, category, station, price, cost, prep, pop))| MenuItem {
            id: format!("{venue_id}_mi_{:02}", i + 1),
            name: name.to_string(),
            category: category.to_string(),
            station: station.to_string(),
            price: half_step(base * price * draws.range(0.92, 1.10)),
            cost: half_step(base * cost * draws.range(0.92, 1.10)),
            prep: clamp(prep + draws.int_in(-6, 8) as f64, 0.0, 100.0),
            popularity: clamp(pop + draws.int_in(-1, 1) as f64, 1.0, 5.0),
            active: true,
            last_price: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{CannedSource, RandomSource};

    fn item(id: &str, category: &str, station: &str, price: f64, cost: f64) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: id.into(),
            category: category.into(),
            station: station.into(),
            price,
            cost,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_menu_uses_type_baseline() {
        let venue = Venue {
            type_id: "cafe".into(),
            ..Default::default()
        };
        let m = menu_metrics(&venue);
        assert!(!m.has_menu);
        assert_eq!(m.avg_spend_per_cover, 22.0);
        assert_eq!(m.food_cost_pct, 0.29);
        assert_eq!(m.prep_load, 45.0);
    }

    #[test]
    fn test_single_station_is_bottleneck() {
        let mut venue = Venue::default();
        venue.menu.items = vec![
            item("a", "mains", "pan", 30.0, 9.0),
            item("b", "mains", "pan", 30.0, 9.0),
        ];
        let m = menu_metrics(&venue);
        assert_eq!(m.station_imbalance, 80.0);
        assert!((m.food_cost_pct - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_balanced_stations_score_low() {
        let mut venue = Venue::default();
        venue.menu.items = vec![
            item("a", "mains", "pan", 30.0, 9.0),
            item("b", "entrees", "grill", 20.0, 6.0),
        ];
        let m = menu_metrics(&venue);
        assert_eq!(m.station_imbalance, 20.0);
        // 2 categories, size factor 0.35
        assert!((m.variety - 2.0 / 6.0 * 100.0 * 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_inactive_items_ignored() {
        let mut venue = Venue::default();
        let mut off = item("a", "mains", "pan", 30.0, 9.0);
        off.active = false;
        venue.menu.items = vec![off];
        assert!(!menu_metrics(&venue).has_menu);
    }

    #[test]
    fn test_price_rise_cuts_popularity() {
        let mut venue = Venue::default();
        let mut it = item("a", "mains", "pan", 33.0, 9.0);
        it.last_price = Some(30.0);
        venue.menu.items = vec![it];
        StandardCollaborators.popularity_drift(&mut venue);
        let it = &venue.menu.items[0];
        // 3.0 - 0.3 = 2.7, then +0.3 x 0.08
        assert!((it.popularity - 2.724).abs() < 1e-9);
        assert_eq!(it.last_price, Some(33.0));
    }

    #[test]
    fn test_popularity_reverts_toward_three() {
        let mut venue = Venue::default();
        let mut it = item("a", "mains", "pan", 30.0, 9.0);
        it.popularity = 5.0;
        venue.menu.items = vec![it];
        StandardCollaborators.popularity_drift(&mut venue);
        assert!((venue.menu.items[0].popularity - 4.84).abs() < 1e-9);
    }

    #[test]
    fn test_starter_menu_matches_style() {
        let src = CannedSource::constant(0.5);
        let mut draws = src.stream(0, "venue:v_0001:menu");
        let items = starter_menu("pub_kitchen", "pub", "v_0001", &mut draws);
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i.price > i.cost && i.active));
        assert_eq!(items[0].id, "v_0001_mi_01");
    }

    #[test]
    fn test_ticket_times_bounded() {
        let mut venue = Venue {
            staff_stress: 100.0,
            ..Default::default()
        };
        venue.menu.style = "tasting".into();
        let t = ticket_times(&venue);
        assert!((4.0..=60.0).contains(&t.avg_minutes));
        assert!(t.p95_minutes >= t.avg_minutes + 2.0);
    }
}
