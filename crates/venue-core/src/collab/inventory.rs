//! Inventory Model
//!
//! Per-category stock on hand and on order. Each week receives due orders,
//! loses spoilage and shrink, consumes the week's food cost and reorders up
//! to par.

use tracing::debug;
use venue_state::{CategoryStock, PendingOrder, SupplyMarket, Venue, WorldState};

use super::{
    charge, venue_entry, ConsumptionRequest, InventoryEffect, InventoryModel,
    StandardCollaborators,
};
use crate::catalog::{
    cheapest_supplier, supplier, venue_type_or_default, SUPPLY_CATEGORIES, STORAGE_LEVELS,
};
use crate::error::ActionError;
use crate::numeric::clamp;
use crate::rng::Draws;

/// Constants for stock control
pub mod inventory_constants {
    pub const STOCKTAKE_COST: f64 = 250.0;
    pub const PAR_WEEKS_MIN: f64 = 0.6;
    pub const PAR_WEEKS_MAX: f64 = 2.2;
    /// Smallest reorder worth placing
    pub const MIN_ORDER: f64 = 250.0;
    pub const EMERGENCY_PREMIUM_BASE: f64 = 0.18;
    pub const EMERGENCY_PREMIUM_SPREAD: f64 = 0.17;
    pub const MAX_SAT_PENALTY: f64 = 10.0;
    pub const MAX_SPEED_PENALTY: f64 = 8.0;
}

use inventory_constants::*;

/// Shrink multiplier by weeks since the last stocktake.
pub fn shrink_multiplier(current_week: u32, last_stocktake: Option<u32>) -> f64 {
    match last_stocktake.map(|w| current_week.saturating_sub(w)) {
        Some(0..=2) => 0.35,
        Some(3..=6) => 0.65,
        _ => 1.0,
    }
}

/// Largest stock value a venue can hold across all categories.
pub fn max_on_hand(venue: &Venue) -> f64 {
    let cap = venue_type_or_default(&venue.type_id).capacity;
    let level = (venue.inventory.storage_level as usize).min(STORAGE_LEVELS.len() - 1);
    clamp(cap * 320.0, 8_000.0, 120_000.0) * STORAGE_LEVELS[level].0
}

fn incoming(stock: &CategoryStock) -> f64 {
    stock.orders.iter().map(|o| o.value).sum()
}

/// Fills each category to par for a given weekly food cost.
pub fn seed_stock(venue: &mut Venue, weekly_cogs: f64) {
    let par = venue.inventory.par_weeks;
    for cat in SUPPLY_CATEGORIES {
        let entry = venue.inventory.stock.entry(cat.id.to_string()).or_default();
        entry.on_hand = (weekly_cogs * cat.split * par).max(0.0);
    }
}

impl InventoryModel for StandardCollaborators {
    fn inventory_tick(
        &self,
        venue: &mut Venue,
        _market: &SupplyMarket,
        request: ConsumptionRequest,
        draws: &Draws,
    ) -> InventoryEffect {
        let week = draws.week();
        let mut stream = draws.venue(&venue.id, "inventory");
        let mut effect = InventoryEffect::default();
        let shrink_mult = shrink_multiplier(week, venue.inventory.last_stocktake_week);
        let cogs = request.cogs.max(0.0);
        let pressure = clamp(request.covers as f64 / 180.0, 0.0, 1.0);

        for cat in SUPPLY_CATEGORIES {
            let stock = venue.inventory.stock.entry(cat.id.to_string()).or_default();

            let (due, pending): (Vec<PendingOrder>, Vec<PendingOrder>) = stock
                .orders
                .drain(..)
                .partition(|o| o.arrives_week <= week);
            stock.orders = pending;
            stock.on_hand += due.iter().map(|o| o.value).sum::<f64>();

            let lost = stock.on_hand * (cat.shrink * shrink_mult + cat.spoil);
            stock.on_hand -= lost;
            effect.waste += lost;

            let want = cogs * cat.split;
            let used = want.min(stock.on_hand);
            stock.on_hand -= used;
            let missing = want - used;
            if missing > 0.01 {
                effect.stockouts += 1;
                effect.emergency += missing
                    * (EMERGENCY_PREMIUM_BASE + EMERGENCY_PREMIUM_SPREAD * stream.next_f64());
                effect.sat_penalty += 1.0 + 2.0 * pressure;
                effect.speed_penalty += 0.8 + 1.6 * pressure;
            }
        }

        if venue.inventory.auto_reorder {
            let limit = max_on_hand(venue);
            let par = clamp(venue.inventory.par_weeks, PAR_WEEKS_MIN, PAR_WEEKS_MAX);
            let held: f64 = venue
                .inventory
                .stock
                .values()
                .map(|s| s.on_hand + incoming(s))
                .sum();
            let mut headroom = (limit - held).max(0.0);

            for cat in SUPPLY_CATEGORIES {
                let chosen = venue
                    .suppliers
                    .chosen
                    .get(cat.id)
                    .and_then(|id| supplier(id))
                    .or_else(|| cheapest_supplier(cat.id));
                let Some(stock) = venue.inventory.stock.get_mut(cat.id) else {
                    continue;
                };
                let need = cogs * cat.split * par - (stock.on_hand + incoming(stock));
                if need < MIN_ORDER || headroom < MIN_ORDER {
                    continue;
                }
                let value = need.min(headroom);
                headroom -= value;

                let (lead_days, reliability) = chosen.map_or((3, 0.8), |s| (s.lead_days, s.reliability));
                let mut lead = lead_days.div_ceil(7).max(1);
                if stream.next_f64() > reliability {
                    lead += 1;
                }
                stock.orders.push(PendingOrder {
                    value,
                    arrives_week: week + lead,
                });
            }
        }

        effect.sat_penalty = effect.sat_penalty.min(MAX_SAT_PENALTY);
        effect.speed_penalty = effect.speed_penalty.min(MAX_SPEED_PENALTY);
        for stock in venue.inventory.stock.values() {
            effect.on_hand += stock.on_hand;
            effect.incoming += incoming(stock);
        }

        debug!(
            venue = %venue.id,
            waste = effect.waste,
            stockouts = effect.stockouts,
            on_hand = effect.on_hand,
            "Inventory tick"
        );
        effect
    }
}

// ---- Player actions ----

/// Counts stock, resetting shrink to its lowest band.
pub fn stocktake(world: &mut WorldState, venue_id: &str) -> Result<(), ActionError> {
    let week = world.week;
    let mut cash = world.cash;
    charge(&mut cash, STOCKTAKE_COST)?;
    let venue = venue_entry(world, venue_id)?;
    venue.inventory.last_stocktake_week = Some(week);
    world.cash = cash;
    Ok(())
}

pub fn set_par_weeks(world: &mut WorldState, venue_id: &str, weeks: f64) -> Result<f64, ActionError> {
    let venue = venue_entry(world, venue_id)?;
    venue.inventory.par_weeks = clamp(weeks, PAR_WEEKS_MIN, PAR_WEEKS_MAX);
    Ok(venue.inventory.par_weeks)
}

pub fn set_auto_reorder(world: &mut WorldState, venue_id: &str, enabled: bool) -> Result<(), ActionError> {
    venue_entry(world, venue_id)?.inventory.auto_reorder = enabled;
    Ok(())
}

/// Raises storage one level. Returns the new level; already at the top is a
/// no-op.
pub fn upgrade_storage(world: &mut WorldState, venue_id: &str) -> Result<u8, ActionError> {
    let mut cash = world.cash;
    let venue = venue_entry(world, venue_id)?;
    let next = venue.inventory.storage_level as usize + 1;
    let Some(&(_, cost)) = STORAGE_LEVELS.get(next) else {
        return Ok(venue.inventory.storage_level);
    };
    charge(&mut cash, cost)?;
    venue.inventory.storage_level = next as u8;
    world.cash = cash;
    Ok(next as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::CannedSource;

    fn venue() -> Venue {
        Venue {
            id: "v_0001".into(),
            ..Default::default()
        }
    }

    fn tick(venue: &mut Venue, cogs: f64, covers: u32, week: u32, u: f64) -> InventoryEffect {
        let src = CannedSource::constant(u);
        StandardCollaborators.inventory_tick(
            venue,
            &SupplyMarket::default(),
            ConsumptionRequest { cogs, covers },
            &Draws::new(&src, week),
        )
    }

    #[test]
    fn test_shrink_bands() {
        assert_eq!(shrink_multiplier(10, None), 1.0);
        assert_eq!(shrink_multiplier(10, Some(9)), 0.35);
        assert_eq!(shrink_multiplier(10, Some(5)), 0.65);
        assert_eq!(shrink_multiplier(10, Some(1)), 1.0);
    }

    #[test]
    fn test_empty_stock_is_all_stockouts() {
        let mut v = venue();
        v.inventory.auto_reorder = false;
        let e = tick(&mut v, 10_000.0, 360, 0, 0.0);
        assert_eq!(e.stockouts, 6);
        assert_eq!(e.waste, 0.0);
        // 10_000 x 1.0 (splits) x 0.18
        assert!((e.emergency - 1_800.0).abs() < 1e-6);
        assert_eq!(e.sat_penalty, 10.0);
        assert_eq!(e.speed_penalty, 8.0);
    }

    #[test]
    fn test_seeded_stock_covers_a_week() {
        let mut v = venue();
        seed_stock(&mut v, 10_000.0);
        v.inventory.auto_reorder = false;
        let e = tick(&mut v, 10_000.0, 200, 0, 0.5);
        assert_eq!(e.stockouts, 0);
        assert!(e.waste > 0.0);
        assert!(e.on_hand > 0.0);
    }

    #[test]
    fn test_reorder_arrives_after_lead_time() {
        let mut v = venue();
        // u = 0.0 never exceeds reliability, so lead is ceil(days/7) = 1
        let e = tick(&mut v, 5_000.0, 100, 3, 0.0);
        assert!(e.incoming > 0.0);
        assert!(v.inventory.stock["meat"].orders.iter().all(|o| o.arrives_week == 4));

        let e = tick(&mut v, 0.0, 0, 4, 0.0);
        assert_eq!(e.incoming, 0.0);
        assert!(e.on_hand > 0.0);
    }

    #[test]
    fn test_unreliable_delivery_adds_a_week() {
        let mut v = venue();
        tick(&mut v, 5_000.0, 100, 3, 0.999);
        assert!(v.inventory.stock["meat"].orders.iter().all(|o| o.arrives_week == 5));
    }

    #[test]
    fn test_orders_respect_storage_limit() {
        let mut v = Venue {
            type_id: "food_truck".into(),
            ..venue()
        };
        tick(&mut v, 1_000_000.0, 100, 0, 0.0);
        let e = tick(&mut v, 0.0, 0, 0, 0.0);
        assert!(e.on_hand + e.incoming <= max_on_hand(&v) + 1e-6);
    }

    #[test]
    fn test_actions() {
        let mut world = WorldState {
            week: 7,
            cash: 1_000.0,
            venues: vec![venue()],
            ..Default::default()
        };
        stocktake(&mut world, "v_0001").unwrap();
        assert_eq!(world.cash, 750.0);
        assert_eq!(world.venues[0].inventory.last_stocktake_week, Some(7));
        assert_eq!(set_par_weeks(&mut world, "v_0001", 9.0), Ok(2.2));
        assert!(matches!(
            upgrade_storage(&mut world, "v_0001"),
            Err(ActionError::InsufficientCash { .. })
        ));
        world.cash = 400_000.0;
        for _ in 0..5 {
            upgrade_storage(&mut world, "v_0001").unwrap();
        }
        assert_eq!(world.venues[0].inventory.storage_level, 3);
        assert_eq!(world.cash, 400_000.0 - 205_000.0);
    }
}
