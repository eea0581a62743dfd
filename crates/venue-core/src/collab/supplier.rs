//! Supplier Model
//!
//! Shared market price indices, per-venue supplier pricing with stockout
//! risk, and group purchasing contracts.

use tracing::{debug, info};
use venue_state::{SupplyContract, SupplyMarket, Venue, WeekEvent, WorldState};

use super::{charge, venue_entry, StandardCollaborators, SupplierModel, SupplyEffect};
use crate::catalog::{cheapest_supplier, supplier, supply_category, Supplier, SUPPLY_CATEGORIES};
use crate::error::ActionError;
use crate::numeric::clamp;
use crate::rng::Draws;

/// Constants for supply pricing
pub mod supply_constants {
    /// Weekly pull of each index back toward 1.0
    pub const MEAN_REVERSION: f64 = 0.15;
    pub const INDEX_MIN: f64 = 0.78;
    pub const INDEX_MAX: f64 = 1.55;
    pub const EFFECTIVE_MIN: f64 = 0.70;
    pub const EFFECTIVE_MAX: f64 = 1.70;
    pub const STOCKOUT_MIN: f64 = 0.02;
    pub const STOCKOUT_MAX: f64 = 0.22;
    pub const EMERGENCY_BASE: f64 = 0.18;
    pub const EMERGENCY_SPREAD: f64 = 0.18;
    pub const CONTRACT_MIN_WEEKS: u32 = 4;
    pub const CONTRACT_MAX_WEEKS: u32 = 26;
    pub const CONTRACT_BREAK_FEE: f64 = 1_500.0;
}

use supply_constants::*;

/// Current index for a category, defaulting to 1.0 for a missing entry.
pub fn market_index(market: &SupplyMarket, category: &str) -> f64 {
    market.index.get(category).copied().unwrap_or(1.0)
}

/// Resolves the supplier serving `category` for a venue.
fn resolve_supplier(
    venue: &Venue,
    market: &SupplyMarket,
    category: &str,
) -> Option<(&'static Supplier, f64)> {
    if market.central_purchasing {
        if let Some(contract) = market.contracts.get(category) {
            if let Some(s) = supplier(&contract.supplier_id) {
                return Some((s, contract.discount));
            }
        }
    }
    let chosen = venue
        .suppliers
        .chosen
        .get(category)
        .and_then(|id| supplier(id))
        .filter(|s| s.category == category)
        .or_else(|| cheapest_supplier(category))?;
    let discount = market
        .contracts
        .get(category)
        .filter(|c| c.supplier_id == chosen.id)
        .map_or(0.0, |c| c.discount);
    Some((chosen, discount))
}

fn stockout_chance(reliability: f64, index: f64) -> f64 {
    let tight = clamp((index - 1.0) * 0.9, 0.0, 0.6);
    clamp(
        (1.0 - reliability) * 0.55 + tight * 0.25,
        STOCKOUT_MIN,
        STOCKOUT_MAX,
    )
}

impl SupplierModel for StandardCollaborators {
    fn advance_market(&self, market: &mut SupplyMarket, draws: &Draws) -> Vec<WeekEvent> {
        let mut events = Vec::new();

        for cat in SUPPLY_CATEGORIES {
            let mut stream = draws.stream(&format!("market:{}", cat.id));
            let mut idx = market_index(market, cat.id);
            idx += (1.0 - idx) * MEAN_REVERSION;
            idx *= 1.0 + (2.0 * stream.next_f64() - 1.0) * cat.price_vol;
            if stream.chance(cat.shock_chance) {
                idx *= 1.0 + 0.06 + 0.22 * stream.next_f64();
                let idx = clamp(idx, INDEX_MIN, INDEX_MAX);
                info!(category = cat.id, index = idx, "Supply shock");
                events.push(WeekEvent::SupplyShock {
                    category: cat.id.to_string(),
                    index: idx,
                });
            }
            market
                .index
                .insert(cat.id.to_string(), clamp(idx, INDEX_MIN, INDEX_MAX));
        }

        for contract in market.contracts.values_mut() {
            contract.weeks_left = contract.weeks_left.saturating_sub(1);
        }
        let expired: Vec<String> = market
            .contracts
            .iter()
            .filter(|(_, c)| c.weeks_left == 0)
            .map(|(k, _)| k.clone())
            .collect();
        for category in expired {
            if let Some(c) = market.contracts.remove(&category) {
                info!(category = %category, supplier = %c.supplier_id, "Contract expired");
                events.push(WeekEvent::ContractExpired {
                    category,
                    supplier_id: c.supplier_id,
                });
            }
        }

        events
    }

    fn supply_effect(
        &self,
        venue: &mut Venue,
        market: &SupplyMarket,
        base_cogs: f64,
        draws: &Draws,
    ) -> SupplyEffect {
        let base = base_cogs.max(0.0);
        let mut effect = SupplyEffect {
            index_avg: 0.0,
            ..Default::default()
        };
        let mut weight_sum = 0.0;

        for cat in SUPPLY_CATEGORIES {
            let Some((chosen, discount)) = resolve_supplier(venue, market, cat.id) else {
                continue;
            };
            venue
                .suppliers
                .chosen
                .insert(cat.id.to_string(), chosen.id.to_string());

            let idx = market_index(market, cat.id);
            let eff = clamp(
                chosen.base_price * idx * (1.0 - discount),
                EFFECTIVE_MIN,
                EFFECTIVE_MAX,
            );
            let share = base * cat.weight;
            effect.contracted += share * eff;
            effect.index_avg += cat.weight * eff;
            weight_sum += cat.weight;

            let mut stream = draws.venue(&venue.id, &format!("supply:{}", cat.id));
            if stream.chance(stockout_chance(chosen.reliability, idx)) {
                effect.stockouts += 1;
                effect.emergency += share * (EMERGENCY_BASE + EMERGENCY_SPREAD * stream.next_f64());
            }
        }

        effect.index_avg = if weight_sum > 0.0 {
            effect.index_avg / weight_sum
        } else {
            1.0
        };
        effect.sat_penalty = (effect.stockouts as f64 * 1.6).min(8.0);
        effect.speed_penalty = (effect.stockouts as f64).min(6.0);

        if effect.stockouts > 0 {
            debug!(venue = %venue.id, stockouts = effect.stockouts, emergency = effect.emergency, "Supplier stockouts");
        }
        effect
    }
}

/// Discount for a contract of `term_weeks` covering `venue_count` venues.
pub fn contract_discount(term_weeks: u32, venue_count: usize) -> f64 {
    let term = clamp_term(term_weeks);
    let tier = if term >= 26 {
        0.06
    } else if term >= 12 {
        0.04
    } else {
        0.02
    };
    let scale = clamp((venue_count.max(1) as f64).log2() * 0.02, 0.0, 0.07);
    clamp(tier + scale, 0.02, 0.12)
}

fn clamp_term(term_weeks: u32) -> u32 {
    term_weeks.clamp(CONTRACT_MIN_WEEKS, CONTRACT_MAX_WEEKS)
}

fn check_supplier(category: &str, supplier_id: &str) -> Result<(), ActionError> {
    if supply_category(category).is_none() {
        return Err(ActionError::UnknownCategory(category.to_string()));
    }
    match supplier(supplier_id) {
        Some(s) if s.category == category => Ok(()),
        _ => Err(ActionError::UnknownSupplier {
            category: category.to_string(),
            supplier: supplier_id.to_string(),
        }),
    }
}

// ---- Player actions ----

/// Chooses the supplier a venue buys `category` from.
pub fn set_supplier(
    world: &mut WorldState,
    venue_id: &str,
    category: &str,
    supplier_id: &str,
) -> Result<(), ActionError> {
    check_supplier(category, supplier_id)?;
    let venue = venue_entry(world, venue_id)?;
    venue
        .suppliers
        .chosen
        .insert(category.to_string(), supplier_id.to_string());
    Ok(())
}

/// Routes every venue's purchasing through group contracts.
pub fn set_central_purchasing(world: &mut WorldState, enabled: bool) {
    world.supply.central_purchasing = enabled;
}

/// Signs (or replaces) the group contract for a category. Returns the
/// negotiated discount.
pub fn sign_contract(
    world: &mut WorldState,
    category: &str,
    supplier_id: &str,
    term_weeks: u32,
) -> Result<f64, ActionError> {
    check_supplier(category, supplier_id)?;
    let term = clamp_term(term_weeks);
    let discount = contract_discount(term, world.venues.len());
    world.supply.contracts.insert(
        category.to_string(),
        SupplyContract {
            supplier_id: supplier_id.to_string(),
            term_weeks: term,
            weeks_left: term,
            discount,
            started_week: world.week,
        },
    );
    info!(category, supplier = supplier_id, term, discount, "Contract signed");
    Ok(discount)
}

/// Ends a contract early for a flat fee.
pub fn break_contract(world: &mut WorldState, category: &str) -> Result<f64, ActionError> {
    if !world.supply.contracts.contains_key(category) {
        return Err(ActionError::UnknownCategory(category.to_string()));
    }
    charge(&mut world.cash, CONTRACT_BREAK_FEE)?;
    world.supply.contracts.remove(category);
    info!(category, fee = CONTRACT_BREAK_FEE, "Contract broken");
    Ok(CONTRACT_BREAK_FEE)
}
