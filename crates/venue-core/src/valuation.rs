//! Sale Valuation
//!
//! Prices the whole group on a multiple of seller's discretionary earnings
//! (SDE), with the fit-out asset value as a floor.

use serde::Serialize;
use venue_state::{InvestorKind, WorldState};

use crate::catalog::venue_type_or_default;
use crate::governance::{requires_sale_approval, total_outside_equity};
use crate::numeric::{clamp, mean, sample_variance};

/// Constants for sale pricing
pub mod valuation_constants {
    pub const BASE_MULTIPLE: f64 = 2.1;
    pub const MIN_MULTIPLE: f64 = 1.2;
    pub const MAX_MULTIPLE: f64 = 3.4;
    pub const PREFERRED_HAIRCUT: f64 = 0.07;
    pub const SALE_APPROVAL_HAIRCUT: f64 = 0.03;
}

use valuation_constants::*;

/// A sale estimate with the scores behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SaleValuation {
    pub sde_annual: f64,
    pub multiple: f64,
    pub sale_price: f64,
    /// Owner's share after outside equity
    pub owner_proceeds: f64,
    pub outside_equity: f64,
    pub owner_discount: f64,
    pub stability: f64,
    pub occupancy_risk: f64,
    pub prestige_bonus: f64,
    pub reputation_bonus: f64,
    pub asset_floor: f64,
}

/// Estimates what the group would sell for today.
pub fn estimate_sale(world: &WorldState) -> SaleValuation {
    let mut history: Vec<f64> = world.net_history.iter().collect();
    if history.is_empty() {
        history.push(world.last_week_net.unwrap_or(0.0));
    }
    let avg_net = mean(&history).unwrap_or(0.0);

    let add_back = clamp((100.0 - world.owner_dependence) / 100.0, 0.05, 0.55);
    let sde_annual = (avg_net * (1.0 + add_back * 0.35)).max(0.0) * 52.0;

    let prestige_bonus = clamp((world.prestige - 40.0) / 200.0, 0.0, 0.25);
    let reputation_bonus = clamp((world.reputation - 50.0) / 250.0, -0.08, 0.18);

    let spread = sample_variance(&history).sqrt();
    let stability = clamp(100.0 - spread / avg_net.abs().max(1.0) * 80.0, 5.0, 95.0);

    let occ_avg = if world.venues.is_empty() {
        0.09
    } else {
        world.venues.iter().map(|v| v.occupancy_pct).sum::<f64>() / world.venues.len() as f64
    };
    let occupancy_risk = clamp((occ_avg - 0.07) * 800.0 + 35.0, 5.0, 95.0);
    let owner_discount = clamp(world.owner_dependence / 180.0, 0.05, 0.55);

    let multiple = clamp(
        BASE_MULTIPLE + prestige_bonus * 2.0 + reputation_bonus * 1.2 + (stability - 60.0) / 200.0
            - (occupancy_risk - 40.0) / 220.0,
        MIN_MULTIPLE,
        MAX_MULTIPLE,
    ) * (1.0 - owner_discount * 0.35);

    let preferred = world
        .investors
        .iter()
        .any(|i| i.kind == InvestorKind::Preferred);
    let complexity = if preferred { PREFERRED_HAIRCUT } else { 0.0 };
    let approval = if requires_sale_approval(world) {
        SALE_APPROVAL_HAIRCUT
    } else {
        0.0
    };

    let asset_floor = world
        .venues
        .iter()
        .map(|v| venue_type_or_default(&v.type_id).capex_base * (v.fitout_quality / 100.0) * 0.35)
        .sum::<f64>()
        * 0.6;
    let sale_price =
        (sde_annual * multiple * (1.0 - complexity) * (1.0 - approval)).max(asset_floor);
    let outside_equity = total_outside_equity(world);

    SaleValuation {
        sde_annual,
        multiple,
        sale_price,
        owner_proceeds: sale_price * (1.0 - outside_equity),
        outside_equity,
        owner_discount,
        stability,
        occupancy_risk,
        prestige_bonus,
        reputation_bonus,
        asset_floor,
    }
}
