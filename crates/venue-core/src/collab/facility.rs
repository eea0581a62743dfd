//! Facility Model
//!
//! Building condition, maintenance spend, equipment breakdowns and
//! renovations. Maintenance is only paid when cash allows; energy is always
//! billed.

use tracing::{info, warn};
use venue_state::{EquipmentIssue, RenovationProgress, Venue, WorldState};

use super::{
    charge, venue_entry, FacilityEffects, FacilityModel, FacilityWeek, StandardCollaborators,
};
use crate::catalog::{equipment, equipment_for, renovation};
use crate::error::ActionError;
use crate::numeric::{clamp, clamp_score};
use crate::rng::Draws;

/// Constants for facility upkeep
pub mod facility_constants {
    pub const MAINTENANCE_MIN: f64 = 0.6;
    pub const MAINTENANCE_MAX: f64 = 1.5;
    /// Level decay when a week's maintenance goes unpaid
    pub const SKIPPED_DECAY: f64 = 0.95;
    /// Capacity while equipment is down or a renovation runs
    pub const DOWN_CAPACITY: f64 = 0.35;
    /// Below this condition the venue runs slower and burns more energy
    pub const WORN_CONDITION: f64 = 55.0;
    pub const WORN_SPEED_HIT: f64 = 3.0;
    pub const ENERGY_BASE: f64 = 350.0;
    pub const ENERGY_PER_COVER: f64 = 0.18;
    pub const WORN_ENERGY_FACTOR: f64 = 1.2;
    pub const RENOVATION_CONDITION: f64 = 18.0;
    pub const BREAKDOWN_MIN: f64 = 0.002;
    pub const BREAKDOWN_MAX: f64 = 0.22;
}

use facility_constants::*;

/// Weekly maintenance bill at the venue's current level.
pub fn maintenance_cost(venue: &Venue) -> f64 {
    let level = clamp(venue.facility.maintenance_level, MAINTENANCE_MIN, MAINTENANCE_MAX);
    equipment_for(&venue.type_id)
        .map(|e| e.maint_per_week * level)
        .sum()
}

/// Chance one piece of equipment fails this week.
pub fn breakdown_chance(base: f64, condition: f64, maintenance_level: f64) -> f64 {
    let cond_risk = if condition < 60.0 {
        (60.0 - condition) / 120.0
    } else {
        0.0
    };
    let maint_risk = if maintenance_level < 1.0 {
        (1.0 - maintenance_level) * 0.9
    } else {
        -(maintenance_level - 1.0) * 0.35
    };
    clamp(base + cond_risk + maint_risk, BREAKDOWN_MIN, BREAKDOWN_MAX)
}

impl FacilityModel for StandardCollaborators {
    fn facility_effects(&self, venue: &Venue) -> FacilityEffects {
        let fac = &venue.facility;
        let mut fx = FacilityEffects::default();
        for issue in &fac.issues {
            if let Some(e) = equipment(&issue.equipment_id) {
                fx.speed_hit += e.speed_hit;
                fx.food_hit += e.food_hit;
                fx.compliance_hit += e.compliance_hit;
            }
        }
        if fac.downtime_weeks > 0 || fac.renovation.is_some() {
            fx.capacity_multiplier = DOWN_CAPACITY;
        }
        if fac.condition < WORN_CONDITION {
            fx.speed_hit += WORN_SPEED_HIT;
        }
        fx
    }

    fn facility_tick(
        &self,
        venue: &mut Venue,
        covers: u32,
        cash_available: f64,
        draws: &Draws,
    ) -> FacilityWeek {
        let week = draws.week();
        let mut out = FacilityWeek::default();

        let cost = maintenance_cost(venue);
        let upkeep = if cash_available >= cost {
            out.maintenance_paid = cost;
            clamp(venue.facility.maintenance_level, MAINTENANCE_MIN, MAINTENANCE_MAX)
        } else {
            out.maintenance_skipped = Some(cost);
            venue.facility.maintenance_level = clamp(
                venue.facility.maintenance_level * SKIPPED_DECAY,
                MAINTENANCE_MIN,
                MAINTENANCE_MAX,
            );
            warn!(venue = %venue.id, cost, cash = cash_available, "Maintenance skipped");
            0.0
        };

        let load = clamp(covers as f64 / 120.0, 0.0, 2.0);
        venue.facility.condition =
            clamp_score(venue.facility.condition + 1.2 * upkeep - (1.4 + 1.2 * load));

        if let Some(reno) = venue.facility.renovation.as_mut() {
            reno.weeks_left = reno.weeks_left.saturating_sub(1);
            if reno.weeks_left == 0 {
                let id = reno.renovation_id.clone();
                venue.facility.renovation = None;
                if let Some(r) = renovation(&id) {
                    venue.local_reputation = clamp_score(venue.local_reputation + r.rep_boost);
                    venue.compliance = clamp_score(venue.compliance + r.compliance_boost);
                    venue.facility.condition =
                        clamp_score(venue.facility.condition + RENOVATION_CONDITION);
                }
                info!(venue = %venue.id, renovation = %id, "Renovation complete");
                out.renovation_completed = Some(id);
            }
        }

        venue.facility.downtime_weeks = venue.facility.downtime_weeks.saturating_sub(1);
        for issue in &mut venue.facility.issues {
            issue.downtime_weeks = issue.downtime_weeks.saturating_sub(1);
        }
        venue.facility.issues.retain(|i| i.downtime_weeks > 0);

        let mut stream = draws.venue(&venue.id, "facility");
        let condition = venue.facility.condition;
        let level = venue.facility.maintenance_level;
        for e in equipment_for(&venue.type_id) {
            let hit = stream.chance(breakdown_chance(e.breakdown_base, condition, level));
            let open = venue.facility.issues.iter().any(|i| i.equipment_id == e.id);
            if !hit || open {
                continue;
            }
            venue.facility.issues.push(EquipmentIssue {
                equipment_id: e.id.to_string(),
                downtime_weeks: e.downtime_weeks,
                opened_week: week,
            });
            venue.facility.downtime_weeks = venue.facility.downtime_weeks.max(e.downtime_weeks);
            info!(venue = %venue.id, equipment = e.id, "Equipment breakdown");
            out.breakdowns.push(e.id.to_string());
        }

        let worn = if venue.facility.condition < WORN_CONDITION {
            WORN_ENERGY_FACTOR
        } else {
            1.0
        };
        out.energy = (ENERGY_BASE + ENERGY_PER_COVER * covers as f64) * worn;
        out.condition = venue.facility.condition;
        out.downtime_weeks = venue.facility.downtime_weeks;
        out
    }
}

// ---- Player actions ----

/// Starts a renovation, paying its cost up front. The venue runs at reduced
/// capacity until it completes.
pub fn schedule_renovation(
    world: &mut WorldState,
    venue_id: &str,
    renovation_id: &str,
) -> Result<(), ActionError> {
    let reno = renovation(renovation_id)
        .ok_or_else(|| ActionError::UnknownRenovation(renovation_id.to_string()))?;
    let mut cash = world.cash;
    let venue = venue_entry(world, venue_id)?;
    if venue.facility.renovation.is_some() {
        return Err(ActionError::RenovationInProgress(venue_id.to_string()));
    }
    charge(&mut cash, reno.cost)?;
    venue.facility.renovation = Some(RenovationProgress {
        renovation_id: reno.id.to_string(),
        weeks_left: reno.weeks,
    });
    venue.facility.downtime_weeks = venue.facility.downtime_weeks.max(reno.weeks);
    world.cash = cash;
    info!(venue = venue_id, renovation = reno.id, cost = reno.cost, "Renovation scheduled");
    Ok(())
}

/// Abandons a renovation without refund. Returns whether one was running.
pub fn cancel_renovation(world: &mut WorldState, venue_id: &str) -> Result<bool, ActionError> {
    let venue = venue_entry(world, venue_id)?;
    Ok(venue.facility.renovation.take().is_some())
}

pub fn set_maintenance_level(
    world: &mut WorldState,
    venue_id: &str,
    level: f64,
) -> Result<f64, ActionError> {
    let venue = venue_entry(world, venue_id)?;
    venue.facility.maintenance_level = clamp(level, MAINTENANCE_MIN, MAINTENANCE_MAX);
    Ok(venue.facility.maintenance_level)
}
