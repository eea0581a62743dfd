//! Staff Model
//!
//! Blends base venue skills with named hires and training, prices the
//! weekly wage bill, and runs roster pressure and burnout drift.

use tracing::{debug, info};
use venue_state::{Hire, Roster, SkillSet, StaffRole, Venue, WorldState};

use super::{
    charge, venue_entry, EffectiveSkillProfile, MenuMetrics, StaffModel, StaffingOutcome,
    StandardCollaborators,
};
use crate::catalog::{trait_modifiers, TraitModifiers, TRAINING_AREAS};
use crate::error::ActionError;
use crate::numeric::{clamp, clamp_score, round_half_up};
use crate::rng::Draws;

/// Constants for staffing
pub mod staff_constants {
    /// One-off recruitment fee per hire
    pub const HIRE_FEE: f64 = 500.0;
    /// Weeks of wage paid out on dismissal
    pub const SEVERANCE_WEEKS: f64 = 0.5;
    /// Skill points per training level
    pub const TRAINING_STEP: f64 = 1.1;
    pub const MAX_TRAINING_LEVEL: u8 = 10;
    /// Weekly wage per head on a line station
    pub const LINE_STATION_WAGE: f64 = 950.0;
    /// Weekly wage per prep cook
    pub const PREP_STATION_WAGE: f64 = 850.0;
    pub const MAX_STATION_HEADS: u32 = 6;
    pub const KITCHEN_HOURLY: f64 = 32.0;
    pub const FOH_HOURLY: f64 = 28.0;
    pub const BAR_HOURLY: f64 = 30.0;
    /// Variable labor shifts into fixed wages while a roster runs
    pub const ROSTER_LABOR_ADJUST: f64 = -0.07;
    pub const SICK_WEEK_CHANCE: f64 = 0.06;
    pub const SICK_WEEK_BURNOUT: f64 = 82.0;
    /// Stress never saturates from roster pressure alone
    pub const ROSTER_STRESS_CAP: f64 = 95.0;
}

use staff_constants::*;

/// Execution multiplier from burnout.
pub fn burnout_multiplier(burnout: f64) -> f64 {
    clamp(1.0 - burnout / 333.0, 0.7, 1.0)
}

fn training_bonus(level: u8) -> f64 {
    level.min(MAX_TRAINING_LEVEL) as f64 * TRAINING_STEP
}

/// Skill profile before any engine-side adjustment.
pub fn effective_skills(venue: &Venue) -> EffectiveSkillProfile {
    let or = |v: f64, fallback: f64| if v > 0.0 { v } else { fallback };
    let mut s = SkillSet {
        ops: or(venue.manager_skill, 45.0),
        finance: or(venue.procurement_skill, 35.0),
        people: or(venue.manager_skill, 45.0),
        standards: or(venue.cleanliness, 55.0),
        culinary: or(venue.chef_skill, 48.0),
        consistency: 55.0,
        cost: or(venue.procurement_skill, 35.0),
        pace: 50.0,
        service: 50.0,
        recovery: 50.0,
    };

    let staff = &venue.staff;
    if let Some(gm) = &staff.gm {
        s.ops = clamp_score(s.ops + gm.skills.ops * 0.55);
        s.finance = clamp_score(s.finance + gm.skills.finance * 0.45);
        s.people = clamp_score(s.people + gm.skills.people * 0.55);
        s.standards = clamp_score(s.standards + gm.skills.standards * 0.55);
    }
    if let Some(chef) = &staff.chef {
        s.culinary = clamp_score(s.culinary + chef.skills.culinary * 0.60);
        s.consistency = clamp_score(s.consistency + chef.skills.consistency * 0.60);
        s.cost = clamp_score(s.cost + chef.skills.cost * 0.55);
    }
    if let Some(foh) = &staff.foh {
        s.service = clamp_score(s.service + foh.skills.service * 0.60);
        s.pace = clamp_score(s.pace + foh.skills.pace * 0.60);
        s.recovery = clamp_score(s.recovery + foh.skills.recovery * 0.60);
    }

    let t = &staff.training;
    let ops = training_bonus(t.ops);
    let cost = training_bonus(t.cost);
    let consistency = training_bonus(t.consistency);
    let pace = training_bonus(t.pace);
    s.ops = clamp_score(s.ops + ops);
    s.finance = clamp_score(s.finance + ops * 0.6 + cost * 0.6);
    s.people = clamp_score(s.people + ops * 0.6);
    s.culinary = clamp_score(s.culinary + consistency * 0.7);
    s.consistency = clamp_score(s.consistency + consistency);
    s.cost = clamp_score(s.cost + cost);
    s.pace = clamp_score(s.pace + pace);
    s.service = clamp_score(s.service + pace * 0.6);
    s.recovery = clamp_score(s.recovery + pace * 0.6);
    s.standards = clamp_score(s.standards + training_bonus(t.standards));

    let mult = burnout_multiplier(venue.burnout);
    for axis in [
        &mut s.ops,
        &mut s.finance,
        &mut s.people,
        &mut s.standards,
        &mut s.culinary,
        &mut s.consistency,
        &mut s.cost,
        &mut s.pace,
        &mut s.service,
        &mut s.recovery,
    ] {
        *axis = clamp_score(*axis * mult);
    }

    EffectiveSkillProfile {
        skills: s,
        burnout_multiplier: mult,
    }
}

/// Weekly cost of the hourly roster, zero while disabled.
pub fn roster_weekly_cost(roster: &Roster) -> f64 {
    if !roster.enabled {
        return 0.0;
    }
    let days = roster.open_days.clamp(2, 7) as f64;
    let shifts = roster.shifts_per_day.clamp(1, 2) as f64;
    let hours = roster.hours_per_shift.clamp(4, 8) as f64;
    let k = roster.kitchen_per_shift.min(12) as f64;
    let f = roster.foh_per_shift.min(14) as f64;
    let b = roster.bar_per_shift.min(10) as f64;
    round_half_up(days * shifts * hours * (k * KITCHEN_HOURLY + f * FOH_HOURLY + b * BAR_HOURLY))
}

/// Recommended crew per shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrewPlan {
    pub kitchen: u32,
    pub foh: u32,
    pub bar: u32,
}

/// Rule-of-thumb crew for a week's covers and menu load.
pub fn recommended_per_shift(menu_style: &str, covers: u32, menu: &MenuMetrics) -> CrewPlan {
    let c = covers.min(9999) as f64;
    let prep = clamp(menu.prep_load, 0.0, 100.0);
    let imb = clamp(menu.station_imbalance, 0.0, 100.0);
    let kitchen = clamp(
        round_half_up(2.0 + c / 45.0 + (prep - 55.0) / 35.0 + (imb - 50.0) / 60.0),
        2.0,
        10.0,
    );
    let foh = clamp(round_half_up(2.0 + c / 40.0), 2.0, 12.0);
    let bar = if matches!(menu_style, "pub" | "casual" | "hotel" | "winery") {
        clamp(round_half_up(1.0 + c / 120.0), 1.0, 6.0)
    } else {
        clamp(round_half_up(c / 220.0), 0.0, 4.0)
    };
    CrewPlan {
        kitchen: kitchen as u32,
        foh: foh as u32,
        bar: bar as u32,
    }
}

fn station_wages(venue: &Venue) -> f64 {
    let st = &venue.staff.stations;
    st.line_heads() as f64 * LINE_STATION_WAGE + st.prep as f64 * PREP_STATION_WAGE
}

impl StaffModel for StandardCollaborators {
    fn effective_skills(&self, venue: &Venue) -> EffectiveSkillProfile {
        effective_skills(venue)
    }

    fn trait_modifiers(&self, venue: &Venue) -> TraitModifiers {
        let mut mods = TraitModifiers::default();
        for hire in venue.staff.hires() {
            for id in &hire.traits {
                if let Some(m) = trait_modifiers(id) {
                    mods.add(m);
                }
            }
        }
        mods
    }

    fn fixed_wages(&self, venue: &Venue) -> f64 {
        let named: f64 = venue.staff.hires().map(|h| h.wage_weekly.max(0.0)).sum();
        named + station_wages(venue) + roster_weekly_cost(&venue.staff.roster)
    }

    fn staffing_week(
        &self,
        venue: &mut Venue,
        covers: u32,
        menu: &MenuMetrics,
        skills: &EffectiveSkillProfile,
        draws: &Draws,
    ) -> StaffingOutcome {
        let roster = venue.staff.roster.clone();
        if !roster.enabled || !menu.has_menu {
            return StaffingOutcome::default();
        }

        let rec = recommended_per_shift(&venue.menu.style, covers, menu);
        let rk = clamp(roster.kitchen_per_shift as f64 / rec.kitchen.max(1) as f64, 0.55, 1.5);
        let rf = clamp(roster.foh_per_shift as f64 / rec.foh.max(1) as f64, 0.55, 1.5);
        let rb = if rec.bar == 0 {
            1.0
        } else {
            clamp(roster.bar_per_shift as f64 / rec.bar as f64, 0.55, 1.5)
        };
        let mut factor = clamp(rk * 0.45 + rf * 0.45 + rb * 0.10, 0.65, 1.35);

        venue.staff_stress = clamp(venue.staff_stress + (1.0 - factor) * 14.0, 0.0, ROSTER_STRESS_CAP);

        let demand_pressure = clamp(covers as f64 / 140.0 * 2.4, 0.0, 6.0);
        let complexity_pressure = clamp(
            (menu.prep_load - 55.0) / 22.0 + (menu.station_imbalance - 55.0) / 55.0,
            -3.0,
            7.0,
        );
        let standards_relief = clamp((skills.skills.standards - 50.0) * 0.06, -5.0, 7.0);
        let delta = clamp(
            demand_pressure + complexity_pressure + (1.0 - factor) * 10.0 - (factor - 1.0) * 3.0
                - standards_relief,
            -8.0,
            14.0,
        );
        venue.burnout = clamp_score(venue.burnout + delta);
        venue.morale = clamp_score(clamp_score(78.0 - venue.burnout * 0.55) + (factor - 1.0) * 6.0);

        let mut sick_week = false;
        if venue.burnout > SICK_WEEK_BURNOUT
            && draws.venue(&venue.id, "staff").chance(SICK_WEEK_CHANCE)
        {
            factor = clamp(factor - 0.12, 0.55, 1.35);
            venue.staff_stress = clamp(venue.staff_stress + 6.0, 0.0, ROSTER_STRESS_CAP);
            sick_week = true;
            info!(venue = %venue.id, burnout = venue.burnout, "Sick week");
        }

        debug!(venue = %venue.id, factor, burnout = venue.burnout, "Roster staffing");
        StaffingOutcome {
            factor,
            labor_adjust: ROSTER_LABOR_ADJUST,
            sick_week,
        }
    }
}

// ---- Player actions ----

fn delegation_flag(venue: &mut Venue, role: StaffRole) -> &mut bool {
    let d = &mut venue.staff.delegation;
    match role {
        StaffRole::Gm => &mut d.ops,
        StaffRole::Chef => &mut d.menu,
        StaffRole::Foh => &mut d.foh,
    }
}

/// Puts `hire` into its role, replacing any incumbent, and delegates that
/// role's area to them.
pub fn hire(world: &mut WorldState, venue_id: &str, hire: Hire) -> Result<(), ActionError> {
    let mut cash = world.cash;
    charge(&mut cash, HIRE_FEE)?;
    let venue = venue_entry(world, venue_id)?;
    let role = hire.role;
    info!(venue = %venue_id, role = ?role, name = %hire.name, "Hired");
    *venue.staff.slot_mut(role) = Some(hire);
    *delegation_flag(venue, role) = true;
    world.cash = cash;
    Ok(())
}

/// Dismisses the holder of `role`, paying severance. Returns the amount paid.
pub fn fire(world: &mut WorldState, venue_id: &str, role: StaffRole) -> Result<f64, ActionError> {
    let cash = world.cash;
    let venue = venue_entry(world, venue_id)?;
    let Some(current) = venue.staff.slot(role).as_ref() else {
        return Ok(0.0);
    };
    let severance = current.wage_weekly.max(0.0) * SEVERANCE_WEEKS;
    if cash < severance {
        return Err(ActionError::InsufficientCash {
            cost: severance,
            cash,
        });
    }
    *venue.staff.slot_mut(role) = None;
    *delegation_flag(venue, role) = false;
    world.cash -= severance;
    Ok(severance)
}

/// Toggles delegation for a role's area. Delegation only takes effect
/// while someone holds the role.
pub fn set_delegation(
    world: &mut WorldState,
    venue_id: &str,
    role: StaffRole,
    on: bool,
) -> Result<(), ActionError> {
    let venue = venue_entry(world, venue_id)?;
    *delegation_flag(venue, role) = on;
    Ok(())
}

/// Adds or removes heads on a station. Returns the new head count.
pub fn adjust_station_staff(
    world: &mut WorldState,
    venue_id: &str,
    station: &str,
    delta: i32,
) -> Result<u32, ActionError> {
    let venue = venue_entry(world, venue_id)?;
    let heads = venue
        .staff
        .stations
        .get_mut(station)
        .ok_or_else(|| ActionError::UnknownStation(station.to_string()))?;
    *heads = (*heads as i64 + delta as i64).clamp(0, MAX_STATION_HEADS as i64) as u32;
    Ok(*heads)
}

/// Buys one training level in `area`. Returns the new level; a maxed area
/// costs nothing.
pub fn train(world: &mut WorldState, venue_id: &str, area: &str) -> Result<u8, ActionError> {
    let cost = TRAINING_AREAS
        .iter()
        .find(|(id, _)| *id == area)
        .map(|(_, c)| *c)
        .ok_or_else(|| ActionError::UnknownTrainingArea(area.to_string()))?;
    let mut cash = world.cash;
    let venue = venue_entry(world, venue_id)?;
    let t = &mut venue.staff.training;
    let level = match area {
        "ops" => &mut t.ops,
        "consistency" => &mut t.consistency,
        "cost" => &mut t.cost,
        "pace" => &mut t.pace,
        _ => &mut t.standards,
    };
    if *level >= MAX_TRAINING_LEVEL {
        return Ok(*level);
    }
    charge(&mut cash, cost)?;
    *level += 1;
    let new_level = *level;
    world.cash = cash;
    Ok(new_level)
}

/// Replaces the roster, clamping every field into its workable range.
pub fn configure_roster(
    world: &mut WorldState,
    venue_id: &str,
    roster: Roster,
) -> Result<(), ActionError> {
    let venue = venue_entry(world, venue_id)?;
    venue.staff.roster = Roster {
        enabled: roster.enabled,
        open_days: roster.open_days.clamp(2, 7),
        shifts_per_day: roster.shifts_per_day.clamp(1, 2),
        hours_per_shift: roster.hours_per_shift.clamp(4, 8),
        kitchen_per_shift: roster.kitchen_per_shift.min(12),
        foh_per_shift: roster.foh_per_shift.min(14),
        bar_per_shift: roster.bar_per_shift.min(10),
    };
    Ok(())
}
