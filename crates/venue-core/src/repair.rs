//! State Repair
//!
//! Every persisted shape implements [`Repairable`]. The orchestrator calls
//! `ensure_defaults` on the world once at the top of each tick, and the world
//! cascades into its venues and their sub-states. Repair never fails: out of
//! range values are clamped, unknown catalog ids fall back to their default,
//! and missing market entries are filled in.

use tracing::debug;
use venue_state::{
    ComplianceRecord, FacilityState, FeedbackState, FixedAsset, InventoryState, Investor, Loan,
    MenuState, PromotionState, QuestBoard, Roster, StaffState, SupplyMarket, Venue, WorldState,
};

use crate::catalog::{
    city, concept, supply_category, venue_type, CITIES, STORAGE_LEVELS, SUPPLY_CATEGORIES,
};
use crate::collab::facility::facility_constants::{MAINTENANCE_MAX, MAINTENANCE_MIN};
use crate::collab::feedback::feedback_constants::REVIEW_HISTORY;
use crate::collab::inventory::inventory_constants::{PAR_WEEKS_MAX, PAR_WEEKS_MIN};
use crate::collab::staff::staff_constants::{MAX_STATION_HEADS, MAX_TRAINING_LEVEL};
use crate::collab::supplier::supply_constants::{INDEX_MAX, INDEX_MIN};
use crate::engine::engine_constants::{MAX_REGULARS, OCCUPANCY_MAX, OCCUPANCY_MIN, WASTE_MAX, WASTE_MIN};
use crate::governance::governance_constants::{MAX_OUTSIDE_EQUITY, MAX_PAYOUT_RATIO};
use crate::ledger::weekly_payment;
use crate::numeric::{clamp, clamp_score};
use crate::quests::{quest_constants::MAX_ACTIVE, quest_def};

/// Bounds that only matter to repair
pub mod repair_constants {
    pub const PRICE_POSITION_MIN: f64 = -20.0;
    pub const PRICE_POSITION_MAX: f64 = 40.0;
    pub const TAX_RATE_MAX: f64 = 0.60;
    pub const MAX_OPEN_DAYS: u32 = 7;
    pub const MAX_SHIFTS: u32 = 3;
    pub const MAX_SHIFT_HOURS: u32 = 12;
    pub const MAX_CREW_PER_SHIFT: u32 = 12;
    pub const LEASE_YEARS_MAX: f64 = 30.0;
}

use repair_constants::*;

/// A persisted shape that can restore its own documented defaults.
pub trait Repairable {
    fn ensure_defaults(&mut self);
}

/// Replaces NaN and infinities with `fallback`.
fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}

/// Numeric suffix of a sequential id such as `ln_000012`.
fn id_suffix(id: &str) -> Option<u64> {
    id.rsplit('_').next()?.parse().ok()
}

impl Repairable for WorldState {
    fn ensure_defaults(&mut self) {
        self.cash = finite_or(self.cash, 0.0);
        self.reputation = clamp_score(self.reputation);
        self.prestige = clamp_score(self.prestige);
        self.owner_dependence = clamp_score(self.owner_dependence);
        self.board_pressure = clamp_score(self.board_pressure);
        self.tax_rate = clamp(self.tax_rate, 0.0, TAX_RATE_MAX);
        self.tax_accrued = finite_or(self.tax_accrued, 0.0).max(0.0);
        self.retained_earnings = finite_or(self.retained_earnings, 0.0);
        self.payout_ratio = clamp(self.payout_ratio, 0.0, MAX_PAYOUT_RATIO);
        self.net_history.truncate();
        if city(&self.home_city).is_none() {
            self.home_city = CITIES[0].id.to_string();
        }

        self.supply.ensure_defaults();
        self.quests.ensure_defaults();
        self.loans.iter_mut().for_each(Repairable::ensure_defaults);
        self.fixed_assets.iter_mut().for_each(Repairable::ensure_defaults);
        self.investors.iter_mut().for_each(Repairable::ensure_defaults);
        self.venues.iter_mut().for_each(Repairable::ensure_defaults);

        // Keep outside equity under its cap, scaling every holder down evenly.
        let equity: f64 = self.investors.iter().map(|i| i.equity).sum();
        if equity > MAX_OUTSIDE_EQUITY {
            let scale = MAX_OUTSIDE_EQUITY / equity;
            for inv in self.investors.iter_mut() {
                inv.equity *= scale;
            }
        }

        // The id counter must sit above every id already handed out.
        let highest = self
            .venues
            .iter()
            .map(|v| v.id.as_str())
            .chain(self.loans.iter().map(|l| l.id.as_str()))
            .chain(self.fixed_assets.iter().map(|a| a.id.as_str()))
            .chain(self.investors.iter().map(|i| i.id.as_str()))
            .chain(self.quests.active.iter().map(|q| q.id.as_str()))
            .filter_map(id_suffix)
            .max()
            .unwrap_or(0);
        if self.next_seq <= highest {
            self.next_seq = highest + 1;
        }
        for i in 0..self.venues.len() {
            if self.venues[i].id.is_empty() {
                let id = venue_state::generate_venue_id(self.next_sequence());
                debug!(venue = %id, "Assigned missing venue id");
                self.venues[i].id = id;
            }
        }
    }
}

impl Repairable for Venue {
    fn ensure_defaults(&mut self) {
        if venue_type(&self.type_id).is_none() {
            self.type_id = Venue::default().type_id;
        }
        if concept(&self.concept_id).is_none() {
            self.concept_id = Venue::default().concept_id;
        }
        self.price_position = clamp(self.price_position, PRICE_POSITION_MIN, PRICE_POSITION_MAX);
        self.occupancy_pct = clamp(self.occupancy_pct, OCCUPANCY_MIN, OCCUPANCY_MAX);
        self.waste_pct = clamp(self.waste_pct, WASTE_MIN, WASTE_MAX);
        self.regulars = self.regulars.min(MAX_REGULARS);
        self.lease_years_remaining = clamp(self.lease_years_remaining, 0.0, LEASE_YEARS_MAX);
        self.review_buzz = finite_or(self.review_buzz, 0.0);
        self.purchase_price = finite_or(self.purchase_price, 0.0).max(0.0);

        for score in [
            &mut self.foot_traffic,
            &mut self.fitout_quality,
            &mut self.popularity,
            &mut self.chef_skill,
            &mut self.manager_skill,
            &mut self.cleanliness,
            &mut self.procurement_skill,
            &mut self.local_reputation,
            &mut self.staff_stress,
            &mut self.burnout,
            &mut self.morale,
            &mut self.compliance,
        ] {
            *score = clamp_score(*score);
        }
        let s = &mut self.satisfaction;
        for score in [
            &mut s.food,
            &mut s.speed,
            &mut s.value,
            &mut s.clean,
            &mut s.vibe,
            &mut s.composite,
        ] {
            *score = clamp_score(*score);
        }

        self.staff.ensure_defaults();
        self.menu.ensure_defaults();
        self.inventory.ensure_defaults();
        self.facility.ensure_defaults();
        self.promotions.ensure_defaults();
        self.feedback.ensure_defaults();
        self.compliance_record.ensure_defaults();
        self.suppliers
            .chosen
            .retain(|category, _| supply_category(category).is_some());
    }
}

impl Repairable for StaffState {
    fn ensure_defaults(&mut self) {
        for hire in [&mut self.gm, &mut self.chef, &mut self.foh].into_iter().flatten() {
            hire.wage_weekly = finite_or(hire.wage_weekly, 0.0).max(0.0);
            let k = &mut hire.skills;
            for skill in [
                &mut k.ops,
                &mut k.finance,
                &mut k.people,
                &mut k.standards,
                &mut k.culinary,
                &mut k.consistency,
                &mut k.cost,
                &mut k.pace,
                &mut k.service,
                &mut k.recovery,
            ] {
                *skill = clamp_score(*skill);
            }
        }

        let st = &mut self.stations;
        for heads in [
            &mut st.cold,
            &mut st.pan,
            &mut st.grill,
            &mut st.fryer,
            &mut st.pastry,
            &mut st.bar,
            &mut st.coffee,
            &mut st.prep,
        ] {
            *heads = (*heads).min(MAX_STATION_HEADS);
        }

        let t = &mut self.training;
        for level in [&mut t.ops, &mut t.consistency, &mut t.cost, &mut t.pace, &mut t.standards] {
            *level = (*level).min(MAX_TRAINING_LEVEL);
        }

        self.roster.ensure_defaults();
    }
}

impl Repairable for Roster {
    fn ensure_defaults(&mut self) {
        self.open_days = self.open_days.clamp(1, MAX_OPEN_DAYS);
        self.shifts_per_day = self.shifts_per_day.clamp(1, MAX_SHIFTS);
        self.hours_per_shift = self.hours_per_shift.clamp(1, MAX_SHIFT_HOURS);
        self.kitchen_per_shift = self.kitchen_per_shift.min(MAX_CREW_PER_SHIFT);
        self.foh_per_shift = self.foh_per_shift.min(MAX_CREW_PER_SHIFT);
        self.bar_per_shift = self.bar_per_shift.min(MAX_CREW_PER_SHIFT);
    }
}

impl Repairable for MenuState {
    fn ensure_defaults(&mut self) {
        if self.style.is_empty() {
            self.style = MenuState::default().style;
        }
        for item in self.items.iter_mut() {
            item.price = clamp(item.price, 0.0, 999.0);
            item.cost = clamp(item.cost, 0.0, 999.0);
            item.prep = clamp_score(item.prep);
            item.popularity = clamp(item.popularity, 1.0, 5.0);
        }
    }
}

impl Repairable for InventoryState {
    fn ensure_defaults(&mut self) {
        self.par_weeks = clamp(self.par_weeks, PAR_WEEKS_MIN, PAR_WEEKS_MAX);
        self.storage_level = self.storage_level.min((STORAGE_LEVELS.len() - 1) as u8);
        self.stock.retain(|category, _| supply_category(category).is_some());
        for cat in SUPPLY_CATEGORIES {
            let entry = self.stock.entry(cat.id.to_string()).or_default();
            entry.on_hand = finite_or(entry.on_hand, 0.0).max(0.0);
            entry.orders.retain(|o| o.value.is_finite() && o.value > 0.0);
        }
    }
}

impl Repairable for FacilityState {
    fn ensure_defaults(&mut self) {
        self.condition = clamp_score(self.condition);
        self.maintenance_level = clamp(self.maintenance_level, MAINTENANCE_MIN, MAINTENANCE_MAX);
        self.issues.retain(|i| i.downtime_weeks > 0);
        self.downtime_weeks = self
            .downtime_weeks
            .max(self.issues.iter().map(|i| i.downtime_weeks).max().unwrap_or(0));
    }
}

impl Repairable for PromotionState {
    fn ensure_defaults(&mut self) {
        self.active.retain(|p| p.weeks_left > 0);
    }
}

impl Repairable for FeedbackState {
    fn ensure_defaults(&mut self) {
        self.reviews.truncate(REVIEW_HISTORY);
        for review in self.reviews.iter_mut() {
            review.stars = review.stars.clamp(1, 5);
        }
        self.avg_stars = clamp(self.avg_stars, 0.0, 5.0);
    }
}

impl Repairable for ComplianceRecord {
    fn ensure_defaults(&mut self) {
        self.sop = clamp_score(self.sop);
        self.fines_total = finite_or(self.fines_total, 0.0).max(0.0);
    }
}

impl Repairable for SupplyMarket {
    fn ensure_defaults(&mut self) {
        for cat in SUPPLY_CATEGORIES {
            let idx = self.index.entry(cat.id.to_string()).or_insert(1.0);
            *idx = if idx.is_finite() {
                clamp(*idx, INDEX_MIN, INDEX_MAX)
            } else {
                1.0
            };
        }
        self.index.retain(|category, _| supply_category(category).is_some());
        self.contracts
            .retain(|category, c| supply_category(category).is_some() && c.weeks_left > 0);
    }
}

impl Repairable for QuestBoard {
    fn ensure_defaults(&mut self) {
        self.active.retain(|q| quest_def(&q.quest_type).is_some());
        self.active.truncate(MAX_ACTIVE);
        self.completed.dedup();
    }
}

impl Repairable for Loan {
    fn ensure_defaults(&mut self) {
        self.balance = finite_or(self.balance, 0.0).max(0.0);
        self.apr = clamp(self.apr, 0.0, 1.0);
        if self.balance > 0.0 && self.weekly_payment <= 0.0 {
            self.weekly_payment = weekly_payment(self.balance, self.apr, self.weeks_left.max(1));
        }
    }
}

impl Repairable for FixedAsset {
    fn ensure_defaults(&mut self) {
        self.cost = finite_or(self.cost, 0.0).max(0.0);
        self.book = clamp(self.book, 0.0, self.cost);
        if self.dep_weekly <= 0.0 && self.life_weeks > 0 {
            self.dep_weekly = self.cost / self.life_weeks as f64;
        }
    }
}

impl Repairable for Investor {
    fn ensure_defaults(&mut self) {
        self.equity = clamp(self.equity, 0.0, MAX_OUTSIDE_EQUITY);
        self.cash_in = finite_or(self.cash_in, 0.0).max(0.0);
        self.pref_accrued = finite_or(self.pref_accrued, 0.0).max(0.0);
        if let Some(rate) = self.pref_rate.as_mut() {
            *rate = clamp(*rate, 0.0, 0.5);
        }
    }
}
