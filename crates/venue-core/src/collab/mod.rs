//! Collaborator contracts.
//!
//! The economic engine never reaches into a subsystem's internals. It pulls
//! summary signals through the traits below and pushes back the handful of
//! inputs each subsystem needs. `StandardCollaborators` implements every
//! trait with the stock models in the sibling modules; tests swap in stubs.

pub mod compliance;
pub mod facility;
pub mod feedback;
pub mod inventory;
pub mod menu;
pub mod promotion;
pub mod staff;
pub mod supplier;

use serde::Serialize;
use std::collections::BTreeMap;

use venue_state::{
    FeaturedReview, SatisfactionScores, SkillSet, SupplyMarket, Venue, WeekEvent, WorldState,
};

use crate::catalog::TraitModifiers;
use crate::error::ActionError;
use crate::rng::Draws;

/// Skill axes after hires, training and burnout have been folded in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveSkillProfile {
    pub skills: SkillSet,
    /// Execution multiplier from burnout, in `[0.7, 1.0]`
    pub burnout_multiplier: f64,
}

/// Roster and burnout outcome for the week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StaffingOutcome {
    /// Ratio of rostered to recommended crew, 1.0 when no roster runs
    pub factor: f64,
    /// Added to labor% before clamping
    pub labor_adjust: f64,
    pub sick_week: bool,
}

impl Default for StaffingOutcome {
    fn default() -> Self {
        Self {
            factor: 1.0,
            labor_adjust: 0.0,
            sick_week: false,
        }
    }
}

/// Menu summary the engine prices and schedules from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuMetrics {
    pub has_menu: bool,
    pub item_count: usize,
    pub avg_price: f64,
    pub food_cost_pct: f64,
    pub prep_load: f64,
    pub station_imbalance: f64,
    pub variety: f64,
    pub avg_spend_per_cover: f64,
    /// Popularity weight per station, used for bottleneck lookups
    pub station_weights: BTreeMap<String, f64>,
}

impl MenuMetrics {
    /// Station carrying the most popularity weight.
    pub fn dominant_station(&self) -> Option<&str> {
        self.station_weights
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k.as_str())
    }
}

/// Sum of the promotions running this week.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PromotionEffects {
    pub demand_boost: f64,
    pub foot_traffic: f64,
    pub rep_boost: f64,
    pub regulars_boost: f64,
    pub critic_pending: bool,
}

/// One-shot promotion results.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PromotionOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critic: Option<CriticOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticOutcome {
    pub success: bool,
    pub prestige_delta: f64,
    pub rep_delta: f64,
}

/// Penalties from the venue's physical plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FacilityEffects {
    pub speed_hit: f64,
    pub food_hit: f64,
    pub compliance_hit: f64,
    /// Multiplier applied to capacity, 0.35 while down
    pub capacity_multiplier: f64,
}

impl Default for FacilityEffects {
    fn default() -> Self {
        Self {
            speed_hit: 0.0,
            food_hit: 0.0,
            compliance_hit: 0.0,
            capacity_multiplier: 1.0,
        }
    }
}

/// Facility upkeep for the week.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FacilityWeek {
    /// Maintenance actually paid, zero when skipped
    pub maintenance_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_skipped: Option<f64>,
    /// Energy bill, always charged
    pub energy: f64,
    pub breakdowns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renovation_completed: Option<String>,
    pub condition: f64,
    pub downtime_weeks: u32,
}

/// Food cost after supplier pricing and stockout premiums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyEffect {
    /// Cost at the contracted index (`base × Σ weight × effIdx`)
    pub contracted: f64,
    /// Premium paid for emergency buys; only ever adds
    pub emergency: f64,
    pub stockouts: u32,
    pub index_avg: f64,
    pub sat_penalty: f64,
    pub speed_penalty: f64,
}

impl SupplyEffect {
    pub fn total(&self) -> f64 {
        self.contracted + self.emergency
    }
}

impl Default for SupplyEffect {
    fn default() -> Self {
        Self {
            contracted: 0.0,
            emergency: 0.0,
            stockouts: 0,
            index_avg: 1.0,
            sat_penalty: 0.0,
            speed_penalty: 0.0,
        }
    }
}

/// What the kernel asks inventory to consume this week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionRequest {
    pub cogs: f64,
    pub covers: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InventoryEffect {
    pub waste: f64,
    pub stockouts: u32,
    pub emergency: f64,
    pub sat_penalty: f64,
    pub speed_penalty: f64,
    pub on_hand: f64,
    pub incoming: f64,
}

/// Inputs for the weekly compliance check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditContext {
    pub sales: f64,
    pub food_score: f64,
    pub speed_score: f64,
    pub clean_score: f64,
    pub facility_compliance_hit: f64,
    pub standards: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionOutcome {
    pub grade: String,
    pub score: f64,
    pub fine: f64,
    pub closure_weeks: u32,
    pub rep_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MysteryOutcome {
    pub overall: f64,
    pub rep_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComplianceOutcome {
    pub compliance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection: Option<InspectionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mystery: Option<MysteryOutcome>,
}

impl ComplianceOutcome {
    pub fn fine(&self) -> f64 {
        self.inspection.as_ref().map_or(0.0, |i| i.fine)
    }

    /// Whether this week's inspection ordered a closure.
    pub fn closure_started(&self) -> bool {
        self.inspection.as_ref().is_some_and(|i| i.closure_weeks > 0)
    }
}

/// Inputs for qualitative feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackInput {
    pub covers: u32,
    pub scores: SatisfactionScores,
    pub complaint_bias: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeedbackOutcome {
    pub praise: BTreeMap<String, u32>,
    pub complaints: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<FeaturedReview>,
    pub reviews_new: u32,
    pub reviews_negative: u32,
    pub stars_sum: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viral_shock: Option<f64>,
}

pub trait StaffModel {
    fn effective_skills(&self, venue: &Venue) -> EffectiveSkillProfile;
    fn trait_modifiers(&self, venue: &Venue) -> TraitModifiers;
    /// Named hires, station staff and roster hours.
    fn fixed_wages(&self, venue: &Venue) -> f64;
    /// Applies roster pressure, burnout drift and morale for the week.
    fn staffing_week(
        &self,
        venue: &mut Venue,
        covers: u32,
        menu: &MenuMetrics,
        skills: &EffectiveSkillProfile,
        draws: &Draws,
    ) -> StaffingOutcome;
}

pub trait MenuModel {
    fn menu_metrics(&self, venue: &Venue) -> MenuMetrics;
    fn popularity_drift(&self, venue: &mut Venue);
}

pub trait SupplierModel {
    /// Advances every category's price index. Runs once per tick before any
    /// venue reads the market.
    fn advance_market(&self, market: &mut SupplyMarket, draws: &Draws) -> Vec<WeekEvent>;
    fn supply_effect(
        &self,
        venue: &mut Venue,
        market: &SupplyMarket,
        base_cogs: f64,
        draws: &Draws,
    ) -> SupplyEffect;
}

pub trait InventoryModel {
    fn inventory_tick(
        &self,
        venue: &mut Venue,
        market: &SupplyMarket,
        request: ConsumptionRequest,
        draws: &Draws,
    ) -> InventoryEffect;
}

pub trait FacilityModel {
    fn facility_effects(&self, venue: &Venue) -> FacilityEffects;
    /// Pays maintenance if `cash_available` allows, wears the plant and
    /// rolls breakdowns. The caller debits the returned spend.
    fn facility_tick(
        &self,
        venue: &mut Venue,
        covers: u32,
        cash_available: f64,
        draws: &Draws,
    ) -> FacilityWeek;
}

pub trait ComplianceModel {
    fn audit(&self, venue: &mut Venue, ctx: AuditContext, draws: &Draws) -> ComplianceOutcome;
}

pub trait PromotionModel {
    fn promotion_effects(&self, venue: &Venue) -> PromotionEffects;
    /// Resolves one-shot outcomes, then counts every instance down.
    fn resolve_and_tick(
        &self,
        venue: &mut Venue,
        scores: &SatisfactionScores,
        draws: &Draws,
    ) -> PromotionOutcome;
}

pub trait CustomerFeedbackModel {
    fn process_feedback(
        &self,
        venue: &mut Venue,
        input: FeedbackInput,
        draws: &Draws,
    ) -> FeedbackOutcome;
}

/// Everything the engine needs from the outside.
pub trait Collaborators:
    StaffModel
    + MenuModel
    + SupplierModel
    + InventoryModel
    + FacilityModel
    + ComplianceModel
    + PromotionModel
    + CustomerFeedbackModel
{
}

impl<T> Collaborators for T where
    T: StaffModel
        + MenuModel
        + SupplierModel
        + InventoryModel
        + FacilityModel
        + ComplianceModel
        + PromotionModel
        + CustomerFeedbackModel
{
}

/// Stock implementation of every collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCollaborators;

/// Looks up a venue for a player action.
pub(crate) fn venue_entry<'a>(
    world: &'a mut WorldState,
    venue_id: &str,
) -> Result<&'a mut Venue, ActionError> {
    world
        .venue_mut(venue_id)
        .ok_or_else(|| ActionError::UnknownVenue(venue_id.to_string()))
}

/// Debits `cost`, refusing rather than overdrawing.
pub(crate) fn charge(cash: &mut f64, cost: f64) -> Result<(), ActionError> {
    if *cash < cost {
        return Err(ActionError::InsufficientCash { cost, cash: *cash });
    }
    *cash -= cost;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_station() {
        let mut m = MenuMetrics {
            has_menu: true,
            item_count: 3,
            avg_price: 20.0,
            food_cost_pct: 0.3,
            prep_load: 50.0,
            station_imbalance: 40.0,
            variety: 50.0,
            avg_spend_per_cover: 27.0,
            station_weights: BTreeMap::new(),
        };
        assert_eq!(m.dominant_station(), None);
        m.station_weights.insert("grill".into(), 4.0);
        m.station_weights.insert("pan".into(), 7.0);
        assert_eq!(m.dominant_station(), Some("pan"));
    }

    #[test]
    fn test_charge_refuses_overdraft() {
        let mut cash = 100.0;
        assert!(charge(&mut cash, 60.0).is_ok());
        assert_eq!(cash, 40.0);
        assert_eq!(
            charge(&mut cash, 60.0),
            Err(ActionError::InsufficientCash { cost: 60.0, cash: 40.0 })
        );
        assert_eq!(cash, 40.0);
    }

    #[test]
    fn test_compliance_outcome_fine() {
        let mut out = ComplianceOutcome::default();
        assert_eq!(out.fine(), 0.0);
        assert!(!out.closure_started());
        out.inspection = Some(InspectionOutcome {
            grade: "D".into(),
            score: 40.0,
            fine: 600.0,
            closure_weeks: 1,
            rep_delta: -8.0,
        });
        assert_eq!(out.fine(), 600.0);
        assert!(out.closure_started());
    }
}
