//! Venue Economic Engine
//!
//! Computes one venue's week: demand, covers, spend, the cost lines, net,
//! satisfaction, and the rolling state updates that follow. The engine reads
//! subsystem signals only through the collaborator traits and never touches
//! world-level cash; maintenance and energy come back on the result for the
//! orchestrator to debit.
//!
//! Step order matters: each step reads the clamped values of the steps
//! before it.

use serde::Serialize;
use tracing::debug;
use venue_state::{SatisfactionScores, SupplyMarket, Venue, VenueWeekSummary, WeekEvent};

use crate::catalog::{concept_or_default, venue_type_or_default};
use crate::collab::{
    AuditContext, Collaborators, ComplianceOutcome, ConsumptionRequest, FacilityWeek,
    FeedbackInput, FeedbackOutcome, InventoryEffect, PromotionOutcome, SupplyEffect,
};
use crate::numeric::{apply_delta_u32, clamp, clamp_score, round_half_up};
use crate::rng::Draws;

/// Constants for the weekly venue computation
pub mod engine_constants {
    pub const DEMAND_MIN: f64 = 0.40;
    pub const DEMAND_MAX: f64 = 1.60;
    pub const FOOD_PCT_MIN: f64 = 0.20;
    pub const FOOD_PCT_MAX: f64 = 0.44;
    pub const LABOR_PCT_MIN: f64 = 0.16;
    pub const LABOR_PCT_MAX: f64 = 0.52;
    pub const OCCUPANCY_MIN: f64 = 0.04;
    pub const OCCUPANCY_MAX: f64 = 0.14;
    pub const OTHER_BASE: f64 = 0.12;
    pub const OTHER_MIN: f64 = 0.08;
    pub const OTHER_MAX: f64 = 0.22;
    /// Extra labor share while the owner still works the floor
    pub const OWNER_RUN_LABOR: f64 = 0.04;
    pub const MAX_REGULARS: u32 = 5_000;
    pub const WASTE_MIN: f64 = 0.03;
    pub const WASTE_MAX: f64 = 0.16;
    /// Local reputation moves this fraction of the gap to satisfaction
    pub const REPUTATION_EMA: f64 = 0.06;
    pub const BUZZ_SWING: f64 = 0.18;
    pub const MIN_CRITIC_HARSHNESS: f64 = 0.1;
}

use engine_constants::*;

/// Composite satisfaction weights: food, speed, value, vibe, clean.
pub const SATISFACTION_WEIGHTS: [f64; 5] = [0.38, 0.18, 0.16, 0.16, 0.12];

/// World-level inputs shared by every venue in a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSignals {
    pub base_demand: f64,
    pub seasonality: f64,
    pub macro_inflation: f64,
    pub world_reputation: f64,
    pub critic_harshness: f64,
    /// Cash the venue may draw on for maintenance this week
    pub cash_available: f64,
}

impl Default for WorldSignals {
    fn default() -> Self {
        Self {
            base_demand: 1.0,
            seasonality: 1.0,
            macro_inflation: 1.0,
            world_reputation: 50.0,
            critic_harshness: 1.0,
            cash_available: 0.0,
        }
    }
}

/// Everything one venue produced this week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueWeekResult {
    pub venue_id: String,
    pub closed: bool,
    pub covers: u32,
    pub capacity: f64,
    pub avg_spend: f64,
    pub sales: f64,
    pub food: f64,
    pub labor: f64,
    pub wages: f64,
    pub occupancy: f64,
    pub other: f64,
    pub net: f64,
    pub food_pct: f64,
    pub labor_pct: f64,
    pub satisfaction: SatisfactionScores,
    pub fine: f64,
    pub prestige_delta: f64,
    pub regulars_delta: i64,
    pub supply: SupplyEffect,
    pub inventory: InventoryEffect,
    pub facility: FacilityWeek,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceOutcome>,
    pub promotion: PromotionOutcome,
    pub feedback: FeedbackOutcome,
    pub sick_week: bool,
    pub closure_started: bool,
}

impl VenueWeekResult {
    /// Notable venue events in a stable order.
    pub fn events(&self) -> Vec<WeekEvent> {
        let venue_id = || self.venue_id.clone();
        let mut events = Vec::new();

        if let Some(c) = &self.compliance {
            if let Some(i) = &c.inspection {
                events.push(WeekEvent::Inspection {
                    venue_id: venue_id(),
                    grade: i.grade.clone(),
                    score: i.score,
                    fine: i.fine,
                    closure_weeks: i.closure_weeks,
                });
            }
            if let Some(m) = &c.mystery {
                events.push(WeekEvent::MysteryDiner {
                    venue_id: venue_id(),
                    overall: m.overall,
                    rep_delta: m.rep_delta,
                });
            }
        }
        if let Some(critic) = &self.promotion.critic {
            events.push(WeekEvent::CriticVisit {
                venue_id: venue_id(),
                success: critic.success,
                prestige_delta: critic.prestige_delta,
                rep_delta: critic.rep_delta,
            });
        }
        for equipment_id in &self.facility.breakdowns {
            events.push(WeekEvent::Breakdown {
                venue_id: venue_id(),
                equipment_id: equipment_id.clone(),
                downtime_weeks: self.facility.downtime_weeks,
            });
        }
        if let Some(cost) = self.facility.maintenance_skipped {
            events.push(WeekEvent::MaintenanceSkipped {
                venue_id: venue_id(),
                cost,
            });
        }
        if let Some(renovation_id) = &self.facility.renovation_completed {
            events.push(WeekEvent::RenovationComplete {
                venue_id: venue_id(),
                renovation_id: renovation_id.clone(),
            });
        }
        if let Some(shock) = self.feedback.viral_shock {
            events.push(WeekEvent::ViralReview {
                venue_id: venue_id(),
                shock,
            });
        }
        if self.sick_week {
            events.push(WeekEvent::SickWeek {
                venue_id: venue_id(),
            });
        }
        events
    }

    /// Report line for this venue, read after the week's updates.
    pub fn summary(&self, venue: &Venue) -> VenueWeekSummary {
        VenueWeekSummary {
            venue_id: self.venue_id.clone(),
            name: venue.name.clone(),
            closed: self.closed,
            covers: self.covers,
            capacity: self.capacity,
            avg_spend: self.avg_spend,
            sales: self.sales,
            food: self.food,
            labor: self.labor,
            wages: self.wages,
            occupancy: self.occupancy,
            other: self.other,
            net: self.net,
            food_pct: self.food_pct,
            labor_pct: self.labor_pct,
            satisfaction: self.satisfaction,
            local_reputation: venue.local_reputation,
            compliance: venue.compliance,
            fine: self.fine,
            stockouts: self.supply.stockouts + self.inventory.stockouts,
        }
    }
}

/// The econ stream's draws, taken up front so their order never depends on
/// which branches run.
struct EconNoise {
    food: f64,
    labor: f64,
    other: f64,
    vibe: f64,
    regulars: f64,
    reputation: f64,
    stress: f64,
    waste: f64,
}

impl EconNoise {
    fn draw(draws: &Draws, venue_id: &str) -> Self {
        let mut s = draws.venue(venue_id, "econ");
        Self {
            food: s.noise(2),
            labor: s.noise(2),
            other: s.noise(2),
            vibe: s.noise(3),
            regulars: s.noise(8),
            reputation: s.noise(2),
            stress: s.noise(3),
            waste: s.noise(1),
        }
    }
}

/// Weighted composite of the five sub-scores.
pub fn composite(food: f64, speed: f64, value: f64, vibe: f64, clean: f64) -> f64 {
    let [wf, ws, wv, wvi, wc] = SATISFACTION_WEIGHTS;
    clamp_score(food * wf + speed * ws + value * wv + vibe * wvi + clean * wc)
}

/// Computes one venue's week and applies its rolling state updates.
pub fn compute_week<C: Collaborators + ?Sized>(
    venue: &mut Venue,
    signals: &WorldSignals,
    market: &SupplyMarket,
    collab: &C,
    draws: &Draws,
) -> VenueWeekResult {
    let closed = venue.is_closed();
    let noise = EconNoise::draw(draws, &venue.id);
    let vt = venue_type_or_default(&venue.type_id);
    let concept = concept_or_default(&venue.concept_id);

    let mods = collab.trait_modifiers(venue);
    let promo = collab.promotion_effects(venue);
    let profile = collab.effective_skills(venue);
    let sk = profile.skills;
    let menu = collab.menu_metrics(venue);
    let fac_fx = collab.facility_effects(venue);

    let delegation = venue.staff.delegation;
    let gm_runs_ops = delegation.ops && venue.staff.gm.is_some();
    let chef_runs_menu = delegation.menu && venue.staff.chef.is_some();
    let foh_led = delegation.foh && venue.staff.foh.is_some();

    // Demand and covers
    let rep = (signals.world_reputation + venue.local_reputation) / 2.0;
    let buzz = 1.0 + clamp(venue.review_buzz / 120.0, -BUZZ_SWING, BUZZ_SWING);
    let demand = signals.base_demand
        * signals.seasonality
        * (0.70 + rep / 200.0)
        * (0.85 + venue.foot_traffic / 200.0)
        * (1.0 + promo.demand_boost)
        * (0.92 + promo.foot_traffic / 250.0)
        * buzz;
    let capacity =
        vt.capacity * (0.85 + venue.fitout_quality / 200.0) * fac_fx.capacity_multiplier;

    let base_spend = if menu.has_menu {
        menu.avg_spend_per_cover
    } else {
        vt.avg_spend
    };
    let avg_spend = (base_spend
        * (1.0 + venue.price_position / 100.0)
        * (0.95 + rep / 250.0)
        * (1.0 + mods.spend))
        .max(0.0);

    let foh_bonus = if foh_led { sk.pace / 400.0 } else { 0.0 };
    let covers = if closed {
        0
    } else {
        let index = clamp(
            demand + foh_bonus - venue.staff_stress / 220.0,
            DEMAND_MIN,
            DEMAND_MAX,
        );
        round_half_up(capacity * index).max(0.0) as u32
    };
    let sales = covers as f64 * avg_spend;

    // Cost percentages
    let food_base = if menu.has_menu {
        menu.food_cost_pct
    } else {
        vt.food_cost_base
    };
    let food_pct = clamp(
        food_base + 0.02 * (signals.macro_inflation - 1.0) - sk.cost / 560.0
            + noise.food / 100.0
            + mods.foodcost,
        FOOD_PCT_MIN,
        FOOD_PCT_MAX,
    );

    let eff_prep = if chef_runs_menu {
        menu.prep_load * 0.9
    } else {
        menu.prep_load
    };
    let menu_labor_adj = clamp((eff_prep - 45.0) / 800.0, -0.01, 0.07);
    let mut labor_raw = vt.labor_base
        + if venue.owner_run { OWNER_RUN_LABOR } else { 0.0 }
        + venue.staff_stress / 320.0
        + menu_labor_adj
        + noise.labor / 100.0;
    if gm_runs_ops {
        labor_raw -= sk.ops / 700.0;
    }
    labor_raw += mods.labor;

    let staffing = collab.staffing_week(venue, covers, &menu, &profile, draws);
    let labor_pct = clamp(
        labor_raw + staffing.labor_adjust,
        LABOR_PCT_MIN,
        LABOR_PCT_MAX,
    );

    let occupancy = sales * clamp(venue.occupancy_pct, OCCUPANCY_MIN, OCCUPANCY_MAX);
    let debt = if venue.equipment_debt { 0.02 } else { 0.0 };
    let mut other = sales * clamp(OTHER_BASE + debt + noise.other / 100.0, OTHER_MIN, OTHER_MAX);
    let wages = collab.fixed_wages(venue);

    // Supply, plant and stock
    let base_cogs = sales * food_pct;
    let supply = if closed {
        SupplyEffect::default()
    } else {
        collab.supply_effect(venue, market, base_cogs, draws)
    };
    let facility = collab.facility_tick(venue, covers, signals.cash_available, draws);
    let inventory = collab.inventory_tick(
        venue,
        market,
        ConsumptionRequest {
            cogs: supply.contracted,
            covers,
        },
        draws,
    );

    let food = supply.total() + inventory.waste + inventory.emergency;
    let labor = sales * labor_pct + wages;
    let mut net = sales - food - labor - occupancy - other;

    // Satisfaction
    let st = &venue.staff.stations;
    let staff_bonus = clamp((staffing.factor - 1.0) * 14.0, -10.0, 14.0);
    let station_boost = clamp(
        (st.pan + st.grill + st.fryer + st.cold + st.pastry) as f64 * 1.8 + st.prep as f64 * 1.2,
        0.0,
        14.0,
    );
    let speed_penalty = if menu.has_menu {
        clamp(
            (menu.station_imbalance - 35.0) * 0.18 + (eff_prep - 45.0) * 0.2,
            -8.0,
            18.0,
        )
    } else {
        0.0
    };
    let burnout_penalty = clamp((venue.burnout - 35.0) * 0.2, 0.0, 16.0);
    let speed = clamp(
        70.0 - venue.staff_stress + venue.manager_skill * 0.6 + sk.service * 0.25 + mods.speed
            + staff_bonus
            + station_boost
            - speed_penalty
            - burnout_penalty
            - fac_fx.speed_hit
            - supply.speed_penalty
            - inventory.speed_penalty,
        10.0,
        97.0,
    );

    let menu_quality = if menu.has_menu {
        clamp(menu.variety * 0.15 + (1.0 - menu.food_cost_pct) * 60.0, 0.0, 20.0)
    } else {
        0.0
    };
    let food_score = clamp(
        42.0 + sk.culinary * 0.4 + concept.quality_bias * 3.0 + menu_quality
            - venue.waste_pct * 80.0
            + mods.food
            - fac_fx.food_hit
            - supply.sat_penalty
            - inventory.sat_penalty,
        10.0,
        99.0,
    );
    let value = clamp(
        60.0 + concept.value_bias * 4.0 - venue.price_position * 0.8 + mods.value,
        5.0,
        96.0,
    );
    let clean = clamp(
        30.0 + sk.standards * 0.5 - venue.staff_stress * 0.35 + mods.clean,
        5.0,
        99.0,
    );
    let vibe = clamp(vt.vibe_base + venue.fitout_quality * 0.2 + noise.vibe, 10.0, 98.0);
    let sat = composite(food_score, speed, value, vibe, clean);
    let scores = SatisfactionScores {
        food: food_score,
        speed,
        value,
        clean,
        vibe,
        composite: sat,
    };
    venue.satisfaction = scores;

    // Compliance
    let compliance = if closed {
        None
    } else {
        Some(collab.audit(
            venue,
            AuditContext {
                sales,
                food_score,
                speed_score: speed,
                clean_score: clean,
                facility_compliance_hit: fac_fx.compliance_hit,
                standards: sk.standards,
            },
            draws,
        ))
    };
    let fine = compliance.as_ref().map_or(0.0, |c| c.fine());
    other += fine;
    net -= fine;
    let closure_started = compliance.as_ref().is_some_and(|c| c.closure_started());

    // Feedback
    let feedback = if closed {
        FeedbackOutcome::default()
    } else {
        let complaint_bias = clamp(0.55 - sat / 200.0 + mods.complaints, 0.10, 0.80);
        collab.process_feedback(
            venue,
            FeedbackInput {
                covers,
                scores,
                complaint_bias,
            },
            draws,
        )
    };

    // Rolling state
    let regulars_delta = round_half_up(
        (sat - 55.0) * 0.6 + noise.regulars + mods.regulars + promo.regulars_boost,
    ) as i64;
    venue.regulars = apply_delta_u32(venue.regulars, regulars_delta, MAX_REGULARS);

    collab.popularity_drift(venue);
    let promotion = collab.resolve_and_tick(venue, &scores, draws);

    let local = venue.local_reputation;
    venue.local_reputation = clamp_score(
        local + REPUTATION_EMA * (sat - local) + noise.reputation * 0.2 + promo.rep_boost,
    );

    let load = if capacity > 0.0 {
        covers as f64 / capacity
    } else {
        0.0
    };
    venue.staff_stress = clamp_score(
        venue.staff_stress
            + (load - 0.9) * 18.0
            + (labor_pct - vt.labor_base) * 120.0
            - sk.people / 22.0
            + noise.stress
            + mods.stress * 0.25,
    );
    venue.waste_pct = clamp(
        venue.waste_pct
            + (0.10 - sk.cost / 900.0 + mods.waste) * 0.03
            + noise.waste / 1000.0,
        WASTE_MIN,
        WASTE_MAX,
    );
    venue.lease_years_remaining = (venue.lease_years_remaining - 1.0 / 52.0).max(0.0);

    let critic_prestige = promotion.critic.map_or(0.0, |c| c.prestige_delta);
    let prestige_delta = if closed {
        critic_prestige
    } else {
        ((food_score - 75.0) * 0.05 + (venue.local_reputation - 70.0) * 0.02)
            / signals.critic_harshness.max(MIN_CRITIC_HARSHNESS)
            + critic_prestige
    };

    debug!(
        venue = %venue.id,
        covers,
        sales,
        net,
        satisfaction = sat,
        closed,
        "Venue week"
    );

    VenueWeekResult {
        venue_id: venue.id.clone(),
        closed,
        covers,
        capacity,
        avg_spend,
        sales,
        food,
        labor,
        wages,
        occupancy,
        other,
        net,
        food_pct,
        labor_pct,
        satisfaction: scores,
        fine,
        prestige_delta,
        regulars_delta,
        supply,
        inventory,
        facility,
        compliance,
        promotion,
        feedback,
        sick_week: staffing.sick_week,
        closure_started,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TraitModifiers;
    use crate::collab::{
        menu::menu_metrics, ComplianceModel, CustomerFeedbackModel, EffectiveSkillProfile,
        FacilityEffects, FacilityModel, InspectionOutcome, InventoryModel, MenuMetrics, MenuModel,
        PromotionEffects, PromotionModel, StaffModel, StaffingOutcome, StandardCollaborators,
        SupplierModel,
    };
    use crate::numeric::round_cents;
    use crate::rng::{CannedSource, SeededSource};
    use std::collections::BTreeMap;
    use venue_state::{SkillSet, WorldState};

    /// Neutral collaborators: no wages, no penalties, contracted cost at
    /// index 1.0, an optional forced inspection and an optional fixed menu.
    #[derive(Default)]
    struct Neutral {
        inspection: Option<InspectionOutcome>,
        menu: Option<MenuMetrics>,
    }

    impl StaffModel for Neutral {
        fn effective_skills(&self, _venue: &Venue) -> EffectiveSkillProfile {
            EffectiveSkillProfile {
                skills: SkillSet {
                    ops: 50.0,
                    finance: 50.0,
                    people: 50.0,
                    standards: 50.0,
                    culinary: 50.0,
                    consistency: 50.0,
                    cost: 50.0,
                    pace: 50.0,
                    service: 50.0,
                    recovery: 50.0,
                },
                burnout_multiplier: 1.0,
            }
        }
        fn trait_modifiers(&self, _venue: &Venue) -> TraitModifiers {
            TraitModifiers::default()
        }
        fn fixed_wages(&self, _venue: &Venue) -> f64 {
            0.0
        }
        fn staffing_week(
            &self,
            _venue: &mut Venue,
            _covers: u32,
            _menu: &MenuMetrics,
            _skills: &EffectiveSkillProfile,
            _draws: &Draws,
        ) -> StaffingOutcome {
            StaffingOutcome::default()
        }
    }

    impl MenuModel for Neutral {
        fn menu_metrics(&self, venue: &Venue) -> MenuMetrics {
            self.menu.clone().unwrap_or_else(|| menu_metrics(venue))
        }
        fn popularity_drift(&self, _venue: &mut Venue) {}
    }

    impl SupplierModel for Neutral {
        fn advance_market(&self, _market: &mut SupplyMarket, _draws: &Draws) -> Vec<WeekEvent> {
            Vec::new()
        }
        fn supply_effect(
            &self,
            _venue: &mut Venue,
            _market: &SupplyMarket,
            base_cogs: f64,
            _draws: &Draws,
        ) -> SupplyEffect {
            SupplyEffect {
                contracted: base_cogs,
                ..Default::default()
            }
        }
    }

    impl InventoryModel for Neutral {
        fn inventory_tick(
            &self,
            _venue: &mut Venue,
            _market: &SupplyMarket,
            _request: ConsumptionRequest,
            _draws: &Draws,
        ) -> InventoryEffect {
            InventoryEffect::default()
        }
    }

    impl FacilityModel for Neutral {
        fn facility_effects(&self, _venue: &Venue) -> FacilityEffects {
            FacilityEffects::default()
        }
        fn facility_tick(
            &self,
            _venue: &mut Venue,
            _covers: u32,
            _cash_available: f64,
            _draws: &Draws,
        ) -> FacilityWeek {
            FacilityWeek::default()
        }
    }

    impl ComplianceModel for Neutral {
        fn audit(&self, venue: &mut Venue, ctx: AuditContext, _draws: &Draws) -> ComplianceOutcome {
            let inspection = self.inspection.clone().map(|mut i| {
                i.fine = ctx.sales * 0.06;
                venue.closure_weeks = venue.closure_weeks.max(i.closure_weeks);
                i
            });
            ComplianceOutcome {
                compliance: venue.compliance,
                inspection,
                mystery: None,
            }
        }
    }

    impl PromotionModel for Neutral {
        fn promotion_effects(&self, _venue: &Venue) -> PromotionEffects {
            PromotionEffects::default()
        }
        fn resolve_and_tick(
            &self,
            _venue: &mut Venue,
            _scores: &SatisfactionScores,
            _draws: &Draws,
        ) -> PromotionOutcome {
            PromotionOutcome::default()
        }
    }

    impl CustomerFeedbackModel for Neutral {
        fn process_feedback(
            &self,
            _venue: &mut Venue,
            _input: FeedbackInput,
            _draws: &Draws,
        ) -> FeedbackOutcome {
            FeedbackOutcome::default()
        }
    }

    fn venue() -> Venue {
        Venue {
            id: "v_0001".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_neutral_week_adds_up() {
        let mut v = venue();
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &Neutral::default(),
            &Draws::new(&src, 0),
        );

        // bistro 420 x (0.85 + 50/200)
        assert!((r.capacity - 462.0).abs() < 1e-9);
        assert!(r.covers as f64 >= 0.4 * r.capacity - 0.5);
        assert!(r.covers as f64 <= 1.6 * r.capacity + 0.5);
        assert!((r.sales - r.covers as f64 * r.avg_spend).abs() < 1e-9);
        assert!((r.food - r.sales * r.food_pct).abs() < 1e-6);
        assert!((r.labor - r.sales * r.labor_pct).abs() < 1e-6);
        let expected = r.sales - r.food - r.labor - r.occupancy - r.other;
        assert!((r.net - expected).abs() < 1e-6);
        assert!((r.occupancy - r.sales * 0.09).abs() < 1e-6);
        assert!((r.other - r.sales * 0.12).abs() < 1e-6);
        assert!(!r.closed);
        assert!(r.events().is_empty());
    }

    #[test]
    fn test_demand_index_formula() {
        // rep 50, foot 50, no promos, stress 30:
        // 1.0 x 0.95 x 1.10 x 0.92 = 0.9614, minus 30/220
        let mut v = venue();
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &Neutral::default(),
            &Draws::new(&src, 0),
        );
        let index = 0.95 * 1.10 * 0.92 - 30.0 / 220.0;
        assert_eq!(r.covers as f64, round_half_up(462.0 * index));
    }

    /// Cafe at fit-out 80 (capacity 320 x 1.25 = 400) with a flat menu at
    /// 30% food cost and 28% base labor, no hires, no promotions.
    fn baseline_cafe() -> (Venue, Neutral) {
        let venue = Venue {
            id: "v_0001".into(),
            type_id: "cafe".into(),
            fitout_quality: 80.0,
            owner_run: false,
            ..Default::default()
        };
        let collab = Neutral {
            menu: Some(MenuMetrics {
                has_menu: true,
                item_count: 8,
                avg_price: 30.0,
                food_cost_pct: 0.30,
                prep_load: 45.0,
                station_imbalance: 35.0,
                variety: 40.0,
                avg_spend_per_cover: 30.0,
                station_weights: BTreeMap::new(),
            }),
            ..Default::default()
        };
        (venue, collab)
    }

    #[test]
    fn test_baseline_cafe_week_to_the_cent() {
        let (mut v, collab) = baseline_cafe();
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &collab,
            &Draws::new(&src, 0),
        );

        assert_eq!(r.capacity, 400.0);
        // 400 x (0.95 x 1.10 x 0.92 - 30/220) = 330.01
        assert_eq!(r.covers, 330);
        assert!((r.avg_spend - 34.5).abs() < 1e-9);
        assert!((r.sales - 11_385.0).abs() < 1e-6);
        // 0.30 - 50/560
        assert!((r.food_pct - 0.210_714_285_714).abs() < 1e-9);
        // 0.28 + 30/320
        assert!((r.labor_pct - 0.373_75).abs() < 1e-12);
        assert_eq!(round_cents(r.net), 2_340.02);
    }

    #[test]
    fn test_baseline_cafe_seeded_week_is_reproducible() {
        let src = SeededSource::new(2024);
        let run = || {
            let (mut v, collab) = baseline_cafe();
            compute_week(
                &mut v,
                &WorldSignals::default(),
                &SupplyMarket::default(),
                &collab,
                &Draws::new(&src, 5),
            )
        };
        let a = run();
        let b = run();

        assert!((160..=640).contains(&a.covers));
        assert_eq!(a.covers, b.covers);
        assert_eq!(round_cents(a.net), round_cents(b.net));
        let expected = a.sales * (1.0 - a.food_pct - a.labor_pct - 0.09) - a.other;
        assert!((a.net - expected).abs() < 0.005);
    }

    #[test]
    fn test_closed_venue_sells_nothing() {
        let mut v = venue();
        v.closure_weeks = 2;
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &Neutral::default(),
            &Draws::new(&src, 0),
        );
        assert!(r.closed);
        assert_eq!(r.covers, 0);
        assert_eq!(r.sales, 0.0);
        assert!(r.compliance.is_none());
        assert_eq!(r.fine, 0.0);
        // countdown belongs to the orchestrator
        assert_eq!(v.closure_weeks, 2);
    }

    #[test]
    fn test_new_closure_keeps_this_weeks_sales() {
        let mut v = venue();
        let collab = Neutral {
            inspection: Some(InspectionOutcome {
                grade: "D".into(),
                score: 35.0,
                fine: 0.0,
                closure_weeks: 1,
                rep_delta: -8.0,
            }),
            menu: None,
        };
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &collab,
            &Draws::new(&src, 0),
        );
        assert!(r.sales > 0.0);
        assert!(r.closure_started);
        assert!((r.fine - r.sales * 0.06).abs() < 1e-6);
        let expected = r.sales - r.food - r.labor - r.occupancy - r.other;
        assert!((r.net - expected).abs() < 1e-6);
        assert_eq!(v.closure_weeks, 1);
        assert!(matches!(r.events()[0], WeekEvent::Inspection { .. }));
    }

    #[test]
    fn test_rolling_updates() {
        let mut v = venue();
        v.review_buzz = 0.0;
        let src = CannedSource::constant(0.5);
        let r = compute_week(
            &mut v,
            &WorldSignals::default(),
            &SupplyMarket::default(),
            &Neutral::default(),
            &Draws::new(&src, 0),
        );
        let sat = r.satisfaction.composite;
        assert!((v.local_reputation - (50.0 + 0.06 * (sat - 50.0))).abs() < 1e-9);
        assert!((v.lease_years_remaining - (5.0 - 1.0 / 52.0)).abs() < 1e-12);
        assert_eq!(v.regulars as i64, r.regulars_delta.max(0));
        assert!(v.waste_pct >= WASTE_MIN && v.waste_pct <= WASTE_MAX);
        assert_eq!(v.satisfaction, r.satisfaction);
    }

    #[test]
    fn test_composite_weights() {
        assert_eq!(composite(100.0, 100.0, 100.0, 100.0, 100.0), 100.0);
        assert!((composite(50.0, 0.0, 0.0, 0.0, 0.0) - 19.0).abs() < 1e-12);
        let sum: f64 = SATISFACTION_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_week_is_deterministic() {
        let world = WorldState::default();
        let src = SeededSource::new(7);
        let signals = WorldSignals {
            cash_available: 50_000.0,
            ..Default::default()
        };
        let run = || {
            let mut v = venue();
            let r = compute_week(
                &mut v,
                &signals,
                &world.supply,
                &StandardCollaborators,
                &Draws::new(&src, 12),
            );
            (serde_json::to_string(&r).unwrap(), v)
        };
        let (a, va) = run();
        let (b, vb) = run();
        assert_eq!(a, b);
        assert_eq!(va, vb);
    }

    #[test]
    fn test_standard_week_scores_in_bounds() {
        let src = SeededSource::new(99);
        for week in 0..20 {
            let mut v = venue();
            v.staff_stress = 95.0;
            v.burnout = 90.0;
            let r = compute_week(
                &mut v,
                &WorldSignals::default(),
                &SupplyMarket::default(),
                &StandardCollaborators,
                &Draws::new(&src, week),
            );
            let s = r.satisfaction;
            for score in [s.food, s.speed, s.value, s.clean, s.vibe, s.composite] {
                assert!((0.0..=100.0).contains(&score));
            }
            assert!((FOOD_PCT_MIN..=FOOD_PCT_MAX).contains(&r.food_pct));
            assert!((LABOR_PCT_MIN..=LABOR_PCT_MAX).contains(&r.labor_pct));
            assert!((0.0..=100.0).contains(&v.staff_stress));
        }
    }
}
