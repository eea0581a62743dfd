//! Static economic catalog.
//!
//! Cities, venue types, concepts, suppliers, equipment, promotions and the
//! other fixed tables the simulation reads. Nothing here is mutable.

use crate::numeric::peak;

/// A city the group operates in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub id: &'static str,
    pub name: &'static str,
    pub base_demand: f64,
    pub rent_index: f64,
    pub talent_index: f64,
    pub critic_harshness: f64,
}

pub const CITIES: &[City] = &[
    City { id: "perth", name: "Perth", base_demand: 1.00, rent_index: 1.00, talent_index: 0.95, critic_harshness: 0.90 },
    City { id: "melbourne", name: "Melbourne", base_demand: 1.15, rent_index: 1.10, talent_index: 1.00, critic_harshness: 1.05 },
    City { id: "tokyo", name: "Tokyo", base_demand: 1.25, rent_index: 1.35, talent_index: 1.20, critic_harshness: 1.20 },
    City { id: "singapore", name: "Singapore", base_demand: 1.20, rent_index: 1.45, talent_index: 1.05, critic_harshness: 1.20 },
    City { id: "london", name: "London", base_demand: 1.20, rent_index: 1.45, talent_index: 1.10, critic_harshness: 1.15 },
    City { id: "paris", name: "Paris", base_demand: 1.20, rent_index: 1.40, talent_index: 1.10, critic_harshness: 1.30 },
    City { id: "nyc", name: "New York", base_demand: 1.30, rent_index: 1.50, talent_index: 1.15, critic_harshness: 1.25 },
];

/// Looks up a city, if known.
pub fn city(id: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.id == id)
}

/// Looks up a city, falling back to the first entry.
pub fn city_or_default(id: &str) -> &'static City {
    city(id).unwrap_or(&CITIES[0])
}

/// Weekly demand multiplier with three seasonal peaks.
pub fn seasonality(week: u32) -> f64 {
    let w = (week % 52) as f64;
    1.0 + 0.10 * peak(w, 10.0, 6.0) + 0.08 * peak(w, 26.0, 7.0) + 0.12 * peak(w, 50.0, 5.0)
}

/// Slow cost creep: +5% per hundred years of weeks.
pub fn macro_inflation(week: u32) -> f64 {
    1.0 + (week as f64 / 5200.0) * 0.05
}

/// Economic baseline for a kind of venue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VenueType {
    pub id: &'static str,
    pub name: &'static str,
    pub capacity: f64,
    pub avg_spend: f64,
    pub food_cost_base: f64,
    pub labor_base: f64,
    pub vibe_base: f64,
    pub capex_base: f64,
    pub menu_style: &'static str,
}

pub const VENUE_TYPES: &[VenueType] = &[
    VenueType { id: "food_truck", name: "Food Truck", capacity: 180.0, avg_spend: 18.0, food_cost_base: 0.30, labor_base: 0.22, vibe_base: 55.0, capex_base: 35_000.0, menu_style: "truck" },
    VenueType { id: "cafe", name: "Cafe", capacity: 320.0, avg_spend: 22.0, food_cost_base: 0.29, labor_base: 0.28, vibe_base: 60.0, capex_base: 65_000.0, menu_style: "cafe" },
    VenueType { id: "bistro", name: "Bistro", capacity: 420.0, avg_spend: 34.0, food_cost_base: 0.31, labor_base: 0.30, vibe_base: 62.0, capex_base: 110_000.0, menu_style: "a_la_carte" },
    VenueType { id: "pub_kitchen", name: "Pub Kitchen", capacity: 520.0, avg_spend: 28.0, food_cost_base: 0.32, labor_base: 0.27, vibe_base: 58.0, capex_base: 130_000.0, menu_style: "pub" },
    VenueType { id: "casual_dining", name: "Casual Dining", capacity: 650.0, avg_spend: 32.0, food_cost_base: 0.31, labor_base: 0.29, vibe_base: 60.0, capex_base: 160_000.0, menu_style: "a_la_carte" },
    VenueType { id: "fine_dining", name: "Fine Dining", capacity: 260.0, avg_spend: 120.0, food_cost_base: 0.34, labor_base: 0.40, vibe_base: 72.0, capex_base: 220_000.0, menu_style: "tasting" },
    VenueType { id: "winery_restaurant", name: "Winery Restaurant", capacity: 420.0, avg_spend: 75.0, food_cost_base: 0.33, labor_base: 0.35, vibe_base: 70.0, capex_base: 180_000.0, menu_style: "winery" },
    VenueType { id: "hotel_restaurant", name: "Hotel Restaurant", capacity: 520.0, avg_spend: 58.0, food_cost_base: 0.32, labor_base: 0.33, vibe_base: 66.0, capex_base: 170_000.0, menu_style: "hotel" },
];

pub fn venue_type(id: &str) -> Option<&'static VenueType> {
    VENUE_TYPES.iter().find(|t| t.id == id)
}

/// Venue type with a fallback for unknown ids in old saves.
pub fn venue_type_or_default(id: &str) -> &'static VenueType {
    venue_type(id).unwrap_or(&VENUE_TYPES[2])
}

/// Whether a venue type runs a coffee machine.
pub fn needs_coffee(type_id: &str) -> bool {
    matches!(type_id, "cafe" | "hotel_restaurant" | "winery_restaurant")
}

/// Menu concept biasing perceived quality and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Concept {
    pub id: &'static str,
    pub name: &'static str,
    pub quality_bias: f64,
    pub value_bias: f64,
}

pub const CONCEPTS: &[Concept] = &[
    Concept { id: "modern_a_la_carte", name: "Modern A La Carte", quality_bias: 2.0, value_bias: 0.0 },
    Concept { id: "classic_a_la_carte", name: "Classic A La Carte", quality_bias: 1.0, value_bias: 1.0 },
    Concept { id: "tasting_menu", name: "Tasting Menu", quality_bias: 4.0, value_bias: -2.0 },
    Concept { id: "family_value", name: "Family / Value", quality_bias: -1.0, value_bias: 3.0 },
    Concept { id: "local_provenance", name: "Local Provenance", quality_bias: 2.0, value_bias: 0.0 },
];

pub fn concept(id: &str) -> Option<&'static Concept> {
    CONCEPTS.iter().find(|c| c.id == id)
}

pub fn concept_or_default(id: &str) -> &'static Concept {
    concept(id).unwrap_or(&CONCEPTS[0])
}

/// Spend multiplier over average item price per menu style.
pub fn attach_rate(style: &str) -> f64 {
    match style {
        "tasting" => 1.00,
        "counter" => 1.20,
        "pub" | "winery" => 1.45,
        "cafe" => 1.25,
        "truck" => 1.15,
        _ => 1.35,
    }
}

/// Baseline ticket minutes per menu style.
pub fn ticket_base_minutes(style: &str) -> f64 {
    match style {
        "truck" => 6.0,
        "counter" => 8.0,
        "cafe" => 10.0,
        "pub" => 14.0,
        "winery" => 18.0,
        "tasting" => 22.0,
        _ => 16.0,
    }
}

// ---- Supply ----

/// A purchasing category with its share of food cost and market risk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyCategory {
    pub id: &'static str,
    pub weight: f64,
    pub price_vol: f64,
    pub shock_chance: f64,
    /// Share of weekly food cost held as stock
    pub split: f64,
    pub spoil: f64,
    pub shrink: f64,
}

pub const SUPPLY_CATEGORIES: &[SupplyCategory] = &[
    SupplyCategory { id: "produce", weight: 0.22, price_vol: 0.08, shock_chance: 0.08, split: 0.22, spoil: 0.07, shrink: 0.010 },
    SupplyCategory { id: "meat", weight: 0.22, price_vol: 0.06, shock_chance: 0.05, split: 0.28, spoil: 0.04, shrink: 0.008 },
    SupplyCategory { id: "seafood", weight: 0.14, price_vol: 0.10, shock_chance: 0.09, split: 0.12, spoil: 0.06, shrink: 0.010 },
    SupplyCategory { id: "dry", weight: 0.18, price_vol: 0.03, shock_chance: 0.03, split: 0.18, spoil: 0.01, shrink: 0.006 },
    SupplyCategory { id: "beverage", weight: 0.16, price_vol: 0.05, shock_chance: 0.04, split: 0.12, spoil: 0.00, shrink: 0.004 },
    SupplyCategory { id: "coffee", weight: 0.08, price_vol: 0.04, shock_chance: 0.03, split: 0.08, spoil: 0.02, shrink: 0.006 },
];

pub fn supply_category(id: &str) -> Option<&'static SupplyCategory> {
    SUPPLY_CATEGORIES.iter().find(|c| c.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Supplier {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Price multiplier against baseline cost
    pub base_price: f64,
    pub reliability: f64,
    pub lead_days: u32,
}

pub const SUPPLIERS: &[Supplier] = &[
    Supplier { id: "freshfields", name: "FreshFields Produce", category: "produce", base_price: 0.86, reliability: 0.86, lead_days: 2 },
    Supplier { id: "metroproduce", name: "Metro Produce Hub", category: "produce", base_price: 0.92, reliability: 0.80, lead_days: 3 },
    Supplier { id: "primebutchers", name: "Prime Butchers Co.", category: "meat", base_price: 1.06, reliability: 0.84, lead_days: 2 },
    Supplier { id: "meatworks", name: "Meatworks Wholesale", category: "meat", base_price: 0.98, reliability: 0.79, lead_days: 3 },
    Supplier { id: "harborcatch", name: "HarborCatch Seafood", category: "seafood", base_price: 1.08, reliability: 0.80, lead_days: 2 },
    Supplier { id: "oceanline", name: "OceanLine Seafood Traders", category: "seafood", base_price: 0.99, reliability: 0.76, lead_days: 3 },
    Supplier { id: "dryhouse", name: "DryHouse Distribution", category: "dry", base_price: 0.95, reliability: 0.86, lead_days: 2 },
    Supplier { id: "valuebulk", name: "ValueBulk Dry", category: "dry", base_price: 0.90, reliability: 0.78, lead_days: 4 },
    Supplier { id: "bevcentral", name: "Beverage Central", category: "beverage", base_price: 0.97, reliability: 0.80, lead_days: 2 },
    Supplier { id: "craftcellar", name: "CraftCellar Beverage", category: "beverage", base_price: 1.02, reliability: 0.82, lead_days: 3 },
    Supplier { id: "roastguild", name: "RoastGuild Coffee", category: "coffee", base_price: 1.03, reliability: 0.88, lead_days: 2 },
    Supplier { id: "beanline", name: "BeanLine Coffee", category: "coffee", base_price: 0.96, reliability: 0.74, lead_days: 4 },
];

pub fn supplier(id: &str) -> Option<&'static Supplier> {
    SUPPLIERS.iter().find(|s| s.id == id)
}

/// Cheapest supplier serving a category.
pub fn cheapest_supplier(category: &str) -> Option<&'static Supplier> {
    SUPPLIERS
        .iter()
        .filter(|s| s.category == category)
        .min_by(|a, b| a.base_price.total_cmp(&b.base_price))
}

/// Max-on-hand multiplier and upgrade cost per storage level.
pub const STORAGE_LEVELS: &[(f64, f64)] = &[(1.00, 0.0), (1.35, 30_000.0), (1.75, 65_000.0), (2.20, 110_000.0)];

// ---- Facilities ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equipment {
    pub id: &'static str,
    pub name: &'static str,
    pub maint_per_week: f64,
    pub breakdown_base: f64,
    pub speed_hit: f64,
    pub food_hit: f64,
    pub compliance_hit: f64,
    pub downtime_weeks: u32,
}

pub const EQUIPMENT: &[Equipment] = &[
    Equipment { id: "line", name: "Cook line", maint_per_week: 180.0, breakdown_base: 0.020, speed_hit: 10.0, food_hit: 6.0, compliance_hit: 0.0, downtime_weeks: 1 },
    Equipment { id: "fridge", name: "Cold storage", maint_per_week: 140.0, breakdown_base: 0.018, speed_hit: 4.0, food_hit: 4.0, compliance_hit: 3.0, downtime_weeks: 1 },
    Equipment { id: "dish", name: "Dishwasher", maint_per_week: 70.0, breakdown_base: 0.014, speed_hit: 6.0, food_hit: 0.0, compliance_hit: 0.0, downtime_weeks: 1 },
    Equipment { id: "hood", name: "Ventilation hood", maint_per_week: 60.0, breakdown_base: 0.012, speed_hit: 2.0, food_hit: 0.0, compliance_hit: 0.0, downtime_weeks: 1 },
    Equipment { id: "pos", name: "POS and printers", maint_per_week: 50.0, breakdown_base: 0.013, speed_hit: 5.0, food_hit: 0.0, compliance_hit: 0.0, downtime_weeks: 1 },
    Equipment { id: "coffee", name: "Coffee machine", maint_per_week: 40.0, breakdown_base: 0.016, speed_hit: 2.0, food_hit: 0.0, compliance_hit: 0.0, downtime_weeks: 1 },
    Equipment { id: "hvac", name: "HVAC", maint_per_week: 55.0, breakdown_base: 0.012, speed_hit: 2.0, food_hit: 0.0, compliance_hit: 0.0, downtime_weeks: 1 },
];

/// Equipment installed in a venue of the given type.
pub fn equipment_for(type_id: &str) -> impl Iterator<Item = &'static Equipment> + '_ {
    EQUIPMENT
        .iter()
        .filter(move |e| e.id != "coffee" || needs_coffee(type_id))
}

pub fn equipment(id: &str) -> Option<&'static Equipment> {
    EQUIPMENT.iter().find(|e| e.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renovation {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: f64,
    pub weeks: u32,
    pub rep_boost: f64,
    pub compliance_boost: f64,
}

pub const RENOVATIONS: &[Renovation] = &[
    Renovation { id: "refresh", name: "Cosmetic refresh", cost: 25_000.0, weeks: 2, rep_boost: 2.5, compliance_boost: 2.0 },
    Renovation { id: "kitchen", name: "Kitchen overhaul", cost: 95_000.0, weeks: 4, rep_boost: 4.0, compliance_boost: 4.0 },
    Renovation { id: "full", name: "Full refit", cost: 180_000.0, weeks: 6, rep_boost: 6.5, compliance_boost: 6.0 },
];

pub fn renovation(id: &str) -> Option<&'static Renovation> {
    RENOVATIONS.iter().find(|r| r.id == id)
}

// ---- Compliance ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InspectionGrade {
    pub grade: &'static str,
    pub min_score: f64,
    pub rep_delta: f64,
    pub fine_pct: f64,
    pub closure_weeks: u32,
}

/// Highest grade first.
pub const INSPECTION_GRADES: &[InspectionGrade] = &[
    InspectionGrade { grade: "A", min_score: 85.0, rep_delta: 2.0, fine_pct: 0.00, closure_weeks: 0 },
    InspectionGrade { grade: "B", min_score: 70.0, rep_delta: 0.0, fine_pct: 0.01, closure_weeks: 0 },
    InspectionGrade { grade: "C", min_score: 55.0, rep_delta: -3.0, fine_pct: 0.03, closure_weeks: 0 },
    InspectionGrade { grade: "D", min_score: 0.0, rep_delta: -8.0, fine_pct: 0.06, closure_weeks: 1 },
];

/// Grade for an inspection score.
pub fn grade_for(score: f64) -> &'static InspectionGrade {
    INSPECTION_GRADES
        .iter()
        .find(|g| score >= g.min_score)
        .unwrap_or(&INSPECTION_GRADES[INSPECTION_GRADES.len() - 1])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditAction {
    pub id: &'static str,
    pub cost: f64,
    pub clean: f64,
    pub compliance: f64,
    pub burnout: f64,
}

pub const AUDIT_ACTIONS: &[AuditAction] = &[
    AuditAction { id: "deep_clean", cost: 2_500.0, clean: 15.0, compliance: 8.0, burnout: -1.0 },
    AuditAction { id: "pest_control", cost: 3_500.0, clean: 8.0, compliance: 10.0, burnout: 0.0 },
    AuditAction { id: "training_day", cost: 1_800.0, clean: 0.0, compliance: 6.0, burnout: -2.0 },
];

pub fn audit_action(id: &str) -> Option<&'static AuditAction> {
    AUDIT_ACTIONS.iter().find(|a| a.id == id)
}

// ---- Promotions ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionType {
    pub id: &'static str,
    pub name: &'static str,
    pub weeks: u32,
    pub cost: f64,
    pub demand_boost: f64,
    pub foot_traffic: f64,
    pub rep_boost: f64,
    pub regulars_boost: f64,
    pub critic_roll: bool,
}

pub const PROMOTION_TYPES: &[PromotionType] = &[
    PromotionType { id: "social", name: "Social campaign", weeks: 3, cost: 800.0, demand_boost: 0.04, foot_traffic: 6.0, rep_boost: 0.0, regulars_boost: 0.0, critic_roll: false },
    PromotionType { id: "event", name: "Local event night", weeks: 2, cost: 1_200.0, demand_boost: 0.06, foot_traffic: 10.0, rep_boost: 2.0, regulars_boost: 0.0, critic_roll: false },
    PromotionType { id: "influencer", name: "Influencer visit", weeks: 1, cost: 600.0, demand_boost: 0.05, foot_traffic: 8.0, rep_boost: 1.0, regulars_boost: 0.0, critic_roll: false },
    PromotionType { id: "loyalty", name: "Loyalty program", weeks: 6, cost: 300.0, demand_boost: 0.02, foot_traffic: 4.0, rep_boost: 0.0, regulars_boost: 6.0, critic_roll: false },
    PromotionType { id: "critic", name: "Critic invite", weeks: 1, cost: 1_500.0, demand_boost: 0.0, foot_traffic: 0.0, rep_boost: 0.0, regulars_boost: 0.0, critic_roll: true },
];

pub fn promotion_type(id: &str) -> Option<&'static PromotionType> {
    PROMOTION_TYPES.iter().find(|p| p.id == id)
}

// ---- Staff ----

/// Additive modifiers contributed by staff traits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraitModifiers {
    pub waste: f64,
    pub stress: f64,
    pub complaints: f64,
    pub regulars: f64,
    pub speed: f64,
    pub labor: f64,
    pub clean: f64,
    pub food: f64,
    pub foodcost: f64,
    pub value: f64,
    pub spend: f64,
    pub consistency: f64,
}

impl TraitModifiers {
    pub fn add(&mut self, other: &TraitModifiers) {
        self.waste += other.waste;
        self.stress += other.stress;
        self.complaints += other.complaints;
        self.regulars += other.regulars;
        self.speed += other.speed;
        self.labor += other.labor;
        self.clean += other.clean;
        self.food += other.food;
        self.foodcost += other.foodcost;
        self.value += other.value;
        self.spend += other.spend;
        self.consistency += other.consistency;
    }
}

const NO_MODS: TraitModifiers = TraitModifiers {
    waste: 0.0,
    stress: 0.0,
    complaints: 0.0,
    regulars: 0.0,
    speed: 0.0,
    labor: 0.0,
    clean: 0.0,
    food: 0.0,
    foodcost: 0.0,
    value: 0.0,
    spend: 0.0,
    consistency: 0.0,
};

pub const TRAITS: &[(&str, TraitModifiers)] = &[
    ("hard_assessor", TraitModifiers { waste: -0.010, stress: 6.0, ..NO_MODS }),
    ("people_person", TraitModifiers { complaints: -0.08, regulars: 8.0, ..NO_MODS }),
    ("systems_brain", TraitModifiers { speed: 5.0, labor: -0.015, ..NO_MODS }),
    ("clean_freak", TraitModifiers { clean: 6.0, complaints: -0.03, ..NO_MODS }),
    ("artist", TraitModifiers { food: 6.0, foodcost: 0.010, ..NO_MODS }),
    ("mentor", TraitModifiers { stress: -6.0, consistency: 4.0, ..NO_MODS }),
    ("calm_under_fire", TraitModifiers { stress: -10.0, ..NO_MODS }),
    ("sales_operator", TraitModifiers { value: 5.0, spend: 0.03, ..NO_MODS }),
];

pub fn trait_modifiers(id: &str) -> Option<&'static TraitModifiers> {
    TRAITS.iter().find(|(k, _)| *k == id).map(|(_, m)| m)
}

/// Training areas and their per-level cost.
pub const TRAINING_AREAS: &[(&str, f64)] = &[
    ("ops", 600.0),
    ("consistency", 650.0),
    ("cost", 650.0),
    ("pace", 550.0),
    ("standards", 450.0),
];

// ---- Finance ----

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanProduct {
    pub id: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub apr: f64,
    pub term_weeks: u32,
}

pub const LOAN_PRODUCTS: &[LoanProduct] = &[
    LoanProduct { id: "small", label: "Small business loan", min: 25_000.0, max: 150_000.0, apr: 0.11, term_weeks: 104 },
    LoanProduct { id: "growth", label: "Growth loan", min: 100_000.0, max: 500_000.0, apr: 0.095, term_weeks: 156 },
    LoanProduct { id: "bridge", label: "Bridge loan", min: 50_000.0, max: 250_000.0, apr: 0.135, term_weeks: 52 },
];

pub fn loan_product(id: &str) -> Option<&'static LoanProduct> {
    LOAN_PRODUCTS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_weights_sum_to_one() {
        let w: f64 = SUPPLY_CATEGORIES.iter().map(|c| c.weight).sum();
        assert!((w - 1.0).abs() < 1e-9);
        let split: f64 = SUPPLY_CATEGORIES.iter().map(|c| c.split).sum();
        assert!((split - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_category_has_suppliers() {
        for cat in SUPPLY_CATEGORIES {
            assert!(cheapest_supplier(cat.id).is_some(), "{}", cat.id);
        }
        assert_eq!(cheapest_supplier("produce").unwrap().id, "freshfields");
    }

    #[test]
    fn test_seasonality_bounds() {
        for w in 0..104 {
            let s = seasonality(w);
            assert!((1.0..=1.31).contains(&s));
        }
        assert!(seasonality(10) > seasonality(38));
    }

    #[test]
    fn test_grade_lookup() {
        assert_eq!(grade_for(90.0).grade, "A");
        assert_eq!(grade_for(70.0).grade, "B");
        assert_eq!(grade_for(54.9).grade, "D");
        assert_eq!(grade_for(-5.0).grade, "D");
    }

    #[test]
    fn test_coffee_only_where_needed() {
        assert!(equipment_for("cafe").any(|e| e.id == "coffee"));
        assert!(!equipment_for("bistro").any(|e| e.id == "coffee"));
    }

    #[test]
    fn test_lookups_fall_back() {
        assert_eq!(venue_type_or_default("yacht").id, "bistro");
        assert_eq!(city_or_default("atlantis").id, "perth");
        assert!(trait_modifiers("artist").is_some());
    }
}
