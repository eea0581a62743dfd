//! Venue Types
//!
//! A venue and the sub-states it exclusively owns: staff, menu, inventory,
//! facility, supplier selections, promotions, customer feedback and
//! compliance history. Nothing here is shared between venues.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One owned business location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    pub id: String,
    pub name: String,
    /// Venue type from the catalog (immutable economic baseline)
    pub type_id: String,
    /// Concept from the catalog (immutable quality/value bias)
    pub concept_id: String,
    /// Price position in percent relative to the type's baseline spend
    pub price_position: f64,
    pub foot_traffic: f64,
    pub fitout_quality: f64,
    /// Rent as a fraction of sales
    pub occupancy_pct: f64,
    pub equipment_debt: bool,
    pub owner_run: bool,
    pub popularity: f64,

    // Base skills before hires are blended in
    pub chef_skill: f64,
    pub manager_skill: f64,
    pub cleanliness: f64,
    pub procurement_skill: f64,

    // Rolling scores (clamped at every write)
    pub local_reputation: f64,
    pub regulars: u32,
    pub staff_stress: f64,
    pub burnout: f64,
    pub morale: f64,
    pub waste_pct: f64,
    pub compliance: f64,
    pub closure_weeks: u32,
    pub review_buzz: f64,
    pub lease_years_remaining: f64,

    pub purchase_price: f64,
    pub acquired_week: u32,
    /// Scores from the most recent tick
    pub satisfaction: SatisfactionScores,

    pub staff: StaffState,
    pub menu: MenuState,
    pub inventory: InventoryState,
    pub facility: FacilityState,
    pub suppliers: SupplierSelection,
    pub promotions: PromotionState,
    pub feedback: FeedbackState,
    pub compliance_record: ComplianceRecord,
}

impl Default for Venue {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: "Venue".to_string(),
            type_id: "bistro".to_string(),
            concept_id: "modern_a_la_carte".to_string(),
            price_position: 0.0,
            foot_traffic: 50.0,
            fitout_quality: 50.0,
            occupancy_pct: 0.09,
            equipment_debt: false,
            owner_run: true,
            popularity: 50.0,
            chef_skill: 46.0,
            manager_skill: 42.0,
            cleanliness: 60.0,
            procurement_skill: 35.0,
            local_reputation: 50.0,
            regulars: 0,
            staff_stress: 30.0,
            burnout: 12.0,
            morale: 70.0,
            waste_pct: 0.10,
            compliance: 60.0,
            closure_weeks: 0,
            review_buzz: 0.0,
            lease_years_remaining: 5.0,
            purchase_price: 0.0,
            acquired_week: 0,
            satisfaction: SatisfactionScores::default(),
            staff: StaffState::default(),
            menu: MenuState::default(),
            inventory: InventoryState::default(),
            facility: FacilityState::default(),
            suppliers: SupplierSelection::default(),
            promotions: PromotionState::default(),
            feedback: FeedbackState::default(),
            compliance_record: ComplianceRecord::default(),
        }
    }
}

impl Venue {
    /// Whether the venue is closed for the current week.
    pub fn is_closed(&self) -> bool {
        self.closure_weeks > 0
    }
}

/// Satisfaction sub-scores and their weighted composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatisfactionScores {
    pub food: f64,
    pub speed: f64,
    pub value: f64,
    pub clean: f64,
    pub vibe: f64,
    pub composite: f64,
}

impl Default for SatisfactionScores {
    fn default() -> Self {
        Self {
            food: 60.0,
            speed: 60.0,
            value: 60.0,
            clean: 60.0,
            vibe: 60.0,
            composite: 60.0,
        }
    }
}

// ---- Staff ----

/// Named leadership roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Gm,
    Chef,
    Foh,
}

/// Ten skill axes. Hires only fill the axes their role covers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillSet {
    pub ops: f64,
    pub finance: f64,
    pub people: f64,
    pub standards: f64,
    pub culinary: f64,
    pub consistency: f64,
    pub cost: f64,
    pub pace: f64,
    pub service: f64,
    pub recovery: f64,
}

/// A named hire in a leadership role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hire {
    pub name: String,
    pub role: StaffRole,
    #[serde(default)]
    pub wage_weekly: f64,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<String>,
}

/// Heads per kitchen station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationStaff {
    pub cold: u32,
    pub pan: u32,
    pub grill: u32,
    pub fryer: u32,
    pub pastry: u32,
    pub bar: u32,
    pub coffee: u32,
    pub prep: u32,
}

impl StationStaff {
    /// Line heads (everything except prep).
    pub fn line_heads(&self) -> u32 {
        self.cold + self.pan + self.grill + self.fryer + self.pastry + self.bar + self.coffee
    }

    /// Heads on a named station, if the name is known.
    pub fn get(&self, station: &str) -> Option<u32> {
        match station {
            "cold" => Some(self.cold),
            "pan" => Some(self.pan),
            "grill" => Some(self.grill),
            "fryer" => Some(self.fryer),
            "pastry" => Some(self.pastry),
            "bar" => Some(self.bar),
            "coffee" => Some(self.coffee),
            "prep" => Some(self.prep),
            _ => None,
        }
    }

    /// Mutable access to a named station.
    pub fn get_mut(&mut self, station: &str) -> Option<&mut u32> {
        match station {
            "cold" => Some(&mut self.cold),
            "pan" => Some(&mut self.pan),
            "grill" => Some(&mut self.grill),
            "fryer" => Some(&mut self.fryer),
            "pastry" => Some(&mut self.pastry),
            "bar" => Some(&mut self.bar),
            "coffee" => Some(&mut self.coffee),
            "prep" => Some(&mut self.prep),
            _ => None,
        }
    }
}

/// Training levels (0..=10) per area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingLevels {
    pub ops: u8,
    pub consistency: u8,
    pub cost: u8,
    pub pace: u8,
    pub standards: u8,
}

/// Hourly crew roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub enabled: bool,
    pub open_days: u32,
    pub shifts_per_day: u32,
    pub hours_per_shift: u32,
    pub kitchen_per_shift: u32,
    pub foh_per_shift: u32,
    pub bar_per_shift: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            enabled: false,
            open_days: 6,
            shifts_per_day: 2,
            hours_per_shift: 6,
            kitchen_per_shift: 3,
            foh_per_shift: 3,
            bar_per_shift: 1,
        }
    }
}

/// Which areas the owner has handed to a hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Delegation {
    pub ops: bool,
    pub menu: bool,
    pub foh: bool,
}

/// Everything the staff model reads for one venue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gm: Option<Hire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chef: Option<Hire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foh: Option<Hire>,
    pub stations: StationStaff,
    pub training: TrainingLevels,
    pub roster: Roster,
    pub delegation: Delegation,
}

impl StaffState {
    /// All named hires currently employed.
    pub fn hires(&self) -> impl Iterator<Item = &Hire> {
        [self.gm.as_ref(), self.chef.as_ref(), self.foh.as_ref()]
            .into_iter()
            .flatten()
    }

    pub fn slot(&self, role: StaffRole) -> &Option<Hire> {
        match role {
            StaffRole::Gm => &self.gm,
            StaffRole::Chef => &self.chef,
            StaffRole::Foh => &self.foh,
        }
    }

    pub fn slot_mut(&mut self, role: StaffRole) -> &mut Option<Hire> {
        match role {
            StaffRole::Gm => &mut self.gm,
            StaffRole::Chef => &mut self.chef,
            StaffRole::Foh => &mut self.foh,
        }
    }
}

// ---- Menu ----

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub station: String,
    pub price: f64,
    pub cost: f64,
    /// Prep complexity 0..100
    pub prep: f64,
    /// Relative popularity 1..5
    pub popularity: f64,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
}

impl Default for MenuItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: "Untitled".to_string(),
            category: "mains".to_string(),
            station: "pan".to_string(),
            price: 0.0,
            cost: 0.0,
            prep: 50.0,
            popularity: 3.0,
            active: true,
            last_price: None,
        }
    }
}

/// The venue's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuState {
    pub style: String,
    pub items: Vec<MenuItem>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            style: "a_la_carte".to_string(),
            items: Vec::new(),
        }
    }
}

// ---- Inventory ----

/// An order placed but not yet received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingOrder {
    pub value: f64,
    pub arrives_week: u32,
}

/// Stock held for one supply category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryStock {
    pub on_hand: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<PendingOrder>,
}

/// Stock ledger and reorder policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryState {
    pub stock: BTreeMap<String, CategoryStock>,
    /// Weeks of usage to hold as a par level
    pub par_weeks: f64,
    pub auto_reorder: bool,
    /// Storage upgrade level 0..=3
    pub storage_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_stocktake_week: Option<u32>,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self {
            stock: BTreeMap::new(),
            par_weeks: 1.2,
            auto_reorder: true,
            storage_level: 0,
            last_stocktake_week: None,
        }
    }
}

// ---- Facility ----

/// An open equipment breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentIssue {
    pub equipment_id: String,
    pub downtime_weeks: u32,
    pub opened_week: u32,
}

/// A renovation in progress.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenovationProgress {
    pub renovation_id: String,
    pub weeks_left: u32,
}

/// Building and equipment condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityState {
    pub condition: f64,
    /// Maintenance spend multiplier, 0.6..1.5
    pub maintenance_level: f64,
    /// Weeks of reduced service left (breakdowns, renovation)
    pub downtime_weeks: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<EquipmentIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renovation: Option<RenovationProgress>,
}

impl Default for FacilityState {
    fn default() -> Self {
        Self {
            condition: 75.0,
            maintenance_level: 1.0,
            downtime_weeks: 0,
            issues: Vec::new(),
            renovation: None,
        }
    }
}

// ---- Suppliers ----

/// Supplier chosen per category when no group contract applies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierSelection {
    pub chosen: BTreeMap<String, String>,
}

// ---- Promotions ----

/// A running promotion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionInstance {
    pub id: String,
    pub promo_type: String,
    pub weeks_left: u32,
    pub demand_boost: f64,
    pub foot_traffic: f64,
    pub rep_boost: f64,
    pub regulars_boost: f64,
    /// Critic visit that resolves once
    pub critic_roll: bool,
    pub resolved: bool,
    pub started_week: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionState {
    pub active: Vec<PromotionInstance>,
}

// ---- Feedback ----

/// A customer review.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: String,
    pub week: u32,
    pub stars: u8,
    pub platform: String,
    pub text: String,
    pub replied: bool,
}

/// Review history and buzz statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackState {
    /// Newest first, bounded
    pub reviews: Vec<Review>,
    pub avg_stars: f64,
    pub total_reviews: u32,
    pub new_this_week: u32,
    pub negative_this_week: u32,
}

// ---- Compliance ----

/// Inspection history and standard-operating-procedure level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceRecord {
    /// Documented procedures, 0..100
    pub sop: f64,
    pub inspections: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_inspection_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_grade: Option<String>,
    pub fines_total: f64,
}

impl Default for ComplianceRecord {
    fn default() -> Self {
        Self {
            sop: 50.0,
            inspections: 0,
            last_inspection_week: None,
            last_grade: None,
            fines_total: 0.0,
        }
    }
}
