//! Weekly Report
//!
//! The immutable snapshot a tick emits. Reports are written as JSON Lines
//! and feed rolling averages used by governance.
//!
//! All maps are `BTreeMap` so two runs over identical state serialize to
//! identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::WeekDate;
use crate::venue::SatisfactionScores;

/// One tick's outcome.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyReport {
    pub report_id: String,
    pub week: u32,
    pub date: WeekDate,
    pub city: String,
    pub seasonality: f64,
    pub macro_inflation: f64,
    pub totals: WeekTotals,
    pub feedback: FeedbackSummary,
    pub supply: SupplySummary,
    pub inventory: InventorySummary,
    pub facilities: FacilitySummary,
    pub compliance: ComplianceSummary,
    pub finance: FinanceSummary,
    pub governance: GovernanceSummary,
    pub world: WorldSummary,
    pub venues: Vec<VenueWeekSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<WeekEvent>,
}

/// Summed operating figures across venues.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekTotals {
    pub covers: u32,
    pub sales: f64,
    pub food: f64,
    pub labor: f64,
    pub wages: f64,
    pub occupancy: f64,
    pub other: f64,
    pub net: f64,
    /// (food + labor) / sales
    pub prime_pct: f64,
    pub occupancy_pct: f64,
    pub regulars_delta: i64,
}

/// A review selected for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedReview {
    pub venue_id: String,
    pub mood: String,
    pub stars: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSummary {
    pub praise: BTreeMap<String, u32>,
    pub complaints: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub featured_reviews: Vec<FeaturedReview>,
    pub reviews_new: u32,
    pub reviews_negative: u32,
    pub avg_stars: f64,
    pub viral_events: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplySummary {
    pub index: BTreeMap<String, f64>,
    pub avg_index: f64,
    pub stockouts: u32,
    pub emergency_spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySummary {
    pub waste: f64,
    pub stockouts: u32,
    pub emergency: f64,
    pub on_hand: f64,
    pub incoming: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitySummary {
    pub maintenance: f64,
    pub energy: f64,
    pub new_issues: u32,
    pub down_venues: u32,
    pub avg_condition: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceSummary {
    pub avg_compliance: f64,
    pub inspections: u32,
    pub mystery_visits: u32,
    pub fines: f64,
    pub closures_started: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceSummary {
    pub depreciation: f64,
    pub interest: f64,
    pub loan_payment: f64,
    pub principal_paid: f64,
    pub profit_before_tax: f64,
    pub tax_expense: f64,
    pub profit_after_tax: f64,
    pub tax_accrued: f64,
    pub debt_outstanding: f64,
    pub assets_book: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSummary {
    pub dividends_paid: f64,
    pub preferred_paid: f64,
    pub outside_equity: f64,
    pub board_pressure: f64,
    pub payout_ratio: f64,
}

/// World-level standing after the tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSummary {
    pub cash: f64,
    pub reputation: f64,
    pub prestige: f64,
    pub owner_dependence: f64,
}

/// Per-venue line of the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueWeekSummary {
    pub venue_id: String,
    pub name: String,
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
    pub local_reputation: f64,
    pub compliance: f64,
    pub fine: f64,
    pub stockouts: u32,
}

/// Notable things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekEvent {
    SupplyShock {
        category: String,
        index: f64,
    },
    ContractExpired {
        category: String,
        supplier_id: String,
    },
    Inspection {
        venue_id: String,
        grade: String,
        score: f64,
        fine: f64,
        closure_weeks: u32,
    },
    MysteryDiner {
        venue_id: String,
        overall: f64,
        rep_delta: f64,
    },
    CriticVisit {
        venue_id: String,
        success: bool,
        prestige_delta: f64,
        rep_delta: f64,
    },
    Breakdown {
        venue_id: String,
        equipment_id: String,
        downtime_weeks: u32,
    },
    MaintenanceSkipped {
        venue_id: String,
        cost: f64,
    },
    RenovationComplete {
        venue_id: String,
        renovation_id: String,
    },
    ViralReview {
        venue_id: String,
        shock: f64,
    },
    SickWeek {
        venue_id: String,
    },
    LoanShortPaid {
        loan_id: String,
        due: f64,
        paid: f64,
    },
    LoanRepaid {
        loan_id: String,
    },
    AssetRetired {
        asset_id: String,
    },
    DividendPaid {
        investor_id: String,
        amount: f64,
        preferred: bool,
    },
    InvestorFailed {
        investor_id: String,
        board_pressure: f64,
    },
    PolicyForced {
        from: String,
        to: String,
    },
    QuestStarted {
        quest_id: String,
        quest_type: String,
    },
    QuestCompleted {
        quest_id: String,
        reward: f64,
    },
}

impl WeekEvent {
    /// Venue the event concerns, if it is venue-scoped.
    pub fn venue_id(&self) -> Option<&str> {
        match self {
            WeekEvent::Inspection { venue_id, .. }
            | WeekEvent::MysteryDiner { venue_id, .. }
            | WeekEvent::CriticVisit { venue_id, .. }
            | WeekEvent::Breakdown { venue_id, .. }
            | WeekEvent::MaintenanceSkipped { venue_id, .. }
            | WeekEvent::RenovationComplete { venue_id, .. }
            | WeekEvent::ViralReview { venue_id, .. }
            | WeekEvent::SickWeek { venue_id } => Some(venue_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let ev = WeekEvent::Inspection {
            venue_id: "v_0001".to_string(),
            grade: "B".to_string(),
            score: 72.0,
            fine: 120.0,
            closure_weeks: 0,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.starts_with(r#"{"kind":"inspection""#));
        assert_eq!(ev.venue_id(), Some("v_0001"));

        let shock = WeekEvent::SupplyShock {
            category: "seafood".to_string(),
            index: 1.3,
        };
        assert_eq!(shock.venue_id(), None);
    }

    #[test]
    fn test_empty_events_are_omitted() {
        let report = WeeklyReport::default();
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"events\""));
        let back: WeeklyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
