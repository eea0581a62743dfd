//! Persisted state and report types for the venue simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the kernel crate and for anything that reads
//! weekly reports. Every struct tolerates missing fields on load, so an
//! older or partially written document always deserializes; the kernel's
//! repair pass then restores documented defaults before a tick runs.

pub mod calendar;
pub mod finance;
pub mod ids;
pub mod report;
pub mod venue;
pub mod world;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export calendar types
pub use calendar::{ParseWeekError, WeekDate, WEEKS_PER_YEAR};

// Re-export id helpers
pub use ids::{
    generate_asset_id, generate_investor_id, generate_loan_id, generate_promo_id,
    generate_quest_id, generate_report_id, generate_review_id, generate_venue_id,
};

// Re-export finance types
pub use finance::{
    DividendPolicy, FixedAsset, Investor, InvestorKind, Loan, PressureStatus, PressureTerms,
};

// Re-export venue types
pub use venue::{
    CategoryStock, ComplianceRecord, Delegation, EquipmentIssue, FacilityState, FeedbackState,
    Hire, InventoryState, MenuItem, MenuState, PendingOrder, PromotionInstance, PromotionState,
    RenovationProgress, Review, Roster, SatisfactionScores, SkillSet, StaffRole, StaffState,
    StationStaff, SupplierSelection, TrainingLevels, Venue,
};

// Re-export world types
pub use world::{
    NetHistory, Quest, QuestBoard, SupplyContract, SupplyMarket, WorldState, NET_HISTORY_LEN,
};

// Re-export report types
pub use report::{
    ComplianceSummary, FacilitySummary, FeaturedReview, FeedbackSummary, FinanceSummary,
    GovernanceSummary, InventorySummary, SupplySummary, VenueWeekSummary, WeekEvent,
    WeekTotals, WeeklyReport, WorldSummary,
};
