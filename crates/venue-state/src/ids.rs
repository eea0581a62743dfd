//! Id helpers.
//!
//! All ids are sequential so a seeded run produces the same ids every time.

/// Generates a venue ID with the given sequence number.
pub fn generate_venue_id(sequence: u64) -> String {
    format!("v_{:04}", sequence)
}

/// Generates a loan ID with the given sequence number.
pub fn generate_loan_id(sequence: u64) -> String {
    format!("ln_{:06}", sequence)
}

/// Generates a fixed-asset ID with the given sequence number.
pub fn generate_asset_id(sequence: u64) -> String {
    format!("fa_{:06}", sequence)
}

/// Generates an investor ID with the given sequence number.
pub fn generate_investor_id(sequence: u64) -> String {
    format!("inv_{:04}", sequence)
}

/// Generates a promotion instance ID with the given sequence number.
pub fn generate_promo_id(sequence: u64) -> String {
    format!("pr_{:06}", sequence)
}

/// Generates a review ID with the given sequence number.
pub fn generate_review_id(sequence: u64) -> String {
    format!("rv_{:08}", sequence)
}

/// Generates a quest instance ID with the given sequence number.
pub fn generate_quest_id(sequence: u64) -> String {
    format!("qs_{:06}", sequence)
}

/// Generates the report ID for a week.
pub fn generate_report_id(week: u32) -> String {
    format!("wk_{:06}", week)
}
