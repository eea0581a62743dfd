//! Finance Types
//!
//! Loans, capitalized assets and outside investors. The kernel's ledger and
//! governance modules own all mutation; these are the persisted shapes.

use serde::{Deserialize, Serialize};

/// An amortizing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loan {
    pub id: String,
    pub lender: String,
    pub principal: f64,
    pub balance: f64,
    /// Annual percentage rate as a fraction (0.10 = 10%)
    pub apr: f64,
    pub weekly_payment: f64,
    pub weeks_left: u32,
    pub taken_week: u32,
}

impl Default for Loan {
    fn default() -> Self {
        Self {
            id: String::new(),
            lender: "bank".to_string(),
            principal: 0.0,
            balance: 0.0,
            apr: 0.0,
            weekly_payment: 0.0,
            weeks_left: 0,
            taken_week: 0,
        }
    }
}

/// A capitalized asset depreciated on a straight line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedAsset {
    pub id: String,
    pub label: String,
    pub cost: f64,
    pub book: f64,
    pub dep_weekly: f64,
    pub life_weeks: u32,
    pub acquired_week: u32,
}

/// Kind of outside investor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorKind {
    #[default]
    Silent,
    OperatorPartner,
    Preferred,
}

/// Performance terms an investor holds the owner to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureTerms {
    /// Rolling 4-week average net the investor expects
    pub target_weekly_net: f64,
    /// Weeks after joining by which the target must be met
    pub deadline_weeks: u32,
}

/// Investor pressure status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureStatus {
    #[default]
    None,
    Ok,
    Warn,
    Danger,
    Failed,
}

/// An outside equity holder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Investor {
    pub id: String,
    pub name: String,
    pub kind: InvestorKind,
    pub equity: f64,
    pub cash_in: f64,
    /// Annual preferred return rate, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_rate: Option<f64>,
    pub pref_accrued: f64,
    pub paid_out: f64,
    /// Sale of the group requires this investor's approval
    pub sale_approval: bool,
    /// Capital spend above this needs board sign-off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capex_approval_over: Option<f64>,
    pub expansion_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<PressureTerms>,
    pub joined_week: u32,
    pub status: PressureStatus,
    pub fail_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_penalty_week: Option<u32>,
}

/// How profits are distributed to equity holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendPolicy {
    #[default]
    Reinvest,
    Balanced,
    Distribute,
}

impl DividendPolicy {
    /// Payout ratio a policy starts with.
    pub fn default_ratio(self) -> f64 {
        match self {
            DividendPolicy::Reinvest => 0.0,
            DividendPolicy::Balanced => 0.30,
            DividendPolicy::Distribute => 0.55,
        }
    }
}

impl std::fmt::Display for DividendPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DividendPolicy::Reinvest => write!(f, "reinvest"),
            DividendPolicy::Balanced => write!(f, "balanced"),
            DividendPolicy::Distribute => write!(f, "distribute"),
        }
    }
}
