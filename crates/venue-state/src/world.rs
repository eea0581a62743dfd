//! World Types
//!
//! The long-lived singleton that every weekly tick mutates in place.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::finance::{DividendPolicy, FixedAsset, Investor, Loan};
use crate::venue::Venue;

/// Number of weekly net values kept for rolling averages.
pub const NET_HISTORY_LEN: usize = 12;

/// Bounded ring buffer of recent weekly net values, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetHistory {
    values: VecDeque<f64>,
}

impl NetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, dropping the oldest beyond capacity.
    pub fn push(&mut self, net: f64) {
        self.values.push_back(net);
        self.truncate();
    }

    /// Drops the oldest entries until the buffer fits.
    pub fn truncate(&mut self) {
        while self.values.len() > NET_HISTORY_LEN {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Mean of the most recent `n` values, if any exist.
    pub fn tail_mean(&self, n: usize) -> Option<f64> {
        let take = n.min(self.values.len());
        if take == 0 {
            return None;
        }
        let sum: f64 = self.values.iter().rev().take(take).sum();
        Some(sum / take as f64)
    }
}

/// A group purchasing contract for one supply category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyContract {
    pub supplier_id: String,
    pub term_weeks: u32,
    pub weeks_left: u32,
    pub discount: f64,
    pub started_week: u32,
}

/// Shared supplier market, advanced once per tick before any venue reads it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyMarket {
    /// Price index per category, 1.0 = normal
    pub index: BTreeMap<String, f64>,
    pub central_purchasing: bool,
    pub contracts: BTreeMap<String, SupplyContract>,
}

/// An active goal with a cash reward.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Quest {
    pub id: String,
    pub quest_type: String,
    pub title: String,
    pub reward: f64,
    pub started_week: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestBoard {
    pub active: Vec<Quest>,
    /// Quest types already completed
    pub completed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_roll_week: Option<u32>,
    /// Weeks with at least one loyalty promotion running
    pub loyalty_weeks: u32,
}

/// Complete world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldState {
    pub week: u32,
    pub seed: u64,
    pub home_city: String,
    pub cash: f64,
    pub reputation: f64,
    pub prestige: f64,
    pub owner_dependence: f64,
    pub net_history: NetHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_week_net: Option<f64>,
    pub loans: Vec<Loan>,
    pub fixed_assets: Vec<FixedAsset>,
    pub tax_rate: f64,
    pub tax_accrued: f64,
    pub retained_earnings: f64,
    pub investors: Vec<Investor>,
    pub board_pressure: f64,
    pub dividend_policy: DividendPolicy,
    pub payout_ratio: f64,
    pub venues: Vec<Venue>,
    pub supply: SupplyMarket,
    pub quests: QuestBoard,
    /// Sequence counter for generated ids
    pub next_seq: u64,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            week: 0,
            seed: 42,
            home_city: "perth".to_string(),
            cash: 0.0,
            reputation: 50.0,
            prestige: 0.0,
            owner_dependence: 70.0,
            net_history: NetHistory::new(),
            last_week_net: None,
            loans: Vec::new(),
            fixed_assets: Vec::new(),
            tax_rate: 0.25,
            tax_accrued: 0.0,
            retained_earnings: 0.0,
            investors: Vec::new(),
            board_pressure: 0.0,
            dividend_policy: DividendPolicy::Reinvest,
            payout_ratio: 0.0,
            venues: Vec::new(),
            supply: SupplyMarket::default(),
            quests: QuestBoard::default(),
            next_seq: 1,
        }
    }
}

impl WorldState {
    /// Returns the next id sequence number.
    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_seq.max(1);
        self.next_seq = seq + 1;
        seq
    }

    pub fn venue(&self, id: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    pub fn venue_mut(&mut self, id: &str) -> Option<&mut Venue> {
        self.venues.iter_mut().find(|v| v.id == id)
    }

    pub fn investor(&self, id: &str) -> Option<&Investor> {
        self.investors.iter().find(|i| i.id == id)
    }
}
