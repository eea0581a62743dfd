//! Quests
//!
//! Short goals with cash rewards. At most three run at once; a new one is
//! rolled every second week from the types not yet active or completed.

use tracing::info;
use venue_state::{generate_quest_id, Quest, WeekEvent, WorldState};

use crate::collab::menu::{menu_metrics, ticket_times};
use crate::numeric::clamp_score;

/// Constants for the quest board
pub mod quest_constants {
    pub const MAX_ACTIVE: usize = 3;
    pub const ROLL_INTERVAL_WEEKS: u32 = 2;
    pub const ROLL_MODULUS: u64 = 997;
    pub const LOYALTY_PROMOTION: &str = "loyalty";
}

use quest_constants::*;

/// A quest type in the pool.
pub struct QuestDef {
    pub id: &'static str,
    pub title: &'static str,
    pub reward_cash: f64,
    /// Local reputation added at every venue
    pub reward_rep: f64,
    pub reward_prestige: f64,
    pub check: fn(&WorldState) -> bool,
}

fn fast_tickets(w: &WorldState) -> bool {
    w.venues.iter().any(|v| ticket_times(v).avg_minutes < 15.0)
}

fn lean_food_cost(w: &WorldState) -> bool {
    w.venues.iter().any(|v| {
        let m = menu_metrics(v);
        m.has_menu && m.food_cost_pct < 0.34
    })
}

fn loyal_regulars(w: &WorldState) -> bool {
    w.venues.iter().any(|v| v.regulars >= 25)
}

fn loyalty_run(w: &WorldState) -> bool {
    w.quests.loyalty_weeks >= 6
}

fn prestige_reached(w: &WorldState) -> bool {
    w.prestige >= 10.0
}

pub const QUEST_POOL: &[QuestDef] = &[
    QuestDef {
        id: "q_ticket",
        title: "Average ticket time under 15 minutes at any venue",
        reward_cash: 1_200.0,
        reward_rep: 2.0,
        reward_prestige: 0.0,
        check: fast_tickets,
    },
    QuestDef {
        id: "q_foodcost",
        title: "Menu food cost under 34% at any venue",
        reward_cash: 1_400.0,
        reward_rep: 1.0,
        reward_prestige: 0.0,
        check: lean_food_cost,
    },
    QuestDef {
        id: "q_regulars",
        title: "Reach 25 regulars at a venue",
        reward_cash: 900.0,
        reward_rep: 2.0,
        reward_prestige: 0.0,
        check: loyal_regulars,
    },
    QuestDef {
        id: "q_promo",
        title: "Run a loyalty promotion for 6 weeks in total",
        reward_cash: 1_000.0,
        reward_rep: 1.0,
        reward_prestige: 0.0,
        check: loyalty_run,
    },
    QuestDef {
        id: "q_prestige",
        title: "Reach prestige 10",
        reward_cash: 1_800.0,
        reward_rep: 0.0,
        reward_prestige: 1.0,
        check: prestige_reached,
    },
];

pub fn quest_def(id: &str) -> Option<&'static QuestDef> {
    QUEST_POOL.iter().find(|q| q.id == id)
}

/// Counts the week toward loyalty goals if any loyalty promotion runs.
pub fn track_loyalty_weeks(world: &mut WorldState) {
    let running = world.venues.iter().any(|v| {
        v.promotions
            .active
            .iter()
            .any(|p| p.promo_type == LOYALTY_PROMOTION && p.weeks_left > 0)
    });
    if running {
        world.quests.loyalty_weeks += 1;
    }
}

fn award(world: &mut WorldState, def: &QuestDef) {
    world.cash += def.reward_cash;
    if def.reward_rep != 0.0 {
        for v in world.venues.iter_mut() {
            v.local_reputation = clamp_score(v.local_reputation + def.reward_rep);
        }
    }
    world.prestige = clamp_score(world.prestige + def.reward_prestige);
}

/// Pays out every active quest whose goal is met.
pub fn complete_quests(world: &mut WorldState) -> Vec<WeekEvent> {
    let done: Vec<Quest> = world
        .quests
        .active
        .iter()
        .filter(|q| quest_def(&q.quest_type).is_some_and(|d| (d.check)(world)))
        .cloned()
        .collect();

    let mut events = Vec::new();
    for quest in done {
        if let Some(def) = quest_def(&quest.quest_type) {
            award(world, def);
        }
        info!(quest = %quest.id, quest_type = %quest.quest_type, reward = quest.reward, "Quest completed");
        world.quests.active.retain(|q| q.id != quest.id);
        world.quests.completed.push(quest.quest_type.clone());
        events.push(WeekEvent::QuestCompleted {
            quest_id: quest.id,
            reward: quest.reward,
        });
    }
    events
}

/// Index into `n` candidates for a given seed and week.
pub fn roll_index(seed: u64, week: u32, n: usize) -> usize {
    let slot = seed.wrapping_add(week as u64 * 17) % ROLL_MODULUS;
    ((slot as f64 / ROLL_MODULUS as f64) * n as f64).floor() as usize
}

/// Adds a quest on even weeks while fewer than three are active.
pub fn roll_quest(world: &mut WorldState) -> Option<WeekEvent> {
    let week = world.week;
    if world.quests.last_roll_week == Some(week) {
        return None;
    }
    world.quests.last_roll_week = Some(week);
    if world.quests.active.len() >= MAX_ACTIVE || week % ROLL_INTERVAL_WEEKS != 0 {
        return None;
    }

    let board = &world.quests;
    let candidates: Vec<&QuestDef> = QUEST_POOL
        .iter()
        .filter(|d| {
            !board.active.iter().any(|q| q.quest_type == d.id)
                && !board.completed.iter().any(|c| c == d.id)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let def = candidates[roll_index(world.seed, week, candidates.len()).min(candidates.len() - 1)];

    let id = generate_quest_id(world.next_sequence());
    world.quests.active.push(Quest {
        id: id.clone(),
        quest_type: def.id.to_string(),
        title: def.title.to_string(),
        reward: def.reward_cash,
        started_week: week,
    });
    info!(quest = %id, quest_type = def.id, "Quest started");
    Some(WeekEvent::QuestStarted {
        quest_id: id,
        quest_type: def.id.to_string(),
    })
}

/// Weekly quest tick: loyalty tracking, completions, then a possible roll.
pub fn tick_quests(world: &mut WorldState) -> Vec<WeekEvent> {
    track_loyalty_weeks(world);
    let mut events = complete_quests(world);
    events.extend(roll_quest(world));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use venue_state::{PromotionInstance, Venue};

    #[test]
    fn test_roll_index_is_stable() {
        assert_eq!(roll_index(42, 0, 5), 0);
        // (42 + 340) % 997 = 382 -> 382/997 x 5 = 1.9
        assert_eq!(roll_index(42, 20, 5), 1);
        assert!(roll_index(u64::MAX, u32::MAX, 5) < 5);
    }

    #[test]
    fn test_rolls_only_on_even_weeks() {
        let mut w = WorldState::default();
        assert!(roll_quest(&mut w).is_some());
        assert!(roll_quest(&mut w).is_none());
        w.week = 1;
        assert!(roll_quest(&mut w).is_none());
        w.week = 2;
        assert!(roll_quest(&mut w).is_some());
        assert_eq!(w.quests.active.len(), 2);
        assert_ne!(w.quests.active[0].quest_type, w.quests.active[1].quest_type);
    }

    #[test]
    fn test_board_caps_at_three() {
        let mut w = WorldState::default();
        for week in (0..20).step_by(2) {
            w.week = week;
            roll_quest(&mut w);
        }
        assert_eq!(w.quests.active.len(), MAX_ACTIVE);
    }

    #[test]
    fn test_completion_pays_once() {
        let mut w = WorldState {
            venues: vec![Venue {
                regulars: 30,
                ..Default::default()
            }],
            ..Default::default()
        };
        w.quests.active.push(Quest {
            id: "qs_000009".into(),
            quest_type: "q_regulars".into(),
            reward: 900.0,
            ..Default::default()
        });
        let events = complete_quests(&mut w);
        assert_eq!(events.len(), 1);
        assert_eq!(w.cash, 900.0);
        assert_eq!(w.venues[0].local_reputation, 52.0);
        assert!(w.quests.active.is_empty());
        assert_eq!(w.quests.completed, vec!["q_regulars".to_string()]);
        assert!(complete_quests(&mut w).is_empty());
    }

    #[test]
    fn test_loyalty_weeks() {
        let mut w = WorldState {
            venues: vec![Venue::default()],
            ..Default::default()
        };
        track_loyalty_weeks(&mut w);
        assert_eq!(w.quests.loyalty_weeks, 0);
        w.venues[0].promotions.active.push(PromotionInstance {
            promo_type: "loyalty".into(),
            weeks_left: 2,
            ..Default::default()
        });
        track_loyalty_weeks(&mut w);
        assert_eq!(w.quests.loyalty_weeks, 1);
    }

    #[test]
    fn test_empty_world_still_ticks() {
        let mut w = WorldState::default();
        let events = tick_quests(&mut w);
        assert_eq!(events.len(), 1);
        assert_eq!(w.quests.last_roll_week, Some(0));
    }
}
