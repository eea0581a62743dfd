//! Promotion Model
//!
//! Running campaigns add demand, foot traffic, reputation and regulars while
//! they last. A critic invite resolves exactly once.

use tracing::info;
use venue_state::{generate_promo_id, PromotionInstance, SatisfactionScores, Venue, WorldState};

use super::{
    charge, venue_entry, CriticOutcome, PromotionEffects, PromotionModel, PromotionOutcome,
    StandardCollaborators,
};
use crate::catalog::promotion_type;
use crate::error::ActionError;
use crate::numeric::{clamp, clamp_score};
use crate::rng::Draws;

/// Chance a critic writes a favourable piece.
pub fn critic_chance(scores: &SatisfactionScores) -> f64 {
    clamp(
        (scores.food - 55.0) / 70.0 + (scores.composite - 55.0) / 90.0
            - (60.0 - scores.speed) / 120.0,
        -0.15,
        0.85,
    )
}

impl PromotionModel for StandardCollaborators {
    fn promotion_effects(&self, venue: &Venue) -> PromotionEffects {
        venue
            .promotions
            .active
            .iter()
            .fold(PromotionEffects::default(), |mut fx, p| {
                fx.demand_boost += p.demand_boost;
                fx.foot_traffic += p.foot_traffic;
                fx.rep_boost += p.rep_boost;
                fx.regulars_boost += p.regulars_boost;
                fx.critic_pending |= p.critic_roll && !p.resolved;
                fx
            })
    }

    fn resolve_and_tick(
        &self,
        venue: &mut Venue,
        scores: &SatisfactionScores,
        draws: &Draws,
    ) -> PromotionOutcome {
        let mut outcome = PromotionOutcome::default();
        let chance = critic_chance(scores);

        for promo in venue.promotions.active.iter_mut() {
            if !promo.critic_roll || promo.resolved {
                continue;
            }
            promo.resolved = true;
            let mut stream = draws.venue(&venue.id, &format!("promo:{}", promo.id));
            let critic = if stream.chance(chance) {
                CriticOutcome {
                    success: true,
                    prestige_delta: 2.0 + stream.int_in(0, 2) as f64,
                    rep_delta: 3.0 + stream.int_in(0, 2) as f64,
                }
            } else {
                CriticOutcome {
                    success: false,
                    prestige_delta: 0.0,
                    rep_delta: -2.0 - stream.int_in(0, 2) as f64,
                }
            };
            venue.local_reputation = clamp_score(venue.local_reputation + critic.rep_delta);
            info!(
                venue = %venue.id,
                success = critic.success,
                prestige = critic.prestige_delta,
                rep = critic.rep_delta,
                "Critic visit"
            );
            outcome.critic = Some(match outcome.critic {
                Some(prev) => CriticOutcome {
                    success: prev.success || critic.success,
                    prestige_delta: prev.prestige_delta + critic.prestige_delta,
                    rep_delta: prev.rep_delta + critic.rep_delta,
                },
                None => critic,
            });
        }

        for promo in venue.promotions.active.iter_mut() {
            promo.weeks_left = promo.weeks_left.saturating_sub(1);
        }
        venue.promotions.active.retain(|p| p.weeks_left > 0);
        outcome
    }
}

/// Starts a promotion, paying its cost. Returns the new instance id.
pub fn start_promotion(
    world: &mut WorldState,
    venue_id: &str,
    promo_id: &str,
) -> Result<String, ActionError> {
    let kind =
        promotion_type(promo_id).ok_or_else(|| ActionError::UnknownPromotion(promo_id.to_string()))?;
    if world.venue(venue_id).is_none() {
        return Err(ActionError::UnknownVenue(venue_id.to_string()));
    }
    charge(&mut world.cash, kind.cost)?;
    let id = generate_promo_id(world.next_sequence());
    let week = world.week;
    let venue = venue_entry(world, venue_id)?;
    venue.promotions.active.push(PromotionInstance {
        id: id.clone(),
        promo_type: kind.id.to_string(),
        weeks_left: kind.weeks,
        demand_boost: kind.demand_boost,
        foot_traffic: kind.foot_traffic,
        rep_boost: kind.rep_boost,
        regulars_boost: kind.regulars_boost,
        critic_roll: kind.critic_roll,
        resolved: false,
        started_week: week,
    });
    info!(venue = venue_id, promotion = kind.id, id = %id, cost = kind.cost, "Promotion started");
    Ok(id)
}
