//! Customer Feedback Model
//!
//! Turns a week's satisfaction into praise and complaint tags, an optional
//! featured write-up, platform reviews and review buzz. A low-star review
//! can go viral and knock buzz down hard.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use venue_state::{generate_review_id, FeaturedReview, Review, SatisfactionScores, Venue, WorldState};

use super::{
    venue_entry, CustomerFeedbackModel, FeedbackInput, FeedbackOutcome, StandardCollaborators,
};
use crate::error::ActionError;
use crate::numeric::{clamp, round_half_up};
use crate::rng::{DrawStream, Draws};

/// Constants for reviews and buzz
pub mod feedback_constants {
    pub const TAG_DRAWS: usize = 6;
    pub const FEATURED_CHANCE: f64 = 0.35;
    pub const MAX_REVIEWS_PER_WEEK: f64 = 5.0;
    /// Reviews kept per venue, newest first
    pub const REVIEW_HISTORY: usize = 40;
    pub const BUZZ_DECAY: f64 = 0.85;
    pub const BUZZ_LIMIT: f64 = 20.0;
    /// Reviews at or below this many stars can go viral
    pub const VIRAL_TRIGGER_STARS: u8 = 2;
}

use feedback_constants::*;

pub const PRAISE_TAGS: &[&str] = &[
    "Loved the vibe",
    "Perfect coffee",
    "Great value",
    "Friendly staff",
    "Unreal flavours",
    "Would return",
    "Best in town",
    "Hot, fast and fresh",
    "Beautiful wine list",
];

pub const COMPLAINT_TAGS: &[&str] = &[
    "Slow service",
    "Overpriced",
    "Too salty",
    "Cold food",
    "Noisy",
    "Rude staff",
    "Dirty tables",
    "Tiny portions",
    "Overcooked",
    "Coffee was burnt",
];

const PLATFORMS: &[(&str, f64)] = &[
    ("google", 42.0),
    ("tripadvisor", 18.0),
    ("instagram", 14.0),
    ("tiktok", 10.0),
    ("local_press", 8.0),
    ("food_blog", 8.0),
];

const OPENERS: &[&str] = &[
    "Came in with high hopes.",
    "Dropped by on a whim.",
    "Visited after hearing buzz.",
    "Finally tried it this week.",
    "Booked because a friend recommended it.",
];

/// Mood band for a satisfaction composite.
pub fn mood_for(sat: f64) -> &'static str {
    if sat >= 80.0 {
        "ecstatic"
    } else if sat >= 65.0 {
        "happy"
    } else if sat >= 50.0 {
        "mixed"
    } else {
        "furious"
    }
}

/// Stars for one review.
pub fn review_stars(scores: &SatisfactionScores) -> u8 {
    let score = 0.45 * scores.food + 0.25 * scores.speed + 0.30 * scores.composite;
    clamp(round_half_up(score / 20.0), 1.0, 5.0) as u8
}

fn bad_factor(scores: &SatisfactionScores) -> f64 {
    clamp(
        (70.0 - scores.composite) / 30.0 + (65.0 - scores.speed) / 50.0 + (60.0 - scores.food) / 50.0,
        0.0,
        2.0,
    )
}

fn pick_platform(stream: &mut DrawStream, venue: &Venue) -> &'static str {
    let style = venue.menu.style.as_str();
    let type_id = venue.type_id.as_str();
    let weights: Vec<(&'static str, f64)> = PLATFORMS
        .iter()
        .map(|&(id, w)| {
            let bump = match id {
                "tripadvisor" if matches!(type_id, "winery_restaurant" | "hotel_restaurant") => 8.0,
                "instagram" if style == "tasting" || type_id == "fine_dining" => 6.0,
                "tiktok" if type_id == "food_truck" || style == "cafe" => 4.0,
                "google" if matches!(style, "pub" | "cafe") => 6.0,
                _ => 0.0,
            };
            (id, w + bump)
        })
        .collect();
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut r = stream.next_f64() * total;
    for &(id, w) in &weights {
        r -= w;
        if r <= 0.0 {
            return id;
        }
    }
    "google"
}

fn featured_text(stream: &mut DrawStream, scores: &SatisfactionScores, mood: &str) -> String {
    let mut lines: Vec<&str> = vec![stream.pick(OPENERS).copied().unwrap_or(OPENERS[0])];
    if scores.food >= 78.0 {
        lines.push("The food had real intent, flavours felt deliberate and clean.");
    } else if scores.food <= 55.0 {
        lines.push("The food missed the mark, seasoning and execution felt inconsistent.");
    }
    if scores.speed <= 55.0 {
        lines.push("Service pace was rough. Tickets felt slow and the room got impatient.");
    } else if scores.speed >= 75.0 {
        lines.push("Service flowed smoothly. Timing felt under control.");
    }
    if scores.value <= 50.0 {
        lines.push("For the price, the value didn't stack up.");
    } else if scores.value >= 70.0 {
        lines.push("Value felt fair for what you get.");
    }
    if scores.clean <= 55.0 {
        lines.push("Little cleanliness details stood out in a bad way.");
    }
    if scores.vibe >= 75.0 {
        lines.push("Atmosphere was a big win, you could feel the energy.");
    }
    lines.push(match mood {
        "ecstatic" => "We'll be back, and we're bringing friends.",
        "happy" => "Would return, especially on a quieter night.",
        "mixed" => "Some real potential here, but it needs tightening.",
        _ => "Won't be back unless it seriously improves.",
    });
    lines.join(" ")
}

fn review_text(stream: &mut DrawStream, stars: u8) -> String {
    let pool: &[&str] = if stars >= 4 {
        &[
            "Great flavours and a solid vibe.",
            "Would happily come back.",
            "Service felt warm and confident.",
        ]
    } else if stars <= 2 {
        &["Not worth the wait.", "Kitchen seemed overwhelmed.", "Left disappointed."]
    } else {
        &["Good night overall.", "Decent experience.", "Solid spot."]
    };
    stream.pick(pool).copied().unwrap_or(pool[0]).to_string()
}

impl CustomerFeedbackModel for StandardCollaborators {
    fn process_feedback(
        &self,
        venue: &mut Venue,
        input: FeedbackInput,
        draws: &Draws,
    ) -> FeedbackOutcome {
        let week = draws.week();
        let scores = input.scores;
        let sat = scores.composite;
        let mut stream = draws.venue(&venue.id, "feedback");
        let mut out = FeedbackOutcome::default();

        for _ in 0..TAG_DRAWS {
            let praise = stream.next_f64() > input.complaint_bias;
            let (tags, bucket) = if praise {
                (PRAISE_TAGS, &mut out.praise)
            } else {
                (COMPLAINT_TAGS, &mut out.complaints)
            };
            if let Some(tag) = stream.pick(tags) {
                *bucket.entry(tag.to_string()).or_insert(0) += 1;
            }
        }

        if stream.chance(FEATURED_CHANCE) {
            let mood = mood_for(sat);
            out.featured = Some(FeaturedReview {
                venue_id: venue.id.clone(),
                mood: mood.to_string(),
                stars: clamp(round_half_up(sat / 20.0), 1.0, 5.0) as u8,
                text: featured_text(&mut stream, &scores, mood),
            });
        }

        let lucky = if stream.next_f64() < 0.35 { 1.0 } else { 0.0 };
        let count = clamp(
            round_half_up(round_half_up(input.covers as f64 / 150.0) + lucky + bad_factor(&scores)),
            0.0,
            MAX_REVIEWS_PER_WEEK,
        ) as u32;
        let stars = review_stars(&scores);
        let mut viral_trigger = false;
        for _ in 0..count {
            let platform = pick_platform(&mut stream, venue);
            let text = review_text(&mut stream, stars);
            venue.feedback.total_reviews += 1;
            venue.feedback.reviews.insert(
                0,
                Review {
                    id: generate_review_id(venue.feedback.total_reviews as u64),
                    week,
                    stars,
                    platform: platform.to_string(),
                    text,
                    replied: false,
                },
            );
            out.reviews_new += 1;
            out.stars_sum += stars as u32;
            if stars <= VIRAL_TRIGGER_STARS {
                out.reviews_negative += 1;
                viral_trigger = true;
            }
        }

        let fb = &mut venue.feedback;
        fb.reviews.truncate(REVIEW_HISTORY);
        fb.new_this_week = out.reviews_new;
        fb.negative_this_week = out.reviews_negative;
        if !fb.reviews.is_empty() {
            let sum: f64 = fb.reviews.iter().map(|r| r.stars as f64).sum();
            fb.avg_stars = round_half_up(sum / fb.reviews.len() as f64 * 100.0) / 100.0;
        }

        venue.review_buzz = clamp(venue.review_buzz * BUZZ_DECAY, -BUZZ_LIMIT, BUZZ_LIMIT);
        if viral_trigger {
            let pop = venue.popularity;
            if stream.chance(clamp(0.04 + pop / 2000.0, 0.02, 0.18)) {
                let shock = clamp(
                    6.0 + stream.int_in(0, 12) as f64 + round_half_up((pop - 60.0) / 10.0),
                    6.0,
                    18.0,
                );
                venue.review_buzz = clamp(venue.review_buzz - shock, -BUZZ_LIMIT, BUZZ_LIMIT);
                info!(venue = %venue.id, shock, "Low-star review went viral");
                out.viral_shock = Some(shock);
            }
        }

        debug!(
            venue = %venue.id,
            reviews = out.reviews_new,
            negative = out.reviews_negative,
            buzz = venue.review_buzz,
            "Customer feedback"
        );
        out
    }
}

/// How the owner answers a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReply {
    Apology,
    Invite,
    Defensive,
    Ignore,
}

impl ReviewReply {
    /// Reputation, buzz and cash cost of the reply.
    fn terms(self) -> (f64, f64, f64) {
        match self {
            ReviewReply::Apology => (0.8, 0.2, 0.0),
            ReviewReply::Invite => (1.3, 0.4, 15.0),
            ReviewReply::Defensive => (-1.5, -0.8, 0.0),
            ReviewReply::Ignore => (-0.6, -0.3, 0.0),
        }
    }
}

/// Replies to a review once. An invite the world cannot pay for falls back
/// to an apology. Returns the reply actually sent, or `None` if the review
/// already had one.
pub fn respond_to_review(
    world: &mut WorldState,
    venue_id: &str,
    review_id: &str,
    reply: ReviewReply,
) -> Result<Option<ReviewReply>, ActionError> {
    let cash = world.cash;
    let venue = venue_entry(world, venue_id)?;
    let review = venue
        .feedback
        .reviews
        .iter_mut()
        .find(|r| r.id == review_id)
        .ok_or_else(|| ActionError::UnknownReview(review_id.to_string()))?;
    if review.replied {
        return Ok(None);
    }

    let reply = if reply.terms().2 > cash {
        ReviewReply::Apology
    } else {
        reply
    };
    let (rep, buzz, cost) = reply.terms();
    review.replied = true;
    let weight = match review.stars {
        0..=2 => 1.2,
        3 => 0.6,
        _ => 0.35,
    };
    venue.local_reputation = clamp(venue.local_reputation + rep * weight, 0.0, 100.0);
    venue.review_buzz = clamp(venue.review_buzz + buzz * weight, -BUZZ_LIMIT, BUZZ_LIMIT);
    world.cash -= cost;
    Ok(Some(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::CannedSource;

    fn venue() -> Venue {
        Venue {
            id: "v_0001".into(),
            ..Default::default()
        }
    }

    fn input(covers: u32, sat: f64) -> FeedbackInput {
        FeedbackInput {
            covers,
            scores: SatisfactionScores {
                food: sat,
                speed: sat,
                value: sat,
                clean: sat,
                vibe: sat,
                composite: sat,
            },
            complaint_bias: clamp(0.55 - sat / 200.0, 0.10, 0.80),
        }
    }

    #[test]
    fn test_moods_and_stars() {
        assert_eq!(mood_for(85.0), "ecstatic");
        assert_eq!(mood_for(65.0), "happy");
        assert_eq!(mood_for(50.0), "mixed");
        assert_eq!(mood_for(10.0), "furious");
        assert_eq!(review_stars(&input(0, 90.0).scores), 5);
        assert_eq!(review_stars(&input(0, 5.0).scores), 1);
    }

    #[test]
    fn test_tags_split_by_bias() {
        let mut v = venue();
        let src = CannedSource::constant(0.99);
        let out = StandardCollaborators.process_feedback(&mut v, input(0, 80.0), &Draws::new(&src, 0));
        assert_eq!(out.praise.values().sum::<u32>(), 6);
        assert!(out.complaints.is_empty());
    }

    #[test]
    fn test_reviews_are_bounded_and_unique() {
        let mut v = venue();
        let src = CannedSource::constant(0.3);
        for week in 0..20 {
            let out = StandardCollaborators.process_feedback(&mut v, input(600, 70.0), &Draws::new(&src, week));
            assert!(out.reviews_new <= 5);
        }
        assert_eq!(v.feedback.reviews.len(), REVIEW_HISTORY);
        let mut ids: Vec<&str> = v.feedback.reviews.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), REVIEW_HISTORY);
        assert!(v.feedback.total_reviews > REVIEW_HISTORY as u32);
    }

    #[test]
    fn test_buzz_decays() {
        let mut v = venue();
        v.review_buzz = 10.0;
        let src = CannedSource::constant(0.99);
        StandardCollaborators.process_feedback(&mut v, input(0, 80.0), &Draws::new(&src, 0));
        assert!((v.review_buzz - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_viral_review_hits_buzz() {
        let mut v = venue();
        let src = CannedSource::constant(0.0);
        let out = StandardCollaborators.process_feedback(&mut v, input(300, 20.0), &Draws::new(&src, 0));
        assert!(out.reviews_negative > 0);
        // pop 50: 6 + 0 + round(-1) clamps to 6
        assert_eq!(out.viral_shock, Some(6.0));
        assert_eq!(v.review_buzz, -6.0);
    }

    #[test]
    fn test_respond_once() {
        let mut world = WorldState {
            cash: 10.0,
            venues: vec![venue()],
            ..Default::default()
        };
        world.venues[0].feedback.reviews.push(Review {
            id: "rv_00000001".into(),
            stars: 1,
            ..Default::default()
        });
        let sent = respond_to_review(&mut world, "v_0001", "rv_00000001", ReviewReply::Invite);
        assert_eq!(sent, Ok(Some(ReviewReply::Apology)));
        assert!((world.venues[0].local_reputation - 50.96).abs() < 1e-9);
        assert_eq!(
            respond_to_review(&mut world, "v_0001", "rv_00000001", ReviewReply::Ignore),
            Ok(None)
        );
        assert_eq!(
            respond_to_review(&mut world, "v_0001", "rv_x", ReviewReply::Ignore),
            Err(ActionError::UnknownReview("rv_x".into()))
        );
        assert_eq!(world.cash, 10.0);
    }
}
