//! Compliance Model
//!
//! Rolls the weekly compliance score and checks for health inspections and
//! mystery diner visits. An inspection week skips the mystery diner.

use tracing::{debug, info};
use venue_state::{Venue, WorldState};

use super::{
    charge, venue_entry, AuditContext, ComplianceModel, ComplianceOutcome, InspectionOutcome,
    MysteryOutcome, StandardCollaborators,
};
use crate::catalog::{audit_action, grade_for};
use crate::error::ActionError;
use crate::numeric::{clamp, clamp_score};
use crate::rng::Draws;

/// Compliance score from cleanliness, training, procedures and burnout.
pub fn compliance_score(venue: &Venue, ctx: &AuditContext) -> f64 {
    let training = 50.0 + venue.staff.training.standards as f64 * 5.0;
    let standards_boost = clamp((ctx.standards - 50.0) * 0.08, -6.0, 6.0);
    clamp_score(
        0.36 * ctx.clean_score
            + 0.22 * clamp_score(training)
            + 0.22 * clamp_score(venue.compliance_record.sop)
            + 0.18 * (100.0 - clamp_score(venue.burnout))
            + standards_boost
            - ctx.facility_compliance_hit,
    )
}

/// Weekly chance of a health inspection.
pub fn inspection_risk(compliance: f64, clean: f64, popularity: f64) -> f64 {
    clamp(
        0.03 + clamp((60.0 - compliance) / 1000.0, -0.01, 0.06)
            + clamp((70.0 - clean) / 1200.0, -0.01, 0.05)
            + clamp((popularity - 70.0) / 4000.0, 0.0, 0.03),
        0.01,
        0.12,
    )
}

/// Weekly chance of a mystery diner.
pub fn mystery_chance(popularity: f64) -> f64 {
    clamp(0.02 + popularity / 5000.0, 0.01, 0.08)
}

impl ComplianceModel for StandardCollaborators {
    fn audit(&self, venue: &mut Venue, ctx: AuditContext, draws: &Draws) -> ComplianceOutcome {
        let compliance = compliance_score(venue, &ctx);
        venue.compliance = compliance;
        let mut outcome = ComplianceOutcome {
            compliance,
            ..Default::default()
        };

        let mut stream = draws.venue(&venue.id, "compliance");
        if stream.chance(inspection_risk(compliance, ctx.clean_score, venue.popularity)) {
            let score = clamp_score(compliance + stream.int_in(-8, 8) as f64);
            let grade = grade_for(score);
            let fine = ctx.sales.max(0.0) * grade.fine_pct;

            venue.local_reputation = clamp_score(venue.local_reputation + grade.rep_delta);
            venue.closure_weeks = venue.closure_weeks.max(grade.closure_weeks);
            let record = &mut venue.compliance_record;
            record.inspections += 1;
            record.last_inspection_week = Some(draws.week());
            record.last_grade = Some(grade.grade.to_string());
            record.fines_total += fine;

            info!(
                venue = %venue.id,
                grade = grade.grade,
                score,
                fine,
                closure_weeks = grade.closure_weeks,
                "Health inspection"
            );
            outcome.inspection = Some(InspectionOutcome {
                grade: grade.grade.to_string(),
                score,
                fine,
                closure_weeks: grade.closure_weeks,
                rep_delta: grade.rep_delta,
            });
            return outcome;
        }

        if stream.chance(mystery_chance(venue.popularity)) {
            let food = clamp_score(ctx.food_score + stream.noise(6));
            let speed = clamp_score(ctx.speed_score + stream.noise(6));
            let overall = 0.6 * food + 0.4 * speed;
            let rep_delta = clamp((overall - 70.0) * 0.1, -5.0, 5.0);
            venue.local_reputation = clamp_score(venue.local_reputation + rep_delta);
            info!(venue = %venue.id, overall, rep_delta, "Mystery diner");
            outcome.mystery = Some(MysteryOutcome { overall, rep_delta });
        }

        debug!(venue = %venue.id, compliance, "Compliance check");
        outcome
    }
}

/// Pays for a one-off compliance action (deep clean, pest control, training
/// day).
pub fn run_audit_action(
    world: &mut WorldState,
    venue_id: &str,
    action_id: &str,
) -> Result<(), ActionError> {
    let action = audit_action(action_id)
        .ok_or_else(|| ActionError::UnknownAuditAction(action_id.to_string()))?;
    let mut cash = world.cash;
    charge(&mut cash, action.cost)?;
    let venue = venue_entry(world, venue_id)?;
    venue.cleanliness = clamp_score(venue.cleanliness + action.clean);
    venue.compliance = clamp_score(venue.compliance + action.compliance);
    venue.compliance_record.sop = clamp_score(venue.compliance_record.sop + action.compliance * 0.5);
    venue.burnout = clamp_score(venue.burnout + action.burnout);
    world.cash = cash;
    info!(venue = venue_id, action = action.id, cost = action.cost, "Audit action");
    Ok(())
}
