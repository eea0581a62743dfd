//! Weekly simulation kernel for a group of hospitality venues.
//!
//! One call to [`orchestrator::run_week`] turns every venue's configuration
//! into sales, costs and satisfaction, settles the group ledger, applies
//! investor governance and returns a [`venue_state::WeeklyReport`]. Given the
//! same world and seed, the result is identical byte for byte.

pub mod catalog;
pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod governance;
pub mod ledger;
pub mod numeric;
pub mod orchestrator;
pub mod output;
pub mod quests;
pub mod repair;
pub mod rng;
pub mod setup;
pub mod valuation;

pub use collab::{Collaborators, StandardCollaborators};
pub use config::SimConfig;
pub use error::{ActionError, ConfigError, GovernanceError, Result, SetupError, SimError};
pub use orchestrator::{run_week, step};
pub use output::ReportLogger;
pub use repair::Repairable;
pub use rng::{CannedSource, Draws, DrawStream, RandomSource, SeededSource};
pub use setup::{acquire_venue, build_world, new_world, VenueRequest};
