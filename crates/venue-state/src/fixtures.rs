//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // venue-state = { path = "../venue-state", features = ["test-fixtures"] }
//!
//! use venue_state::fixtures;
//!
//! let world = fixtures::legacy_world();
//! ```

use crate::WorldState;

/// Returns an older, partially populated world document.
///
/// Contains:
/// - 2 venues, one with out-of-range scores and a partial roster
/// - a net history longer than the ring buffer allows
/// - a world reputation above its bound
pub fn legacy_world() -> WorldState {
    let json = include_str!("../tests/fixtures/legacy_world.json");
    serde_json::from_str(json).expect("Failed to parse legacy_world.json")
}
