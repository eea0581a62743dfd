//! Error types.
//!
//! Economic adversity (negative net, zero covers, stockouts) and cash
//! shortfalls inside a tick are never errors. These enums cover loading
//! configuration and player actions that the world cannot honour.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum SetupError {
    #[error("Unknown venue type: {0}")]
    UnknownVenueType(String),

    #[error("Unknown concept: {0}")]
    UnknownConcept(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Acquisition needs {needed:.2} but only {available:.2} is available")]
    InsufficientCash { needed: f64, available: f64 },
}

#[derive(Error, Debug, PartialEq)]
pub enum GovernanceError {
    #[error("Investor not found: {0}")]
    UnknownInvestor(String),

    #[error("Unknown offer template: {0}")]
    UnknownOffer(String),

    #[error("Buyout costs {cost:.2} but cash is {cash:.2}")]
    InsufficientCash { cost: f64, cash: f64 },

    #[error("Offer needs {requested:.2} equity but only {available:.2} is left")]
    EquityExhausted { requested: f64, available: f64 },
}

#[derive(Error, Debug, PartialEq)]
pub enum ActionError {
    #[error("Venue not found: {0}")]
    UnknownVenue(String),

    #[error("Unknown promotion type: {0}")]
    UnknownPromotion(String),

    #[error("Unknown renovation: {0}")]
    UnknownRenovation(String),

    #[error("Renovation already in progress at {0}")]
    RenovationInProgress(String),

    #[error("Unknown supply category: {0}")]
    UnknownCategory(String),

    #[error("Supplier {supplier} does not serve {category}")]
    UnknownSupplier { category: String, supplier: String },

    #[error("Unknown training area: {0}")]
    UnknownTrainingArea(String),

    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("Unknown audit action: {0}")]
    UnknownAuditAction(String),

    #[error("Review not found: {0}")]
    UnknownReview(String),

    #[error("Unknown loan product: {0}")]
    UnknownLoanProduct(String),

    #[error("Action costs {cost:.2} but cash is {cash:.2}")]
    InsufficientCash { cost: f64, cash: f64 },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = GovernanceError::InsufficientCash {
            cost: 1250.0,
            cash: 100.5,
        };
        assert_eq!(err.to_string(), "Buyout costs 1250.00 but cash is 100.50");

        let wrapped: SimError = SetupError::UnknownVenueType("yacht".to_string()).into();
        assert_eq!(wrapped.to_string(), "Setup error: Unknown venue type: yacht");
    }
}
