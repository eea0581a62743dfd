//! Output
//!
//! Writers for weekly reports.

pub mod logger;

pub use logger::ReportLogger;
