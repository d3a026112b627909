//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod export_format;
pub mod validation;

pub use export_format::ExportFormat;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
