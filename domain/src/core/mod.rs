//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelId`] / [`model::BackendId`]: which model, on which backend
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: UTF-8 safe truncation helpers

pub mod error;
pub mod model;
pub mod string;
