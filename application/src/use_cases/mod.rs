//! Use cases (application services)
//!
//! Each use case orchestrates domain logic and ports to fulfil one
//! user-facing operation.

pub mod chat;
pub mod dialogue;
pub mod model_catalog;
pub mod response_cache;
pub mod stream_delivery;

#[cfg(test)]
pub(crate) mod test_support;
