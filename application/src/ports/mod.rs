//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod clock;
pub mod conversation_logger;
pub mod inference_gateway;
pub mod progress;
pub mod search;
pub mod transcript_exporter;
