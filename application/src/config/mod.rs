//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`GenerationParams`]: sampling options and request timeout
//! - [`CacheParams`]: response cache and model list freshness
//! - [`SessionParams`]: history window and session registry bounds
//! - [`AugmentationParams`]: search re-query for uncertain chat answers

pub mod augmentation_params;
pub mod cache_params;
pub mod generation_params;
pub mod session_params;

pub use augmentation_params::AugmentationParams;
pub use cache_params::CacheParams;
pub use generation_params::GenerationParams;
pub use session_params::SessionParams;
