//! Single-model chat: document grounding and uncertainty handling.

pub mod augmentation;
pub mod document;
pub mod uncertainty;

pub use augmentation::{SearchHit, usable_hits};
pub use document::DocumentSource;
pub use uncertainty::UncertaintyDetector;
