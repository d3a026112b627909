//! Search augmentation parameters for the chat path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationParams {
    /// Re-query uncertain answers with search context.
    pub enabled: bool,
    /// Search results folded into the augmented prompt.
    pub max_search_results: usize,
}

impl Default for AugmentationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            max_search_results: 3,
        }
    }
}
