//! Progress notification port
//!
//! Defines the interface for reporting turn and streaming progress.

use parley_domain::{ModelId, SlotId};

/// Callback for progress updates during chat and dialogue turns
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called before a dialogue participant's inference call
    fn on_turn_start(&self, _slot: SlotId, _model: &ModelId) {}

    /// Called when a turn has been appended (or failed)
    fn on_turn_complete(&self, _slot: SlotId, _model: &ModelId, _success: bool) {}

    // ==================== Stream Callbacks ====================

    /// Called when a model starts streaming.
    fn on_stream_start(&self, _model: &ModelId) {}

    /// Called for each text chunk from a model during streaming.
    fn on_stream_chunk(&self, _model: &ModelId, _chunk: &str) {}

    /// Called when a model finishes streaming, successfully or not.
    fn on_stream_end(&self, _model: &ModelId) {}

    /// Called when an uncertain chat answer is re-queried with search context.
    fn on_augmenting(&self, _query: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}
