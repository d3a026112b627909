//! Progress reporting for chat answers and dialogue turns

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parley_application::ports::progress::ProgressNotifier;
use parley_domain::{ModelId, SlotId};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Streams model output to stdout as it arrives.
///
/// A spinner runs between the request and the first chunk; once text
/// flows it is cleared and chunks are printed verbatim.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> Option<ProgressStyle> {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .ok()
    }

    fn clear_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_turn_start(&self, slot: SlotId, model: &ModelId) {
        println!(
            "{}",
            format!("── participant{} ({}) ──", slot, model).yellow().bold()
        );
    }

    fn on_turn_complete(&self, slot: SlotId, model: &ModelId, success: bool) {
        if !success {
            println!(
                "{} participant{} ({}) did not finish its turn",
                "x".red(),
                slot,
                model
            );
        }
    }

    fn on_stream_start(&self, model: &ModelId) {
        let pb = ProgressBar::new_spinner();
        if let Some(style) = Self::spinner_style() {
            pb.set_style(style);
        }
        pb.set_message(format!("{} is thinking...", model));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn on_stream_chunk(&self, _model: &ModelId, chunk: &str) {
        self.clear_spinner();
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_stream_end(&self, _model: &ModelId) {
        self.clear_spinner();
        println!();
    }

    fn on_augmenting(&self, query: &str) {
        println!(
            "\n{} {}",
            "->".cyan(),
            format!("Unsure answer, searching the web for: {}", query).dimmed()
        );
    }
}
