//! Plain-text transcript rendering

use chrono::{DateTime, Local};
use parley_domain::{Seat, SessionSnapshot, Speaker, TurnRecord};
use std::fmt::Write;

const HEADER_RULE: usize = 50;
const TURN_RULE: usize = 30;

/// Render a transcript:
///
/// ```text
/// TOPIC: Is X better than Y?
/// DATE: 2026-03-01 12:00:00
/// ==================================================
///
/// [moderator]:
/// Is X better than Y?
///
/// ------------------------------
///
/// [participant1 - llama3]:
/// ...
/// ```
pub fn render(snapshot: &SessionSnapshot, exported_at: DateTime<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TOPIC: {}", snapshot.topic);
    let _ = writeln!(out, "DATE: {}", exported_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "TYPE: {}", snapshot.dialogue_type.as_str());
    let _ = writeln!(
        out,
        "ROUNDS: {}/{}",
        snapshot.rounds_completed, snapshot.max_rounds
    );
    out.push_str(&"=".repeat(HEADER_RULE));
    out.push_str("\n\n");

    for turn in &snapshot.transcript {
        let _ = writeln!(out, "[{}]:", label(snapshot, turn));
        out.push_str(&turn.content);
        out.push_str("\n\n");
        out.push_str(&"-".repeat(TURN_RULE));
        out.push_str("\n\n");
    }

    out
}

fn label(snapshot: &SessionSnapshot, turn: &TurnRecord) -> String {
    let speaker = turn.speaker.to_string();
    if let Some(model) = &turn.model {
        return format!("{} - {}", speaker, model);
    }
    match turn.speaker {
        Speaker::Participant(slot) => snapshot
            .participants
            .iter()
            .find(|p| p.slot == slot)
            .and_then(|p| match &p.seat {
                Seat::Human { name } => Some(format!("{} - {}", speaker, name)),
                Seat::Model(_) => None,
            })
            .unwrap_or(speaker),
        Speaker::Moderator => speaker,
    }
}
