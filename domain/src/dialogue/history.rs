//! Sliding history window over a dialogue transcript.

use crate::dialogue::entities::TurnRecord;
use crate::dialogue::participant::{SlotId, Speaker};
use crate::session::entities::Message;

/// Selects the most recent turns and maps them to chat roles from the
/// point of view of the upcoming speaker.
///
/// The speaker's own past turns become `assistant` messages; every other
/// entry (other participants, the human, the moderator) becomes `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    size: usize,
}

impl HistoryWindow {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Last `size` turns, oldest first, content verbatim.
    pub fn build(&self, transcript: &[TurnRecord], speaker: SlotId) -> Vec<Message> {
        let start = transcript.len().saturating_sub(self.size);
        transcript[start..]
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::Participant(slot) if slot == speaker => {
                    Message::assistant(turn.content.clone())
                }
                _ => Message::user(turn.content.clone()),
            })
            .collect()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::Role;
    use chrono::Utc;

    fn turn(speaker: Speaker, content: &str) -> TurnRecord {
        TurnRecord {
            speaker,
            content: content.to_string(),
            model: None,
            persona: None,
            timestamp: Utc::now(),
        }
    }

    fn slot(n: u8) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[test]
    fn test_window_keeps_last_ten_in_order() {
        let mut transcript = vec![turn(Speaker::Moderator, "opening")];
        for i in 1..15 {
            let s = if i % 2 == 1 { slot(1) } else { slot(2) };
            transcript.push(turn(Speaker::Participant(s), &format!("turn {}", i)));
        }
        assert_eq!(transcript.len(), 15);

        let messages = HistoryWindow::default().build(&transcript, slot(1));
        assert_eq!(messages.len(), 10);
        assert_eq!(messages[0].content, "turn 5");
        assert_eq!(messages[9].content, "turn 14");
    }

    #[test]
    fn test_roles_from_speaker_perspective() {
        let transcript = vec![
            turn(Speaker::Moderator, "opening"),
            turn(Speaker::Participant(slot(1)), "mine"),
            turn(Speaker::Participant(slot(2)), "theirs"),
        ];
        let messages = HistoryWindow::default().build(&transcript, slot(1));
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);

        let messages = HistoryWindow::default().build(&transcript, slot(2));
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_short_transcript_returned_whole() {
        let transcript = vec![turn(Speaker::Moderator, "only")];
        let messages = HistoryWindow::new(10).build(&transcript, slot(1));
        assert_eq!(messages, vec![Message::user("only")]);
    }
}
