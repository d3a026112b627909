//! Console output formatter for chat replies and dialogue sessions

use colored::Colorize;
use parley_application::ChatReply;
use parley_domain::{
    BackendId, ConfigIssue, ModelId, PersonaSummary, Seat, SessionSnapshot, Severity,
    TurnRecord, TurnState,
};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One dimmed line describing where a chat reply came from
    pub fn format_reply_meta(reply: &ChatReply) -> String {
        let mut parts = vec![
            format!("{} via {}", reply.model, reply.source),
            format!("{:.1}s", reply.processing_time.as_secs_f64()),
        ];
        if reply.cached {
            parts.push("cached".to_string());
        }
        if reply.enhanced {
            parts.push("search-enhanced".to_string());
        }
        format!("[{}]", parts.join(" | ")).dimmed().to_string()
    }

    /// Full reply, for when the text was not streamed
    pub fn format_reply(reply: &ChatReply) -> String {
        format!("{}\n{}", reply.response, Self::format_reply_meta(reply))
    }

    /// Session banner printed once after start
    pub fn format_session_header(snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(&format!(
            "{} - {}",
            capitalize(snapshot.dialogue_type.as_str()),
            snapshot.topic
        )));
        output.push('\n');
        for participant in &snapshot.participants {
            let who = match &participant.seat {
                Seat::Model(seat) => match &seat.persona {
                    Some(persona) => format!("{} @{} as {}", seat.model, seat.source, persona),
                    None => format!("{} @{}", seat.model, seat.source),
                },
                Seat::Human { name } => format!("{} (you)", name),
            };
            output.push_str(&format!(
                "  {} {}\n",
                format!("Slot {}:", participant.slot).cyan(),
                who
            ));
        }
        output.push_str(&format!(
            "  {} {}\n",
            "Rounds:".cyan(),
            snapshot.max_rounds
        ));
        output
    }

    /// A finished turn, for when the text was not streamed
    pub fn format_turn(record: &TurnRecord) -> String {
        let label = match &record.model {
            Some(model) => format!("── {} ({}) ──", record.speaker, model),
            None => format!("── {} ──", record.speaker),
        };
        let label = if record.is_moderator() {
            label.magenta().bold()
        } else {
            label.yellow().bold()
        };
        format!("{}\n{}\n", label, record.content)
    }

    pub fn format_status(snapshot: &SessionSnapshot) -> String {
        let next = match snapshot.state {
            TurnState::NotStarted => "not started".to_string(),
            TurnState::AwaitingTurn(slot) => format!("participant{} (model)", slot),
            TurnState::AwaitingHumanInput(slot) => format!("participant{} (you, use /say)", slot),
            TurnState::Completed => "nobody, the dialogue is complete".to_string(),
        };
        format!(
            "{} {}\n{} {}/{}\n{} {}\n{} {}",
            "Session:".cyan(),
            snapshot.session_id,
            "Rounds:".cyan(),
            snapshot.rounds_completed,
            snapshot.max_rounds,
            "Turns recorded:".cyan(),
            snapshot.transcript.len(),
            "Next:".cyan(),
            next
        )
    }

    pub fn format_models(backend: &BackendId, models: &[ModelId]) -> String {
        if models.is_empty() {
            return format!("No models installed on {}", backend);
        }
        let mut output = format!("{}\n", format!("Models on {}:", backend).cyan().bold());
        for model in models {
            output.push_str(&format!("  - {}\n", model));
        }
        output
    }

    pub fn format_personas(personas: &[PersonaSummary]) -> String {
        let mut output = format!("{}\n", "Personas:".cyan().bold());
        for persona in personas {
            output.push_str(&format!(
                "  {} {}\n{}\n",
                persona.mbti_type.bold(),
                persona.name,
                Self::indent(&persona.description, "      ").dimmed()
            ));
        }
        output
    }

    pub fn format_issue(issue: &ConfigIssue) -> String {
        match issue.severity {
            Severity::Error => format!("{} {}", "error:".red().bold(), issue.message),
            Severity::Warning => format!("{} {}", "warning:".yellow().bold(), issue.message),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::{ConfigIssueCode, SlotId, Speaker};
    use std::time::Duration;

    fn reply(cached: bool, enhanced: bool) -> ChatReply {
        ChatReply {
            response: "Paris.".to_string(),
            model: ModelId::new("llama3"),
            source: BackendId::new("ollama"),
            cached,
            enhanced,
            processing_time: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_reply_meta_flags() {
        let meta = ConsoleFormatter::format_reply_meta(&reply(true, true));
        assert!(meta.contains("llama3 via ollama | 1.5s | cached | search-enhanced"));

        let plain = ConsoleFormatter::format_reply_meta(&reply(false, false));
        assert!(!plain.contains("cached"));
    }

    #[test]
    fn test_format_turn_includes_model() {
        let record = TurnRecord {
            speaker: Speaker::Participant(SlotId::FIRST),
            content: "I disagree.".to_string(),
            model: Some(ModelId::new("mistral")),
            persona: None,
            timestamp: chrono::Utc::now(),
        };
        let out = ConsoleFormatter::format_turn(&record);
        assert!(out.contains("participant1 (mistral)"));
        assert!(out.contains("I disagree."));
    }

    #[test]
    fn test_format_issue() {
        let issue = ConfigIssue {
            severity: Severity::Warning,
            code: ConfigIssueCode::ZeroValue {
                field: "cache.ttl_secs".to_string(),
            },
            message: "cache.ttl_secs: must be greater than zero".to_string(),
        };
        assert!(ConsoleFormatter::format_issue(&issue).contains("cache.ttl_secs"));
    }

    #[test]
    fn test_models_listing() {
        let out = ConsoleFormatter::format_models(
            &BackendId::new("kiklop"),
            &[ModelId::new("llama3:latest")],
        );
        assert!(out.contains("  - llama3:latest"));
        assert_eq!(
            ConsoleFormatter::format_models(&BackendId::new("kiklop"), &[]),
            "No models installed on kiklop"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("debate"), "Debate");
        assert_eq!(capitalize(""), "");
    }
}
