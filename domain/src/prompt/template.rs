//! Prompt templates for the single-model chat path

use crate::chat::augmentation::SearchHit;
use crate::session::entities::Message;

/// Grounding text supplied with a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatGrounding<'a> {
    /// Text extracted from an uploaded document
    Document(&'a str),
    /// A document attached earlier in the chat
    ChatDocument(&'a str),
}

/// Templates for building chat prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt messages for one chat request.
    ///
    /// The optional system instruction comes first, then earlier turns of
    /// the conversation in order, then the new message. With grounding, the
    /// document and question are folded into a single system message;
    /// otherwise the message is sent as the user turn.
    pub fn chat_messages(
        system: Option<&str>,
        history: &[Message],
        message: &str,
        grounding: Option<ChatGrounding<'_>>,
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(instruction) = system.map(str::trim).filter(|s| !s.is_empty()) {
            messages.push(Message::system(instruction));
        }
        messages.extend_from_slice(history);

        messages.push(match grounding {
            Some(ChatGrounding::Document(text)) => Message::system(format!(
                "Context from document:\n{}\n\nUser question: {}",
                text, message
            )),
            Some(ChatGrounding::ChatDocument(text)) => Message::system(format!(
                "Context from chat document:\n{}\n\nUser question: {}",
                text, message
            )),
            None => Message::user(message),
        });
        messages
    }

    /// Query text enriched with numbered search results.
    pub fn search_augmented(query: &str, hits: &[SearchHit]) -> String {
        let mut prompt = format!("{}\n\nContext from web search:", query);
        for (i, hit) in hits.iter().enumerate() {
            prompt.push_str(&format!("\n{}. {}: {}", i + 1, hit.title, hit.snippet));
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::entities::Role;

    #[test]
    fn test_plain_chat_is_user_message() {
        let messages = PromptTemplate::chat_messages(None, &[], "What is Rust?", None);
        assert_eq!(messages, vec![Message::user("What is Rust?")]);
    }

    #[test]
    fn test_system_and_history_precede_new_message() {
        let history = vec![
            Message::user("My name is Ana."),
            Message::assistant("Nice to meet you, Ana."),
        ];
        let messages =
            PromptTemplate::chat_messages(Some("Answer briefly."), &history, "What is my name?", None);
        assert_eq!(
            messages,
            vec![
                Message::system("Answer briefly."),
                Message::user("My name is Ana."),
                Message::assistant("Nice to meet you, Ana."),
                Message::user("What is my name?"),
            ]
        );

        // A blank instruction adds nothing
        let messages = PromptTemplate::chat_messages(Some("  "), &[], "Hi", None);
        assert_eq!(messages, vec![Message::user("Hi")]);
    }

    #[test]
    fn test_document_grounding_is_system_message() {
        let messages = PromptTemplate::chat_messages(
            None,
            &[],
            "Summarize",
            Some(ChatGrounding::Document("Chapter 1")),
        );
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(
            messages[0].content,
            "Context from document:\nChapter 1\n\nUser question: Summarize"
        );

        let messages = PromptTemplate::chat_messages(
            None,
            &[],
            "Why?",
            Some(ChatGrounding::ChatDocument("notes")),
        );
        assert!(messages[0].content.starts_with("Context from chat document:\nnotes"));
    }

    #[test]
    fn test_search_augmented_numbering() {
        let hits = vec![
            SearchHit::new("Rust", "https://rust-lang.org", "A language"),
            SearchHit::new("Cargo", "https://doc.rust-lang.org/cargo", "Package manager"),
        ];
        let prompt = PromptTemplate::search_augmented("What is Rust?", &hits);
        assert_eq!(
            prompt,
            "What is Rust?\n\nContext from web search:\n1. Rust: A language\n2. Cargo: Package manager"
        );
    }
}
