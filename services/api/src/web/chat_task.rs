//! services/api/src/web/chat_task.rs
//!
//! The "worker" functions behind the Magisterium endpoints: proxying a conversation
//! and summarizing a single reading.

use liturgy_core::{
    domain::{ChatMessage, NormalizedChatResponse},
    normalize::{extract_summary_field, normalize_chat_response, SUMMARY_UNAVAILABLE},
    ports::{ChatCompletionService, PortError},
};
use tracing::{error, info};

pub const CONNECTION_APOLOGY: &str =
    "I apologize, but I encountered an error when connecting to the Magisterium API. Please try again later.";
pub const UNEXPECTED_APOLOGY: &str =
    "I apologize, but an unexpected error occurred. Please try again later.";

pub const SUMMARY_CONNECTION_FALLBACK: &str =
    "Summary unavailable due to connection issues. Please try again later.";
pub const SUMMARY_PARSING_FALLBACK: &str =
    "Summary unavailable due to parsing issues. Please try again later.";
pub const SUMMARY_UNEXPECTED_FALLBACK: &str =
    "Summary unavailable due to an unexpected error. Please try again later.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a Catholic API endpoint that returns JSON. Respond ONLY with the valid JSON array requested. ABSOLUTELY NO introductory text, explanations, markdown formatting, character or word counts, or anything other than the JSON itself. Your entire response MUST start with '[' and end with ']'. Do not wrap the JSON in markdown code blocks. The JSON array should contain objects matching the LiturgicalReading interface: { title: string; citation: string; content: string; summary?: string; }. Ensure 'content' contains the full text of the reading and 'summary' is a concise 1-2 sentence overview.";

const SUMMARY_USER_TEMPLATE: &str = "Provide a summary for the following Catholic Mass reading:
{reading}.
For the reading, include:
- summary: A Brief, plain language 3-4 sentence statement of the importance of this passage to the Catholic faith. NEVER INCLUDE CHARACTER COUNTS IN YOUR JSON OUTPUT.

Format the entire response as a single, valid JSON array of objects, where each object represents one reading.
Ensure the JSON is valid and contains only the array.";

/// Sends the conversation upstream and coerces whatever comes back into the chat
/// contract. Upstream failures become an apology message with finish reason `error`.
///
/// Returns the response and whether the upstream call succeeded.
pub async fn proxy_conversation(
    chat: &dyn ChatCompletionService,
    messages: &[ChatMessage],
    return_related_questions: bool,
) -> (NormalizedChatResponse, bool) {
    match chat.chat_complete(messages, return_related_questions).await {
        Ok(raw) => {
            let normalized = normalize_chat_response(&raw);
            info!(choices = normalized.choices.len(), "Magisterium response normalized");
            (normalized, true)
        }
        Err(e) => {
            error!(error = %e, "Magisterium API interaction failed");
            (NormalizedChatResponse::error(apology_for(&e)), false)
        }
    }
}

/// Transient failures get the "try again" apology.
fn apology_for(err: &PortError) -> &'static str {
    if err.is_retryable() {
        CONNECTION_APOLOGY
    } else {
        UNEXPECTED_APOLOGY
    }
}

/// Asks the chat service for a short summary of one reading.
///
/// Never fails: every problem degrades to one of the fixed fallback strings.
pub async fn summarize_reading(chat: &dyn ChatCompletionService, reading: &str) -> String {
    let messages = [
        ChatMessage::new("system", SUMMARY_SYSTEM_PROMPT),
        ChatMessage::new("user", SUMMARY_USER_TEMPLATE.replace("{reading}", reading)),
    ];

    match chat.chat_complete(&messages, false).await {
        Ok(raw) => {
            let normalized = normalize_chat_response(&raw);
            match normalized.first_content() {
                Some(content) => extract_summary_field(content),
                None => SUMMARY_UNAVAILABLE.to_string(),
            }
        }
        Err(e) => {
            error!(error = %e, "Reading summary request failed");
            match e {
                PortError::UpstreamServiceFailure(_) => SUMMARY_CONNECTION_FALLBACK,
                PortError::MalformedUpstreamPayload(_) => SUMMARY_PARSING_FALLBACK,
                _ => SUMMARY_UNEXPECTED_FALLBACK,
            }
            .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use liturgy_core::ports::PortResult;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    enum Reply {
        Body(Value),
        Fail(fn(String) -> PortError),
    }

    struct MockChat {
        reply: Reply,
        seen: Mutex<Vec<(Vec<ChatMessage>, bool)>>,
    }

    impl MockChat {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatCompletionService for MockChat {
        async fn chat_complete(
            &self,
            messages: &[ChatMessage],
            return_related_questions: bool,
        ) -> PortResult<Value> {
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), return_related_questions));
            match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Fail(make) => Err(make("boom".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_proxy_normalizes_successful_reply() {
        let chat = MockChat::new(Reply::Body(json!({
            "choices": [{"message": {"content": "Grace builds on nature."}}],
            "citations": [{"title": "Summa"}]
        })));
        let messages = [ChatMessage::new("user", "What is grace?")];
        let (response, ok) = proxy_conversation(&chat, &messages, true).await;

        assert!(ok);
        assert_eq!(response.first_content(), Some("Grace builds on nature."));
        assert_eq!(response.choices[0].message.role, "assistant");
        assert_eq!(response.citations.len(), 1);
        assert!(response.related_questions.is_empty());
        assert!(chat.seen.lock().unwrap()[0].1);
    }

    #[tokio::test]
    async fn test_proxy_failure_becomes_apology() {
        let chat = MockChat::new(Reply::Fail(PortError::UpstreamServiceFailure));
        let (response, ok) =
            proxy_conversation(&chat, &[ChatMessage::new("user", "hi")], false).await;

        assert!(!ok);
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].finish_reason, "error");
        assert_eq!(response.first_content(), Some(CONNECTION_APOLOGY));
    }

    #[tokio::test]
    async fn test_proxy_fatal_failure_gets_unexpected_apology() {
        for make in [
            PortError::MalformedUpstreamPayload as fn(String) -> PortError,
            PortError::SerializationFailure,
            PortError::Unexpected,
        ] {
            let chat = MockChat::new(Reply::Fail(make));
            let (response, ok) =
                proxy_conversation(&chat, &[ChatMessage::new("user", "hi")], false).await;
            assert!(!ok);
            assert_eq!(response.first_content(), Some(UNEXPECTED_APOLOGY));
        }
    }

    #[test]
    fn test_apology_follows_retryability() {
        assert_eq!(
            apology_for(&PortError::UpstreamLookupFailure("down".into())),
            CONNECTION_APOLOGY
        );
        assert_eq!(
            apology_for(&PortError::MissingField("choices".into())),
            UNEXPECTED_APOLOGY
        );
    }

    #[tokio::test]
    async fn test_summary_extracted_from_first_choice() {
        let content = r#"Here you go: [{"title": "Gospel", "citation": "John 3:16", "content": "...", "summary": "God so loved the world."}]"#;
        let chat = MockChat::new(Reply::Body(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })));
        let summary = summarize_reading(&chat, "John 3:16").await;
        assert_eq!(summary, "God so loved the world.");

        let seen = chat.seen.lock().unwrap();
        let (messages, related) = &seen[0];
        assert!(!related);
        assert_eq!(messages[0].role, "system");
        assert!(messages[1].content.contains("John 3:16."));
    }

    #[tokio::test]
    async fn test_summary_fallbacks() {
        let chat = MockChat::new(Reply::Body(json!({
            "choices": [{"message": {"content": "no array here"}}]
        })));
        assert_eq!(summarize_reading(&chat, "x").await, SUMMARY_UNAVAILABLE);

        let chat = MockChat::new(Reply::Fail(PortError::UpstreamServiceFailure));
        assert_eq!(
            summarize_reading(&chat, "x").await,
            SUMMARY_CONNECTION_FALLBACK
        );

        let chat = MockChat::new(Reply::Fail(PortError::MalformedUpstreamPayload));
        assert_eq!(summarize_reading(&chat, "x").await, SUMMARY_PARSING_FALLBACK);
    }
}
