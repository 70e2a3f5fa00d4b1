//! crates/liturgy_core/src/normalize.rs
//!
//! Defensive extraction and normalization of loosely structured model output.
//!
//! Nothing in this module fails outward except `parse_reading_references`: every
//! other function degrades to a well-formed fallback value.

use crate::domain::{ChatChoice, ChatMessage, NormalizedChatResponse, Reading, ReadingSummary};
use crate::ports::{PortError, PortResult};
use serde_json::{Map, Value};
use tracing::{error, warn};

/// Returned by `extract_summary_field` whenever no summary can be recovered.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable. Please check back later.";

const NO_CONTENT: &str = "No content available";
const UNKNOWN_ERROR: &str = "Unknown error";

//=========================================================================================
// Balanced Extraction
//=========================================================================================

/// Returns the substring from the first `open` to the position where the nesting
/// balance of `open`/`close` returns to zero.
///
/// `None` if `open` never occurs or the structure is never closed.
pub fn extract_balanced_json(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut balance: usize = 0;
    for (i, c) in text[start..].char_indices() {
        if c == open {
            balance += 1;
        } else if c == close {
            balance -= 1;
            if balance == 0 {
                return Some(&text[start..start + i + c.len_utf8()]);
            }
        }
    }
    None
}

//=========================================================================================
// Chat Responses
//=========================================================================================

/// Coerces an arbitrary chat-completion payload into the fixed response contract.
///
/// A payload without a usable `choices` list yields a single choice carrying its
/// `error` field (or `"Unknown error"`).
pub fn normalize_chat_response(raw: &Value) -> NormalizedChatResponse {
    let empty = Map::new();
    let data = match raw.as_object() {
        Some(map) => map,
        None => {
            warn!("Chat response is not a JSON object");
            &empty
        }
    };

    let choices = match data.get("choices").and_then(Value::as_array) {
        Some(choices) if !choices.is_empty() => choices.iter().map(normalize_choice).collect(),
        _ => vec![ChatChoice {
            message: ChatMessage::new("assistant", error_text(data.get("error"))),
            finish_reason: "stop".to_string(),
        }],
    };

    let normalized = NormalizedChatResponse {
        choices,
        citations: array_or_empty(data.get("citations")),
        related_questions: array_or_empty(data.get("related_questions")),
    };

    // The envelope leaves the system as JSON; make sure it still serializes.
    match serde_json::to_string(&normalized) {
        Ok(_) => normalized,
        Err(e) => {
            error!(error = %e, "Normalized chat response failed to serialize");
            NormalizedChatResponse::error(format!(
                "I apologize, but an error occurred: Failed to process response: {}",
                e
            ))
        }
    }
}

fn normalize_choice(choice: &Value) -> ChatChoice {
    let Some(choice) = choice.as_object() else {
        return ChatChoice {
            message: ChatMessage::new("assistant", truthy_text_or(choice, NO_CONTENT)),
            finish_reason: "stop".to_string(),
        };
    };

    let message = match choice.get("message") {
        None => ChatMessage::new("assistant", NO_CONTENT),
        Some(Value::Object(message)) => ChatMessage {
            role: field_text_or(message.get("role"), "assistant"),
            content: field_text_or(message.get("content"), NO_CONTENT),
        },
        Some(other) => ChatMessage::new("assistant", truthy_text_or(other, NO_CONTENT)),
    };

    ChatChoice {
        message,
        finish_reason: field_text_or(choice.get("finish_reason"), "stop"),
    }
}

fn error_text(error: Option<&Value>) -> String {
    match error {
        None | Some(Value::Null) => UNKNOWN_ERROR.to_string(),
        Some(value) => value_text(value),
    }
}

fn array_or_empty(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Strings are taken verbatim; anything else is rendered as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(value) => value_text(value),
    }
}

fn truthy_text_or(value: &Value, default: &str) -> String {
    if is_truthy(value) {
        value_text(value)
    } else {
        default.to_string()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

//=========================================================================================
// Readings
//=========================================================================================

/// Pulls `summary` out of the first reading of a JSON array embedded in chat content.
///
/// Any failure returns [`SUMMARY_UNAVAILABLE`].
pub fn extract_summary_field(chat_content: &str) -> String {
    let Some(array) = extract_balanced_json(chat_content, '[', ']') else {
        warn!("Could not find a balanced JSON array in chat content");
        return SUMMARY_UNAVAILABLE.to_string();
    };

    let parsed: Value = match serde_json::from_str(array) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Chat content is not valid JSON");
            return SUMMARY_UNAVAILABLE.to_string();
        }
    };

    // Only the first reading's summary matters; other entries and fields are not checked.
    let summary = parsed
        .as_array()
        .and_then(|readings| readings.first())
        .and_then(|first| first.get("summary"))
        .and_then(Value::as_str);

    match summary {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ => {
            warn!("Summary field not present in chat content");
            SUMMARY_UNAVAILABLE.to_string()
        }
    }
}

/// Parses the reference list returned by the text-generation service.
///
/// Entries that are not objects or lack a non-empty `title` or `reference` are dropped.
pub fn parse_reading_references(text: &str) -> PortResult<Vec<Reading>> {
    let candidate = extract_balanced_json(text, '[', ']').unwrap_or_else(|| text.trim());
    let value: Value = serde_json::from_str(candidate).map_err(|e| {
        PortError::MalformedUpstreamPayload(format!("Failed to parse readings JSON: {}", e))
    })?;

    let Value::Array(items) = value else {
        return Err(PortError::MalformedUpstreamPayload(
            "Readings response is not a list".to_string(),
        ));
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?;
            let reference = item.get("reference")?.as_str()?;
            if title.is_empty() || reference.is_empty() {
                return None;
            }
            Some(Reading::new(title, reference))
        })
        .collect())
}

/// Parses the `{conciseSummary, detailedExplanation}` object returned for a passage.
///
/// Text without any object becomes the concise summary; an object that does not
/// parse is passed through as plain text.
pub fn parse_reading_summary(text: &str) -> ReadingSummary {
    let trimmed = text.trim();
    let Some(object) = extract_balanced_json(trimmed, '{', '}') else {
        return ReadingSummary::Structured {
            summary: trimmed.to_string(),
            detailed_explanation: String::new(),
        };
    };

    match serde_json::from_str::<Value>(object) {
        Ok(Value::Object(map)) => ReadingSummary::Structured {
            summary: field_text_or(map.get("conciseSummary"), ""),
            detailed_explanation: field_text_or(map.get("detailedExplanation"), ""),
        },
        _ => {
            warn!("Failed to parse summary JSON, using text response instead");
            ReadingSummary::Text(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_balanced_nested_array() {
        assert_eq!(
            extract_balanced_json("noise [1,[2,3]] trailing", '[', ']'),
            Some("[1,[2,3]]")
        );
    }

    #[test]
    fn test_extract_balanced_not_found() {
        assert_eq!(extract_balanced_json("no brackets here", '[', ']'), None);
        assert_eq!(extract_balanced_json("open [1, [2] forever", '[', ']'), None);
    }

    #[test]
    fn test_extract_balanced_stops_at_first_structure() {
        let text = "```json\n{\"a\": {\"b\": 1}}\n``` and {\"c\": 2}";
        assert_eq!(extract_balanced_json(text, '{', '}'), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_balanced_ignores_leading_closer() {
        assert_eq!(extract_balanced_json("] then [x]", '[', ']'), Some("[x]"));
    }

    #[test]
    fn test_extract_balanced_multibyte_text() {
        assert_eq!(
            extract_balanced_json("Réponse — [\"Genèse 1:1—2:2\"] fin", '[', ']'),
            Some("[\"Genèse 1:1—2:2\"]")
        );
    }

    #[test]
    fn test_normalize_empty_object() {
        let normalized = normalize_chat_response(&json!({}));
        assert_eq!(normalized.choices.len(), 1);
        assert_eq!(normalized.choices[0].message.content, "Unknown error");
        assert_eq!(normalized.choices[0].message.role, "assistant");
        assert!(normalized.citations.is_empty());
        assert!(normalized.related_questions.is_empty());
    }

    #[test]
    fn test_normalize_non_object() {
        let normalized = normalize_chat_response(&json!(["not", "an", "object"]));
        assert_eq!(normalized.choices.len(), 1);
        assert_eq!(normalized.first_content(), Some("Unknown error"));
    }

    #[test]
    fn test_normalize_uses_error_field() {
        let normalized = normalize_chat_response(&json!({"choices": [], "error": "rate limited"}));
        assert_eq!(normalized.first_content(), Some("rate limited"));

        let normalized = normalize_chat_response(&json!({"error": {"code": 401}}));
        assert_eq!(normalized.first_content(), Some("{\"code\":401}"));
    }

    #[test]
    fn test_normalize_well_formed_response() {
        let raw = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Grace builds on nature."},
                "finish_reason": "stop"
            }],
            "citations": [{"document_title": "Catechism", "source_url": "https://example.org"}],
            "related_questions": ["What is grace?"]
        });
        let normalized = normalize_chat_response(&raw);
        assert_eq!(normalized.first_content(), Some("Grace builds on nature."));
        assert_eq!(normalized.citations.len(), 1);
        assert_eq!(normalized.related_questions, vec![json!("What is grace?")]);
    }

    #[test]
    fn test_normalize_coerces_malformed_choices() {
        let raw = json!({
            "choices": [
                {"message": "bare string"},
                {"message": {"content": 42}},
                {},
                "just text",
                null
            ]
        });
        let normalized = normalize_chat_response(&raw);
        let contents: Vec<&str> = normalized
            .choices
            .iter()
            .map(|c| c.message.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec!["bare string", "42", "No content available", "just text", "No content available"]
        );
        assert!(normalized.choices.iter().all(|c| c.message.role == "assistant"));
        assert!(normalized.choices.iter().all(|c| c.finish_reason == "stop"));
    }

    #[test]
    fn test_normalize_ignores_non_array_extras() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "ok"}}],
            "citations": "none",
            "related_questions": null
        });
        let normalized = normalize_chat_response(&raw);
        assert!(normalized.citations.is_empty());
        assert!(normalized.related_questions.is_empty());
    }

    #[test]
    fn test_extract_summary_field() {
        assert_eq!(extract_summary_field(r#"garbage text [{"summary":"X"}] more"#), "X");
        assert_eq!(extract_summary_field("no array at all"), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field("[]"), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field(r#"[{"title": "Gospel"}]"#), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field(r#"[{"summary": ""}]"#), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field("[1, 2]"), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field("[{\"summary\": \"cut"), SUMMARY_UNAVAILABLE);
        assert_eq!(extract_summary_field(r#"{"summary": "X"}"#), SUMMARY_UNAVAILABLE);
    }

    #[test]
    fn test_extract_summary_field_ignores_other_entries_and_fields() {
        assert_eq!(
            extract_summary_field(r#"[{"title":"Gospel","content":null,"summary":"X"}]"#),
            "X"
        );
        assert_eq!(extract_summary_field(r#"[{"summary":"X"}, "stray"]"#), "X");
        assert_eq!(extract_summary_field(r#"[{"summary":"X","citation":3}]"#), "X");
    }

    #[test]
    fn test_parse_reading_references_filters_entries() {
        let text = r#"Here you go:
[
  {"title": "First Reading", "reference": "Acts 2:14, 22-33"},
  {"title": "Responsorial Psalm"},
  "stray",
  {"title": "", "reference": "Psalm 16"},
  {"title": "Gospel", "reference": "Luke 24:13-35", "extra": true}
]"#;
        let readings = parse_reading_references(text).unwrap();
        assert_eq!(
            readings,
            vec![
                Reading::new("First Reading", "Acts 2:14, 22-33"),
                Reading::new("Gospel", "Luke 24:13-35"),
            ]
        );
    }

    #[test]
    fn test_parse_reading_references_rejects_garbage() {
        assert!(matches!(
            parse_reading_references("I cannot answer that."),
            Err(PortError::MalformedUpstreamPayload(_))
        ));
        assert!(matches!(
            parse_reading_references(r#"{"title": "Gospel"}"#),
            Err(PortError::MalformedUpstreamPayload(_))
        ));
    }

    #[test]
    fn test_parse_reading_summary() {
        let text = r#"Sure! {"conciseSummary": "Short.", "detailedExplanation": "**Long**"}"#;
        assert_eq!(
            parse_reading_summary(text),
            ReadingSummary::Structured {
                summary: "Short.".to_string(),
                detailed_explanation: "**Long**".to_string(),
            }
        );

        assert_eq!(
            parse_reading_summary("  Just prose.  "),
            ReadingSummary::Structured {
                summary: "Just prose.".to_string(),
                detailed_explanation: String::new(),
            }
        );

        assert_eq!(
            parse_reading_summary("{not json}"),
            ReadingSummary::Text("{not json}".to_string())
        );
    }
}
