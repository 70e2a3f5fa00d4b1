//! crates/liturgy_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the external collaborators the core
//! depends on. These traits form the boundary of the hexagonal architecture, allowing
//! the core to be independent of the concrete HTTP clients.

use crate::domain::{CalendarDate, ChatMessage, RawLiturgicalDay};
use async_trait::async_trait;
use serde_json::Value;

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
///
/// Adapters map infrastructure errors (network, HTTP status, decoding) into these.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid date format: '{0}'. Please use YYYY-MM-DD")]
    InvalidDateFormat(String),
    /// The calendar-data provider failed after retries were exhausted.
    #[error("Liturgical day lookup failed: {0}")]
    UpstreamLookupFailure(String),
    /// A text-generation or chat service could not be reached or returned an error status.
    #[error("Upstream service failure: {0}")]
    UpstreamServiceFailure(String),
    #[error("Malformed upstream payload: {0}")]
    MalformedUpstreamPayload(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Whether the same call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortError::UpstreamLookupFailure(_) | PortError::UpstreamServiceFailure(_)
        )
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait LiturgicalDayLookup: Send + Sync {
    /// Fetches the raw celebrations and season data for a single date.
    async fn lookup_day(&self, date: CalendarDate) -> PortResult<RawLiturgicalDay>;
}

/// Per-call settings for the text-generation service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    /// Ask the model for a JSON response body.
    pub json_response: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            json_response: false,
        }
    }
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Generates free text for a prompt. The output is not guaranteed to be clean JSON
    /// even when `json_response` is requested.
    async fn generate_text(&self, prompt: &str, options: GenerationOptions) -> PortResult<String>;
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Sends a conversation to the chat service and returns its raw JSON response.
    async fn chat_complete(
        &self,
        messages: &[ChatMessage],
        return_related_questions: bool,
    ) -> PortResult<Value>;
}
