//! services/api/src/adapters/magisterium.rs
//!
//! This module contains the adapter for the Magisterium chat-completions API.
//! It implements the `ChatCompletionService` port from the `core` crate.
//!
//! The raw JSON body is handed back untouched; shaping it is left to the
//! response normalizer in the core crate.

use async_trait::async_trait;
use liturgy_core::{
    domain::ChatMessage,
    ports::{ChatCompletionService, PortError, PortResult},
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    return_related_questions: bool,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct MagisteriumChatAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl MagisteriumChatAdapter {
    /// Creates a new adapter.
    ///
    /// # Arguments
    /// * `api_url` - full chat-completions endpoint
    /// * `api_key` - bearer token for the API
    /// * `model` - model name, normally `magisterium-1`
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

//=========================================================================================
// `ChatCompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatCompletionService for MagisteriumChatAdapter {
    async fn chat_complete(
        &self,
        messages: &[ChatMessage],
        return_related_questions: bool,
    ) -> PortResult<Value> {
        info!(
            messages = messages.len(),
            return_related_questions, "Sending conversation to Magisterium"
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            return_related_questions,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::UpstreamServiceFailure(format!("Magisterium request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Magisterium API returned error");
            return Err(PortError::UpstreamServiceFailure(format!(
                "Magisterium API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            PortError::MalformedUpstreamPayload(format!("Magisterium response is not JSON: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_omits_related_questions_when_false() {
        let messages = [ChatMessage::new("user", "Who was St. Augustine?")];
        let body = serde_json::to_value(ChatRequest {
            model: "magisterium-1",
            messages: &messages,
            return_related_questions: false,
        })
        .unwrap();
        assert_eq!(body["model"], "magisterium-1");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("return_related_questions").is_none());

        let body = serde_json::to_value(ChatRequest {
            model: "magisterium-1",
            messages: &messages,
            return_related_questions: true,
        })
        .unwrap();
        assert_eq!(body["return_related_questions"], true);
    }
}
