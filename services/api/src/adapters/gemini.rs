//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for the Gemini text-generation model, reached
//! through its OpenAI-compatible endpoint.
//! It implements the `TextGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use liturgy_core::ports::{GenerationOptions, PortError, PortResult, TextGenerationService};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using Gemini.
#[derive(Clone)]
pub struct GeminiTextAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiTextAdapter {
    /// Creates a new `GeminiTextAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client pointed at the Gemini OpenAI-compatible base URL.
    pub fn client_for(api_base: &str, api_key: &str) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Client::with_config(config)
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for GeminiTextAdapter {
    async fn generate_text(&self, prompt: &str, options: GenerationOptions) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(options.temperature)
            .n(1);
        if options.json_response {
            builder.response_format(ResponseFormat::JsonObject);
        }
        let request = builder
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %self.model, temperature = options.temperature, "Calling Gemini");
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::UpstreamServiceFailure(format!(
                    "Gemini did not respond within {}s",
                    REQUEST_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::UpstreamServiceFailure(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::MissingField("choices[0].message.content".to_string()))
    }
}
