// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for Threadway.
//!
//! Implements [`ProviderAdapter`] over the Chat Completions API. The system
//! prompt arrives with each request and is sent as the leading `system`
//! message.

pub mod client;
pub mod types;

use async_trait::async_trait;
use threadway_config::model::OpenAiConfig;
use threadway_core::types::{CompletionRequest, CompletionResponse, TokenUsage};
use threadway_core::{AdapterType, HealthStatus, PluginAdapter, ProviderAdapter, ThreadwayError};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

/// Environment variable consulted when `openai.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI Chat Completions provider.
///
/// API key resolution order: config, then `OPENAI_API_KEY`, then error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Result<Self, ThreadwayError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(&api_key, &config.base_url, config.model.clone())?;
        info!(model = %config.model, "OpenAI provider initialized");
        Ok(Self {
            client,
            max_tokens: config.max_tokens,
        })
    }

    /// Build a provider around an existing client.
    pub fn with_client(client: OpenAiClient, max_tokens: Option<u32>) -> Self {
        Self { client, max_tokens }
    }

    fn to_chat_request(&self, request: CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(ChatMessage::new("system", request.system_prompt));
        }
        messages.extend(
            request
                .messages
                .into_iter()
                .map(|m| ChatMessage::new(m.role.to_string(), m.content)),
        );

        ChatCompletionRequest {
            model: request
                .model
                .unwrap_or_else(|| self.client.default_model().to_string()),
            messages,
            max_completion_tokens: request.max_tokens.or(self.max_tokens),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadwayError> {
        // No probe call: it would spend tokens on every health poll.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ThreadwayError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ThreadwayError> {
        let api_request = self.to_chat_request(request);
        let response = self.client.create_completion(&api_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ThreadwayError::provider("response contained no choices"))?;
        let usage = response.usage.unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            finish_reason: choice.finish_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<String, ThreadwayError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ThreadwayError::Config(format!(
                "OpenAI API key not found. Set openai.api_key in config or {API_KEY_ENV}."
            ))
        })
}
