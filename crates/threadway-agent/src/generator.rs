// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model invocation for one turn.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use threadway_config::model::AgentConfig;
use threadway_core::types::CompletionRequest;
use threadway_core::{ModelMessage, ProviderAdapter, ThreadwayError};
use tracing::{debug, info, warn};

/// Why a completion produced no usable reply.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion provider failed: {0}")]
    Provider(#[source] ThreadwayError),

    #[error("completion returned no text")]
    EmptyCompletion,
}

/// Calls the completion service with a fixed system prompt and a deadline.
#[derive(Clone)]
pub struct ResponseGenerator {
    provider: Arc<dyn ProviderAdapter>,
    system_prompt: String,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn ProviderAdapter>, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            model: None,
            max_tokens: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin the model instead of using the provider's default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Generate the reply to `new_user_text` given the prior `history`.
    ///
    /// Returns only the completion text, trimmed.
    pub async fn generate(
        &self,
        history: Vec<ModelMessage>,
        new_user_text: &str,
    ) -> Result<String, GenerationError> {
        let mut messages = history;
        messages.push(ModelMessage::user(new_user_text));
        let turns = messages.len();

        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            messages,
            max_tokens: self.max_tokens,
        };

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))?
            .map_err(GenerationError::Provider)?;

        debug!(
            turns,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );

        let text = response.content.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }
        Ok(text.to_string())
    }
}

/// Resolve the system prompt: file, then inline, then a default naming the assistant.
pub async fn load_system_prompt(agent: &AgentConfig) -> String {
    if let Some(path) = &agent.system_prompt_file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if !content.trim().is_empty() => {
                info!(path = %path, "loaded system prompt from file");
                return content.trim().to_string();
            }
            Ok(_) => warn!(path = %path, "system prompt file is empty, falling back"),
            Err(e) => warn!(path = %path, error = %e, "failed to read system prompt file, falling back"),
        }
    }

    if let Some(prompt) = &agent.system_prompt
        && !prompt.trim().is_empty()
    {
        return prompt.clone();
    }

    format!("You are {}, a helpful WhatsApp assistant.", agent.name)
}
