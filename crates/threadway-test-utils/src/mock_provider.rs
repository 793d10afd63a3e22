// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use threadway_core::types::{CompletionRequest, CompletionResponse, TokenUsage};
use threadway_core::{AdapterType, HealthStatus, PluginAdapter, ProviderAdapter, ThreadwayError};

/// Text returned when the response queue is empty.
pub const DEFAULT_RESPONSE: &str = "mock response";

/// A mock provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// [`DEFAULT_RESPONSE`] is returned. Every request is recorded.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    failures: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            ..Self::default()
        }
    }

    /// Sleep this long before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a response to the end of the queue.
    pub fn add_response(&self, text: impl Into<String>) {
        lock(&self.responses).push_back(text.into());
    }

    /// Make the next call fail with a provider error carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        lock(&self.failures).push_back(message.into());
    }

    /// Number of `complete` calls so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ThreadwayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ThreadwayError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ThreadwayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model = request.model.clone().unwrap_or_else(|| "mock-model".to_string());
        lock(&self.requests).push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failure = lock(&self.failures).pop_front();
        if let Some(message) = failure {
            return Err(ThreadwayError::provider(message));
        }

        let text = lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
        Ok(CompletionResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content: text,
            model,
            finish_reason: Some("stop".to_string()),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: None,
            system_prompt: "test".into(),
            messages: vec![],
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content, DEFAULT_RESPONSE);
        assert_eq!(resp.model, "mock-model");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
        assert_eq!(provider.complete(request()).await.unwrap().content, DEFAULT_RESPONSE);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let provider = MockProvider::with_responses(vec!["after".into()]);
        provider.fail_next("boom");
        assert!(provider.complete(request()).await.is_err());
        assert_eq!(provider.complete(request()).await.unwrap().content, "after");
        assert_eq!(provider.requests().len(), 2);
    }
}
