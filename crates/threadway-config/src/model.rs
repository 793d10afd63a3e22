// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Threadway configuration.
///
/// All sections are optional and default to values that run a local
/// gateway against the public OpenAI endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadwayConfig {
    /// Assistant identity and conversation behavior.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI Chat Completions settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Twilio WhatsApp webhook settings.
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the assistant introduces itself with in the default prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Number of most recent turns sent to the model. `0` sends everything.
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
}

impl AgentConfig {
    /// History window handed to the orchestrator, `None` when unlimited.
    pub fn history_window(&self) -> Option<usize> {
        (self.max_history_messages > 0).then_some(self.max_history_messages)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            max_history_messages: default_max_history_messages(),
        }
    }
}

fn default_agent_name() -> String {
    "threadway".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_history_messages() -> usize {
    50
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every completion.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on generated tokens. Unset leaves it to the model.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Per-generation timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Twilio webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    /// Account auth token used as the HMAC key. Falls back to `TWILIO_AUTH_TOKEN`.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Reject webhook calls whose `X-Twilio-Signature` does not verify.
    #[serde(default = "default_true")]
    pub validate_signatures: bool,

    /// Externally visible base URL (scheme and host) Twilio calls, used
    /// instead of the request's Host headers when reconstructing the signed URL.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            validate_signatures: true,
            public_url: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable write-ahead logging.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("threadway").join("threadway.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "threadway.db".to_string())
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path Twilio posts inbound messages to. Status callbacks go to `{webhook_path}/status`.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Maximum number of webhook requests handled at once.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_webhook_path() -> String {
    "/webhooks/twilio".to_string()
}

fn default_max_concurrent_requests() -> usize {
    64
}
