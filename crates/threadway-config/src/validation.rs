// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ThreadwayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ThreadwayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if let Some(path) = &config.agent.system_prompt_file
        && path.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "agent.system_prompt_file must not be empty when set",
        ));
    }

    if config.openai.model.trim().is_empty() {
        errors.push(ConfigError::validation("openai.model must not be empty"));
    }

    let base_url = config.openai.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::validation(format!(
            "openai.base_url `{base_url}` must start with http:// or https://"
        )));
    }

    if config.openai.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "openai.timeout_secs must be greater than 0",
        ));
    }

    if config.openai.max_tokens == Some(0) {
        errors.push(ConfigError::validation(
            "openai.max_tokens must be greater than 0 when set",
        ));
    }

    if let Some(url) = &config.twilio.public_url {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "twilio.public_url `{url}` must start with http:// or https://"
            )));
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let host = config.gateway.host.trim();
    let is_ip = host.parse::<std::net::IpAddr>().is_ok();
    let is_hostname = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !is_ip && !is_hostname {
        errors.push(ConfigError::validation(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if !config.gateway.webhook_path.starts_with('/') {
        errors.push(ConfigError::validation(format!(
            "gateway.webhook_path `{}` must start with `/`",
            config.gateway.webhook_path
        )));
    }

    if config.gateway.max_concurrent_requests == 0 {
        errors.push(ConfigError::validation(
            "gateway.max_concurrent_requests must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ThreadwayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = ThreadwayConfig::default();
        config.openai.timeout_secs = 0;
        config.gateway.webhook_path = "webhooks".to_string();
        config.storage.database_path = "  ".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = ThreadwayConfig::default();
        config.agent.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("agent.log_level"));
    }

    #[test]
    fn zero_history_window_means_unlimited() {
        let mut config = ThreadwayConfig::default();
        assert_eq!(config.agent.history_window(), Some(50));

        config.agent.max_history_messages = 0;
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.agent.history_window(), None);
    }

    #[test]
    fn rejects_bad_host() {
        let mut config = ThreadwayConfig::default();
        config.gateway.host = "not a host!".to_string();
        assert!(validate_config(&config).is_err());

        config.gateway.host = "::1".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_public_url_without_scheme() {
        let mut config = ThreadwayConfig::default();
        config.twilio.public_url = Some("bot.example.com".to_string());
        assert!(validate_config(&config).is_err());
    }
}
