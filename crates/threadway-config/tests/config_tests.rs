// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use threadway_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_str, ConfigError,
    ThreadwayConfig,
};

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.agent.name, "threadway");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.agent.max_history_messages, 50);
    assert_eq!(config.openai.model, "gpt-5-mini");
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(config.openai.timeout_secs, 30);
    assert!(config.twilio.validate_signatures);
    assert!(config.twilio.auth_token.is_none());
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("threadway.db"));
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 3000);
    assert_eq!(config.gateway.webhook_path, "/webhooks/twilio");
}

#[test]
fn full_toml_parses() {
    let toml = r#"
[agent]
name = "helper"
log_level = "debug"
system_prompt = "Be brief."
max_history_messages = 20

[openai]
api_key = "sk-test"
model = "gpt-4o-mini"
max_tokens = 512
timeout_secs = 10

[twilio]
auth_token = "secret"
validate_signatures = false
public_url = "https://bot.example.com"

[storage]
database_path = "/tmp/tw.db"
wal_mode = false

[gateway]
host = "0.0.0.0"
port = 8080
webhook_path = "/hooks/wa"
max_concurrent_requests = 8
"#;
    let config = load_and_validate_str(toml).unwrap();
    assert_eq!(config.agent.name, "helper");
    assert_eq!(config.agent.system_prompt.as_deref(), Some("Be brief."));
    assert_eq!(config.agent.max_history_messages, 20);
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.openai.max_tokens, Some(512));
    assert_eq!(config.twilio.auth_token.as_deref(), Some("secret"));
    assert!(!config.twilio.validate_signatures);
    assert_eq!(
        config.twilio.public_url.as_deref(),
        Some("https://bot.example.com")
    );
    assert_eq!(config.storage.database_path, "/tmp/tw.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.max_concurrent_requests, 8);
}

#[test]
fn zero_history_window_from_toml_is_unlimited() {
    let config = load_and_validate_str("[agent]\nmax_history_messages = 0\n").unwrap();
    assert_eq!(config.agent.max_history_messages, 0);
    assert_eq!(config.agent.history_window(), None);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let toml = "[twilio]\nauth_tokn = \"x\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "auth_tokn");
            assert_eq!(suggestion.as_deref(), Some("auth_token"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(errors[0].to_string().contains("telegram"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn validation_errors_surface_after_parse() {
    let errors = load_and_validate_str("[openai]\ntimeout_secs = 0\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn dotted_overrides_win_over_file() {
    // Same shape the THREADWAY_* env provider produces after key mapping.
    let config: ThreadwayConfig = Figment::new()
        .merge(Serialized::defaults(ThreadwayConfig::default()))
        .merge(Toml::string("[twilio]\nauth_token = \"from-file\"\n"))
        .merge(("twilio.auth_token", "from-env"))
        .merge(("gateway.port", 9999))
        .extract()
        .unwrap();
    assert_eq!(config.twilio.auth_token.as_deref(), Some("from-env"));
    assert_eq!(config.gateway.port, 9999);
}

#[test]
fn loads_from_explicit_path() {
    let dir = std::env::temp_dir().join(format!("threadway-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("threadway.toml");
    std::fs::write(&path, "[agent]\nname = \"pathbot\"\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.agent.name, "pathbot");

    std::fs::remove_dir_all(&dir).unwrap();
}
