// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier): compiled defaults,
//! `/etc/threadway/threadway.toml`, `~/.config/threadway/threadway.toml`,
//! `./threadway.toml`, then `THREADWAY_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::model::ThreadwayConfig;

pub(crate) const SYSTEM_CONFIG_FILE: &str = "/etc/threadway/threadway.toml";
pub(crate) const LOCAL_CONFIG_FILE: &str = "threadway.toml";

/// Config sections recognized in `THREADWAY_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["agent", "openai", "twilio", "storage", "gateway"];

/// Path of the per-user config file, if the platform has a config dir.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("threadway").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<ThreadwayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ThreadwayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ThreadwayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ThreadwayConfig, figment::Error> {
    debug!(path = %path.display(), "loading config file");
    Figment::new()
        .merge(Serialized::defaults(ThreadwayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let candidates = [
        Some(PathBuf::from(SYSTEM_CONFIG_FILE)),
        user_config_path(),
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
    ];

    let mut figment = Figment::new().merge(Serialized::defaults(ThreadwayConfig::default()));
    for path in candidates.into_iter().flatten() {
        if path.exists() {
            debug!(path = %path.display(), "merging config file");
        }
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` and not `Env::split("_")`: `THREADWAY_TWILIO_AUTH_TOKEN`
/// must become `twilio.auth_token`, not `twilio.auth.token`.
fn env_provider() -> Env {
    Env::prefixed("THREADWAY_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config key.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn logs_the_file_being_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[gateway]\nport = 4010\n").unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.gateway.port, 4010);
        assert!(logs_contain("loading config file"));
        assert!(logs_contain("custom.toml"));
    }

    #[test]
    fn maps_section_prefix_to_dot() {
        assert_eq!(map_env_key("twilio_auth_token"), "twilio.auth_token");
        assert_eq!(map_env_key("openai_timeout_secs"), "openai.timeout_secs");
        assert_eq!(
            map_env_key("agent_max_history_messages"),
            "agent.max_history_messages"
        );
    }

    #[test]
    fn leaves_unknown_sections_alone() {
        assert_eq!(map_env_key("telemetry_enabled"), "telemetry_enabled");
    }

    #[test]
    fn section_name_must_be_followed_by_underscore() {
        assert_eq!(map_env_key("gatewayport"), "gatewayport");
    }
}
