// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `threadway serve`: wire the adapters together and run the gateway.

use std::sync::Arc;
use std::time::{Duration, Instant};

use threadway_agent::generator::load_system_prompt;
use threadway_agent::shutdown::install_signal_handler;
use threadway_agent::{ChatOrchestrator, ResponseGenerator};
use threadway_config::ThreadwayConfig;
use threadway_core::{PluginAdapter, ThreadwayError};
use threadway_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use threadway_openai::OpenAiProvider;
use threadway_storage::SqliteStorage;
use threadway_twilio::SignatureVerifier;
use tracing::{info, warn};

pub async fn run_serve(config: ThreadwayConfig) -> Result<(), ThreadwayError> {
    init_tracing(&config.agent.log_level);

    info!(agent = %config.agent.name, "starting threadway serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let provider = Arc::new(OpenAiProvider::new(&config.openai)?);

    let verifier = if config.twilio.validate_signatures {
        let token = threadway_twilio::resolve_auth_token(config.twilio.auth_token.as_deref())?;
        Some(Arc::new(SignatureVerifier::new(
            token,
            config.twilio.public_url.clone(),
        )))
    } else {
        warn!("twilio.validate_signatures is off, accepting unsigned webhooks");
        None
    };

    let system_prompt = load_system_prompt(&config.agent).await;
    let generator = ResponseGenerator::new(provider.clone(), system_prompt)
        .with_timeout(Duration::from_secs(config.openai.timeout_secs));
    let orchestrator = ChatOrchestrator::new(storage.clone(), storage.clone(), generator)
        .with_history_window(config.agent.history_window());

    let state = GatewayState {
        orchestrator: Arc::new(orchestrator),
        verifier,
        health: HealthState {
            start_time: Instant::now(),
            components: vec![
                storage.clone() as Arc<dyn PluginAdapter>,
                provider.clone() as Arc<dyn PluginAdapter>,
            ],
        },
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        webhook_path: config.gateway.webhook_path.clone(),
        max_concurrent_requests: config.gateway.max_concurrent_requests,
    };

    let cancel = install_signal_handler();
    let served = start_server(&server_config, state, cancel).await;

    if let Err(e) = provider.shutdown().await {
        warn!(error = %e, "provider shutdown failed");
    }
    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }

    served?;
    info!("threadway serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("threadway={log_level},tower_http={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
