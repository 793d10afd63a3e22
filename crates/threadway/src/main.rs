// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Threadway - a WhatsApp AI assistant served over Twilio webhooks.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use threadway_config::ThreadwayConfig;

/// Threadway - a WhatsApp AI assistant served over Twilio webhooks.
#[derive(Parser, Debug)]
#[command(name = "threadway", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Load and validate configuration, then print the effective settings.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => threadway_config::load_and_validate_path(path),
        None => threadway_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            threadway_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => print_config_summary(&config),
    }
}

fn print_config_summary(config: &ThreadwayConfig) {
    let set = |value: &Option<String>| if value.is_some() { "set" } else { "unset" };

    println!("threadway: configuration OK");
    println!("  agent.name               = {}", config.agent.name);
    println!("  agent.log_level          = {}", config.agent.log_level);
    println!(
        "  agent.max_history        = {}",
        config
            .agent
            .history_window()
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    );
    println!("  openai.model             = {}", config.openai.model);
    println!("  openai.api_key           = {}", set(&config.openai.api_key));
    println!("  twilio.auth_token        = {}", set(&config.twilio.auth_token));
    println!("  twilio.validate          = {}", config.twilio.validate_signatures);
    println!("  storage.database_path    = {}", config.storage.database_path);
    println!(
        "  gateway.listen           = {}:{}{}",
        config.gateway.host, config.gateway.port, config.gateway.webhook_path
    );
}
