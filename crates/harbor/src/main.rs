// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Harbor - a user-account service with pluggable persistence.
//!
//! This is the binary entry point for the Harbor server.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;

/// Harbor - a user-account service with pluggable persistence.
#[derive(Parser, Debug)]
#[command(name = "harbor", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Harbor HTTP server.
    Serve,
    /// Print the effective configuration.
    Config,
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match harbor_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            harbor_config::render_errors(errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.service.log_level);

    match cli.command {
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("harbor: cannot render config: {err}");
                std::process::exit(1);
            }
        },
        Some(Commands::Serve) | None => {
            if let Err(err) = serve::run(config).await {
                tracing::error!(error = %err, "server exited with an error");
                std::process::exit(1);
            }
        }
    }
}
