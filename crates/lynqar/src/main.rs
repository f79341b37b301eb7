// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lynqar - a local, single-user encrypted password vault.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod shell;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use lynqar_config::LynqarConfig;
use lynqar_core::LynqarError;

/// Lynqar - a local, single-user encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "lynqar", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault protected by a master passphrase.
    Init,
    /// Add an entry.
    Add {
        title: String,
        #[arg(long, short)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Comma-separated tags. Suggested from the URL when omitted.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Generate a random password instead of prompting for one.
        #[arg(long, short)]
        generate: bool,
    },
    /// List entries, optionally filtered by title or username.
    List { query: Option<String> },
    /// Remove an entry by id or unique id prefix.
    Remove { id: String },
    /// Show vault location and settings.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Generate a random password.
    Generate {
        #[arg(long, short, default_value_t = lynqar_vault::password::DEFAULT_LENGTH)]
        length: usize,
    },
    /// Launch an interactive session that stays unlocked until idle.
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lynqar_config::load_and_validate_path(path),
        None => lynqar_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lynqar_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: LynqarConfig) -> Result<(), LynqarError> {
    match command {
        Some(Commands::Init) => commands::run_init(&config).await,
        Some(Commands::Add {
            title,
            username,
            url,
            tags,
            generate,
        }) => {
            let args = commands::AddArgs {
                title,
                username,
                url,
                tags,
                generate,
            };
            commands::run_add(&config, args).await
        }
        Some(Commands::List { query }) => commands::run_list(&config, query.as_deref()).await,
        Some(Commands::Remove { id }) => commands::run_remove(&config, &id).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Generate { length }) => {
            if length == 0 {
                return Err(LynqarError::InvalidEntry(
                    "password length must be at least 1".to_string(),
                ));
            }
            commands::run_generate(length);
            Ok(())
        }
        Some(Commands::Shell) => shell::run_shell(config).await,
        None => {
            println!("lynqar: use --help for available commands");
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lynqar={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
