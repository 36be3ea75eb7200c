// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! reelwatch - track movies and TV shows from Telegram.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// reelwatch - track movies and TV shows from Telegram.
#[derive(Parser, Debug)]
#[command(name = "reelwatch", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot and the background show checker.
    Serve,
    /// Run one check cycle now and exit.
    CheckNow,
    /// Show the checker's persisted state and recent tasks.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
        /// Number of recent tasks to list.
        #[arg(long, default_value_t = 10)]
        tasks: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => reelwatch_config::load_and_validate_path(path),
        None => reelwatch_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            reelwatch_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckNow) => serve::run_check_now(config).await,
        Some(Commands::Status { json, plain, tasks }) => {
            status::run_status(&config, json, plain, tasks).await
        }
        None => {
            println!("reelwatch: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
