// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kerb - a WhatsApp cab-booking bot.
//!
//! This is the binary entry point for the Kerb webhook server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;

/// Kerb - a WhatsApp cab-booking bot.
#[derive(Parser, Debug)]
#[command(name = "kerb", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match kerb_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            kerb_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        // Running the webhook server is the default action.
        Some(Commands::Serve) | None => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed)
        let config = kerb_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.service.name, "kerb");
        assert_eq!(config.booking.fare, 20);
    }
}
