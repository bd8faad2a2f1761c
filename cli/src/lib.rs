//! Terminal host for the todo list view.
//!
//! The core crate decides which requests to send; this crate sends them to
//! the configured origin, feeds the responses back and prints the view.

pub mod cli;
pub mod config;
pub mod session;
pub mod shell;
pub mod transport;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use cli::{Cli, Commands};
pub use config::{load_config, Config, ConfigError};
pub use session::Session;
pub use transport::{Transport, UreqTransport};

/// Run the command-line interface. Returns `false` if the command failed.
pub fn run() -> bool {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.run() {
        Ok(()) => true,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            false
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
