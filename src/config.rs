// ⚙️ Configuration - command line flags with environment fallbacks

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "contacts.db";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

/// `contact-dedup` keeps stderr quiet: stdout carries the report and the TUI owns the screen
pub const CLI_LOG_FILTER: &str = "warn";
pub const SERVER_LOG_FILTER: &str = "info";

/// Settings shared by every binary
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite database holding the contacts
    #[arg(long = "db", env = "CONTACT_DEDUP_DB", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,
}

#[derive(Debug, Parser)]
#[command(name = "contact-dedup", version, about = "List contacts and remove duplicate entries")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import contacts from a CSV file (display_name,phone_number[,phone_type,photo_uri])
    Import { csv: PathBuf },

    /// Print contacts grouped by initial letter
    List,

    /// Delete duplicate contacts (same name and number), keeping the first
    Dedupe {
        /// Only show what would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactive terminal UI (default)
    Ui,
}

#[derive(Debug, Parser)]
#[command(name = "contact-server", version, about = "HTTP API for the contact deduplicator")]
pub struct ServerCli {
    #[command(flatten)]
    pub config: Config,

    /// Address to listen on
    #[arg(long, env = "CONTACT_DEDUP_ADDR", default_value = DEFAULT_SERVER_ADDR)]
    pub addr: String,
}

/// Install the global tracing subscriber; `RUST_LOG` overrides the default
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
