//! Configuration types and constants for the contact-book server.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::rate_limit::RateLimitConfig;

pub(crate) const DEFAULT_PORT: u16 = 8000;
pub(crate) const DEFAULT_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_DATA_FILE: &str = "contacts.csv";
pub(crate) const DEFAULT_RATE_LIMIT: u32 = 100;
pub(crate) const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

/// HTTP contact book backed by a CSV file.
///
/// Configuration can be set via CLI arguments or environment variables.
/// CLI arguments take precedence over environment variables.
#[derive(Parser, Debug, Default)]
#[command(name = "contact-book", version, about)]
pub struct Cli {
    /// Port to listen on [env: PORT] [default: 8000]
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Interface to bind [env: CONTACT_BOOK_HOST] [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// CSV file holding the contacts [env: CONTACT_BOOK_FILE] [default: contacts.csv]
    #[arg(long, short = 'f')]
    pub data_file: Option<PathBuf>,

    /// Requests allowed per client per window [env: CONTACT_BOOK_RATE_LIMIT] [default: 100]
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Rate-limit window length in seconds [env: CONTACT_BOOK_RATE_WINDOW_SECS] [default: 60]
    #[arg(long)]
    pub rate_window_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_file: PathBuf,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    pub fn from_cli_and_env(cli: Cli) -> Self {
        Self::from_cli_and_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Resolve the configuration with `lookup` standing in for the process
    /// environment. Unparsable environment values fall back to the default.
    pub fn from_cli_and_lookup(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = cli
            .port
            .or_else(|| parse_var(&lookup, "PORT"))
            .unwrap_or(DEFAULT_PORT);

        let host = cli
            .host
            .or_else(|| lookup("CONTACT_BOOK_HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let data_file = cli
            .data_file
            .or_else(|| lookup("CONTACT_BOOK_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let max_requests = cli
            .rate_limit
            .or_else(|| parse_var(&lookup, "CONTACT_BOOK_RATE_LIMIT"))
            .unwrap_or(DEFAULT_RATE_LIMIT);

        let window_secs = cli
            .rate_window_secs
            .or_else(|| parse_var(&lookup, "CONTACT_BOOK_RATE_WINDOW_SECS"))
            .unwrap_or(DEFAULT_RATE_WINDOW_SECS);

        Self {
            bind_addr: format!("{host}:{port}"),
            data_file,
            rate_limit: RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
            },
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
