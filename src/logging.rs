//! Logging setup and small formatting helpers for log lines.
//!
//! Output goes through `tracing`. [`init`] installs a `fmt` subscriber on
//! stderr, filtered by `RUST_LOG` (default `info`), with ANSI colours only
//! when stderr is a terminal.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Call once at startup; later calls are
/// ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

const LOG_ID_TRUNCATE_LEN: usize = 8;

fn truncate_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(LOG_ID_TRUNCATE_LEN)
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    &id[..end]
}

/// Short form of a contact id for log lines, e.g. `c-3f2a9b1c`.
pub fn contact_id(id: &str) -> String {
    format!("c-{}", truncate_id(id))
}
