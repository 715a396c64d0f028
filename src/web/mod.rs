//! contact-book web server.
//!
//! Serves the contact REST API over a CSV-backed [`ContactStore`], with
//! per-client throttling in front of every route.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod throttle;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use crate::rate_limit::RateLimiter;
use crate::store::ContactStore;

use config::{Cli, Config};
use state::shared_state;

/// Entry point: parse CLI, open the store, start the server.
pub async fn run() -> std::io::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli_and_env(cli);

    crate::logging::init();

    tracing::info!("contact-book starting");
    tracing::info!("  data file: {}", config.data_file.display());
    tracing::info!(
        "  rate limit: {} request(s) per {}s per client",
        config.rate_limit.max_requests,
        config.rate_limit.window.as_secs()
    );

    let mut store = ContactStore::new(&config.data_file);
    match store.load() {
        Ok(()) => tracing::info!("  contacts: {}", store.all().len()),
        Err(e) => tracing::warn!("  could not read {}: {e}", store.path().display()),
    }

    let limiter = Arc::new(RateLimiter::new(config.rate_limit));
    limiter.start_sweeper();

    let app = router::build_router(shared_state(store), limiter);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("contact-book listening on http://{}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
