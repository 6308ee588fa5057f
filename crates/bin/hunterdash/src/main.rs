//! # hunterdash — job-hunter admin statistics
//!
//! Composition root that wires the HTTP adapter, the resource store and the
//! dashboard view together, then prints the two stat cards.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise `tracing`
//! - Construct the HTTP resource source (adapter)
//! - Construct the store and the fetch dispatcher, injecting the source via its port trait
//! - Mount the dashboard, wait for both fetches to settle, then animate and print
//! - Unmount on completion or Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod render;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hunterdash_app::dashboard::{Dashboard, DashboardView};
use hunterdash_app::dispatch::FetchDispatcher;
use hunterdash_app::store::ResourceStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("parsing logging.filter")?,
        )
        .with_writer(std::io::stderr)
        .init();

    // Source
    let source = config
        .http_config()
        .build()
        .context("building HTTP client")?;
    tracing::info!(backend = %config.backend.base_url, "hunterdash starting");

    // Store
    let store = Arc::new(ResourceStore::new());
    let dispatcher = FetchDispatcher::new(Arc::new(source), Arc::clone(&store));

    // View
    let view = DashboardView::mount(&dispatcher, config.dashboard_config());

    let settled = tokio::select! {
        result = tokio::time::timeout(
            config.settle_timeout(),
            view.wait_until(Dashboard::is_settled),
        ) => Some(result.ok().flatten()),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(settled) = settled else {
        tracing::info!("interrupted");
        view.unmount().await;
        return Ok(());
    };

    let dashboard = settled.unwrap_or_else(|| {
        tracing::warn!(
            timeout_secs = config.settle_timeout().as_secs(),
            "fetches did not settle, showing last known totals"
        );
        view.current()
    });

    let mut stdout = std::io::stdout();
    render::play(&dashboard, config.dashboard.frames, &mut stdout)
        .await
        .context("writing dashboard")?;

    view.unmount().await;
    Ok(())
}
