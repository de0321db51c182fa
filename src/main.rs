//! Product Lookup Service: binary entrypoint.
//! Boots the Axum HTTP server with the resolver built from config.

use product_lookup::api::{self, AppState};
use product_lookup::metrics::Metrics;
use product_lookup::{LookupConfig, ProductResolver};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - LOOKUP_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("LOOKUP_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_lookup=info,lookup=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = LookupConfig::load_default()?;
    let resolver = ProductResolver::from_config(&cfg)?;
    tracing::info!(
        providers = ?resolver.provider_names(),
        timeout_secs = cfg.timeout_secs,
        "product resolver ready"
    );

    let metrics = Metrics::init(&cfg)?;
    let router = api::router(AppState { resolver }).merge(metrics.router());

    Ok(router.into())
}
