// src/metrics.rs
//! Prometheus exposition for the lookup counters recorded in `lookup`.

use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::LookupConfig;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder and publish the static shape of the chain:
    /// per-attempt timeout and how many databases hold a usable credential.
    pub fn init(cfg: &LookupConfig) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_gauge!("lookup_provider_timeout_secs", "Per-provider attempt timeout.");
        describe_gauge!("lookup_providers_ordered", "Databases in the lookup chain.");
        describe_gauge!(
            "lookup_providers_credentialed",
            "Credentialed databases with a key configured."
        );

        gauge!("lookup_provider_timeout_secs").set(cfg.timeout_secs as f64);
        gauge!("lookup_providers_ordered").set(cfg.provider_order.len() as f64);
        let c = &cfg.credentials;
        let credentialed = [
            &c.barcode_lookup_key,
            &c.barcode_spider_token,
            &c.upc_database_key,
        ]
        .iter()
        .filter(|k| k.is_some())
        .count();
        gauge!("lookup_providers_credentialed").set(credentialed as f64);

        Ok(Self { handle })
    }

    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
    }
}
