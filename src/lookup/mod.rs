// src/lookup/mod.rs
//! Product resolution: validate the code, ask each database in priority order,
//! return the first hit, or a synthesized placeholder when none has it.

pub mod fallback;
pub mod providers;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::barcode::NormalizedBarcode;
use crate::config::LookupConfig;
use crate::product::{ProductRecord, ProductSource, ProductSummary};
use providers::OpenFoodFactsProvider;
use types::{LookupEvent, LookupObserver, ProductProvider, ProviderError, TracingObserver};

pub use crate::barcode::ValidationError;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("lookup_requests_total", "Product lookups requested.");
        describe_counter!(
            "lookup_validation_errors_total",
            "Lookups rejected as non-product codes."
        );
        describe_counter!(
            "lookup_provider_errors_total",
            "Provider transport/parse/credential failures."
        );
        describe_counter!(
            "lookup_provider_misses_total",
            "Provider answered without an entry."
        );
        describe_counter!("lookup_resolved_total", "Lookups answered by a provider.");
        describe_counter!("lookup_fallback_total", "Lookups answered by the fallback.");
        describe_histogram!("lookup_provider_ms", "Provider call time in milliseconds.");
    });
}

/// Which databases can currently be asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub barcode_lookup: bool,
    pub open_food_facts: bool,
    pub ean_search: bool,
    pub barcode_spider: bool,
    pub upc_database: bool,
}

/// Stateless lookup pipeline. Cheap to clone; clones share the provider list.
#[derive(Clone)]
pub struct ProductResolver {
    providers: Arc<[Arc<dyn ProductProvider>]>,
    search: Option<Arc<OpenFoodFactsProvider>>,
    observer: Arc<dyn LookupObserver>,
    timeout: Duration,
}

impl ProductResolver {
    /// Providers are tried in exactly the given order.
    pub fn new(providers: Vec<Arc<dyn ProductProvider>>) -> Self {
        Self {
            providers: providers.into(),
            search: None,
            observer: Arc::new(TracingObserver),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Real HTTP providers, ordered as configured.
    pub fn from_config(cfg: &LookupConfig) -> anyhow::Result<Self> {
        let client = providers::build_http_client(cfg)?;
        let list = providers::build_providers(cfg, &client);
        let search = OpenFoodFactsProvider::new(client, &cfg.endpoints.open_food_facts);
        Ok(Self::new(list)
            .with_timeout(cfg.timeout())
            .with_search(Arc::new(search)))
    }

    pub fn with_observer(mut self, observer: Arc<dyn LookupObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search(mut self, search: Arc<OpenFoodFactsProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a scanned payload.
    ///
    /// The only error is a payload that is not a product barcode; in that case
    /// no provider is contacted. Any valid code yields a record.
    pub async fn lookup_product(&self, raw: &str) -> Result<ProductRecord, ValidationError> {
        ensure_metrics_described();
        counter!("lookup_requests_total").increment(1);

        let barcode = match NormalizedBarcode::parse(raw) {
            Ok(b) => b,
            Err(e) => {
                counter!("lookup_validation_errors_total").increment(1);
                self.observer.on_event(&LookupEvent::Rejected {
                    normalized: e.normalized.clone(),
                });
                return Err(e);
            }
        };
        Ok(self.resolve(&barcode).await)
    }

    /// Walk the provider chain for an already validated code.
    pub async fn resolve(&self, barcode: &NormalizedBarcode) -> ProductRecord {
        ensure_metrics_described();

        for (i, provider) in self.providers.iter().enumerate() {
            match self.attempt(provider.as_ref(), barcode).await {
                Ok(record) if record.found => {
                    counter!("lookup_resolved_total", "provider" => provider.name()).increment(1);
                    self.observer.on_event(&LookupEvent::Resolved {
                        source: record.source,
                        barcode: barcode.to_string(),
                        attempts: i + 1,
                    });
                    return record;
                }
                Ok(_) => {
                    counter!("lookup_provider_misses_total", "provider" => provider.name())
                        .increment(1);
                    self.observer.on_event(&LookupEvent::ProviderMiss {
                        provider: provider.name(),
                        barcode: barcode.to_string(),
                    });
                }
                Err(e) => {
                    counter!(
                        "lookup_provider_errors_total",
                        "provider" => provider.name(),
                        "kind" => e.kind()
                    )
                    .increment(1);
                    self.observer.on_event(&LookupEvent::ProviderFailed {
                        provider: provider.name(),
                        barcode: barcode.to_string(),
                        kind: e.kind(),
                        error: e.to_string(),
                    });
                }
            }
        }

        counter!("lookup_fallback_total").increment(1);
        self.observer.on_event(&LookupEvent::FellBack {
            barcode: barcode.to_string(),
            attempts: self.providers.len(),
        });
        fallback::synthesize(barcode)
    }

    async fn attempt(
        &self,
        provider: &dyn ProductProvider,
        barcode: &NormalizedBarcode,
    ) -> Result<ProductRecord, ProviderError> {
        let t0 = Instant::now();
        let out = match tokio::time::timeout(self.timeout, provider.lookup(barcode)).await {
            Ok(res) => res,
            Err(_) => Err(ProviderError::Timeout {
                provider: provider.name(),
                after: self.timeout,
            }),
        };
        histogram!("lookup_provider_ms", "provider" => provider.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        out
    }

    /// Free-text search. Failures and an unconfigured search backend yield an empty list.
    pub async fn search_products(&self, query: &str, limit: usize) -> Vec<ProductSummary> {
        let query = query.trim();
        let Some(search) = &self.search else {
            return Vec::new();
        };
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        match tokio::time::timeout(self.timeout, search.search(query, limit)).await {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                tracing::warn!(target: "lookup", error = %e, "product search failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(target: "lookup", timeout = ?self.timeout, "product search timed out");
                Vec::new()
            }
        }
    }

    /// Availability per database; unknown providers (test doubles) are ignored.
    pub fn api_status(&self) -> ApiStatus {
        let configured = |source: ProductSource| {
            self.providers
                .iter()
                .any(|p| p.source() == source && p.is_configured())
        };
        ApiStatus {
            barcode_lookup: configured(ProductSource::BarcodeLookup),
            open_food_facts: configured(ProductSource::OpenFoodFacts),
            ean_search: configured(ProductSource::EanSearch),
            barcode_spider: configured(ProductSource::BarcodeSpider),
            upc_database: configured(ProductSource::UpcDatabase),
        }
    }
}
