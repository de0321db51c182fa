// src/lookup/types.rs
use std::time::Duration;

use crate::barcode::NormalizedBarcode;
use crate::product::{ProductRecord, ProductSource};

/// Why a single provider could not answer. Never leaves the resolver.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} credential not configured")]
    MissingCredential { provider: &'static str },

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned malformed JSON: {source}")]
    Malformed {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} timed out after {after:?}")]
    Timeout {
        provider: &'static str,
        after: Duration,
    },
}

impl ProviderError {
    /// Short label for metrics and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "missing_credential",
            Self::Http { .. } => "http",
            Self::Malformed { .. } => "malformed",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// One external barcode database.
///
/// `Ok` with `found == false` means the database answered but has no entry;
/// `Err` means it could not be asked or its answer could not be read.
#[async_trait::async_trait]
pub trait ProductProvider: Send + Sync {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError>;
    fn name(&self) -> &'static str;
    fn source(&self) -> ProductSource;
    /// False when a required credential is missing.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Diagnostics emitted while a lookup walks the provider chain.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupEvent {
    Rejected {
        normalized: String,
    },
    ProviderFailed {
        provider: &'static str,
        barcode: String,
        kind: &'static str,
        error: String,
    },
    ProviderMiss {
        provider: &'static str,
        barcode: String,
    },
    Resolved {
        source: ProductSource,
        barcode: String,
        attempts: usize,
    },
    FellBack {
        barcode: String,
        attempts: usize,
    },
}

/// Receives lookup diagnostics. Must not block.
pub trait LookupObserver: Send + Sync {
    fn on_event(&self, event: &LookupEvent);
}

/// Default observer: structured `tracing` logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LookupObserver for TracingObserver {
    fn on_event(&self, event: &LookupEvent) {
        match event {
            LookupEvent::Rejected { normalized } => {
                tracing::debug!(target: "lookup", %normalized, "rejected non-product code");
            }
            LookupEvent::ProviderFailed {
                provider,
                barcode,
                kind,
                error,
            } => {
                tracing::warn!(target: "lookup", provider, %barcode, kind, %error, "provider error");
            }
            LookupEvent::ProviderMiss { provider, barcode } => {
                tracing::debug!(target: "lookup", provider, %barcode, "provider has no entry");
            }
            LookupEvent::Resolved {
                source,
                barcode,
                attempts,
            } => {
                tracing::info!(target: "lookup", source = source.as_str(), %barcode, attempts, "product resolved");
            }
            LookupEvent::FellBack { barcode, attempts } => {
                tracing::info!(target: "lookup", %barcode, attempts, "no provider had the product; using fallback");
            }
        }
    }
}
