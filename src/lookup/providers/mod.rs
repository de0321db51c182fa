// src/lookup/providers/mod.rs
//! Provider adapters plus the field helpers they share.
//!
//! Databases omit, null out, or blank fields freely. The helpers below treat
//! all three the same way, so `first_text(&[a, b])` picks the first candidate
//! that actually carries text.

pub mod barcode_lookup;
pub mod barcode_spider;
pub mod ean_search;
pub mod open_food_facts;
pub mod upc_database;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{LookupConfig, ProviderKind};
use crate::lookup::types::{ProductProvider, ProviderError};

pub use barcode_lookup::BarcodeLookupProvider;
pub use barcode_spider::BarcodeSpiderProvider;
pub use ean_search::EanSearchProvider;
pub use open_food_facts::OpenFoodFactsProvider;
pub use upc_database::UpcDatabaseProvider;

/// Shared HTTP client: one connection pool for every provider.
pub fn build_http_client(cfg: &LookupConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(cfg.timeout())
        .build()
        .context("building provider http client")
}

/// Providers in the configured priority order.
pub fn build_providers(cfg: &LookupConfig, client: &reqwest::Client) -> Vec<Arc<dyn ProductProvider>> {
    let creds = &cfg.credentials;
    let ep = &cfg.endpoints;
    cfg.provider_order
        .iter()
        .map(|kind| -> Arc<dyn ProductProvider> {
            match kind {
                ProviderKind::BarcodeLookup => Arc::new(BarcodeLookupProvider::new(
                    client.clone(),
                    &ep.barcode_lookup,
                    creds.barcode_lookup_key.clone(),
                )),
                ProviderKind::OpenFoodFacts => {
                    Arc::new(OpenFoodFactsProvider::new(client.clone(), &ep.open_food_facts))
                }
                ProviderKind::EanSearch => Arc::new(EanSearchProvider::new(
                    client.clone(),
                    &ep.ean_search,
                    &creds.ean_search_token,
                )),
                ProviderKind::BarcodeSpider => Arc::new(BarcodeSpiderProvider::new(
                    client.clone(),
                    &ep.barcode_spider,
                    creds.barcode_spider_token.clone(),
                )),
                ProviderKind::UpcDatabase => Arc::new(UpcDatabaseProvider::new(
                    client.clone(),
                    &ep.upc_database,
                    creds.upc_database_key.clone(),
                )),
            }
        })
        .collect()
}

/// Send the request and read the body as JSON regardless of HTTP status;
/// several databases answer "not found" with a 404 and a JSON body.
pub(crate) async fn get_json(
    provider: &'static str,
    req: reqwest::RequestBuilder,
) -> Result<Value, ProviderError> {
    let resp = req
        .send()
        .await
        .map_err(|source| ProviderError::Http { provider, source })?;
    let body = resp
        .bytes()
        .await
        .map_err(|source| ProviderError::Http { provider, source })?;
    serde_json::from_slice(&body).map_err(|source| ProviderError::Malformed { provider, source })
}

pub(crate) fn decode<T: DeserializeOwned>(
    provider: &'static str,
    value: &Value,
) -> Result<T, ProviderError> {
    T::deserialize(value).map_err(|source| ProviderError::Malformed { provider, source })
}

/// A credential that is present and non-blank.
pub(crate) fn require_credential<'a>(
    provider: &'static str,
    cred: &'a Option<String>,
) -> Result<&'a str, ProviderError> {
    match cred.as_deref() {
        Some(c) if !c.trim().is_empty() => Ok(c),
        _ => Err(ProviderError::MissingCredential { provider }),
    }
}

/// Strings as-is, numbers in their JSON spelling; anything else is missing.
pub(crate) fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `deserialize_with` for optional display fields: a stray number or object
/// must not reject the whole product.
pub(crate) fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(&Value::deserialize(de)?))
}

pub(crate) fn text(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub(crate) fn first_text(candidates: &[&Option<String>]) -> Option<String> {
    candidates.iter().find_map(|c| text(c)).map(str::to_string)
}

pub(crate) fn text_or(v: &Option<String>, default: &str) -> String {
    text(v).unwrap_or(default).to_string()
}

/// A number or a numeric string (`"19.99"`); anything else is unknown.
pub(crate) fn decimal(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Price from the first candidate that is present: a non-empty string
/// (`"0.00"` included) or a non-zero number. Blank and `0` fall through.
pub(crate) fn first_price(candidates: &[&Value]) -> Option<f64> {
    let present = candidates.iter().find(|v| match v {
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|p| p != 0.0),
        _ => false,
    })?;
    decimal(present)
}

/// Blank-string default for `additional_info` entries.
pub(crate) fn info_text(v: &Option<String>) -> Value {
    Value::String(v.clone().unwrap_or_default())
}

/// Arrays pass through; anything else becomes `[]`.
pub(crate) fn info_list(v: &Value) -> Value {
    match v {
        Value::Array(_) => v.clone(),
        _ => Value::Array(Vec::new()),
    }
}
