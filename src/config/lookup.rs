// src/config/lookup.rs
//! Lookup configuration: provider order, credentials, endpoints and timeouts.
//!
//! Sources, first hit wins:
//! 1) `$LOOKUP_CONFIG_PATH` (TOML or JSON)
//! 2) `config/lookup.toml`
//! 3) `config/lookup.json`
//! 4) environment variables only ([`LookupConfig::from_env`])
//!
//! A credential written as `"ENV"` is read from its environment variable.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub const ENV_CONFIG_PATH: &str = "LOOKUP_CONFIG_PATH";
pub const ENV_TIMEOUT_SECS: &str = "LOOKUP_TIMEOUT_SECS";
pub const ENV_BARCODE_LOOKUP_KEY: &str = "BARCODE_LOOKUP_API_KEY";
pub const ENV_EAN_SEARCH_TOKEN: &str = "EAN_SEARCH_TOKEN";
pub const ENV_BARCODE_SPIDER_TOKEN: &str = "BARCODE_SPIDER_TOKEN";
pub const ENV_UPC_DATABASE_KEY: &str = "UPC_DATABASE_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 8;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 4;

/// The five supported databases, as named in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    BarcodeLookup,
    OpenFoodFacts,
    EanSearch,
    BarcodeSpider,
    UpcDatabase,
}

impl ProviderKind {
    /// Commercial comprehensive database first, free food database second.
    pub const DEFAULT_ORDER: [ProviderKind; 5] = [
        ProviderKind::BarcodeLookup,
        ProviderKind::OpenFoodFacts,
        ProviderKind::EanSearch,
        ProviderKind::BarcodeSpider,
        ProviderKind::UpcDatabase,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub barcode_lookup_key: Option<String>,
    /// EAN-Search accepts the shared free token `"0"`.
    pub ean_search_token: String,
    pub barcode_spider_token: Option<String>,
    pub upc_database_key: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            barcode_lookup_key: None,
            ean_search_token: "0".to_string(),
            barcode_spider_token: None,
            upc_database_key: None,
        }
    }
}

/// Base URLs. Overridden in tests to point at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub barcode_lookup: String,
    pub open_food_facts: String,
    pub ean_search: String,
    pub barcode_spider: String,
    pub upc_database: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            barcode_lookup: "https://api.barcodelookup.com/v3/products".to_string(),
            open_food_facts: "https://world.openfoodfacts.org".to_string(),
            ean_search: "https://api.ean-search.org/api".to_string(),
            barcode_spider: "https://api.barcodespider.com/v1/lookup".to_string(),
            upc_database: "https://api.upcdatabase.org/product".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint rooted at `base` (a mock server URI), keeping each path.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            barcode_lookup: format!("{base}/v3/products"),
            open_food_facts: base.to_string(),
            ean_search: format!("{base}/api"),
            barcode_spider: format!("{base}/v1/lookup"),
            upc_database: format!("{base}/product"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Upper bound for one provider attempt.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub provider_order: Vec<ProviderKind>,
    pub credentials: Credentials,
    pub endpoints: Endpoints,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: concat!("product-lookup/", env!("CARGO_PKG_VERSION")).to_string(),
            provider_order: ProviderKind::DEFAULT_ORDER.to_vec(),
            credentials: Credentials::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl LookupConfig {
    /// Defaults plus whatever credentials the environment provides.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.credentials.barcode_lookup_key = env_nonempty(ENV_BARCODE_LOOKUP_KEY);
        cfg.credentials.barcode_spider_token = env_nonempty(ENV_BARCODE_SPIDER_TOKEN);
        cfg.credentials.upc_database_key = env_nonempty(ENV_UPC_DATABASE_KEY);
        if let Some(t) = env_nonempty(ENV_EAN_SEARCH_TOKEN) {
            cfg.credentials.ean_search_token = t;
        }
        if let Some(secs) = env_nonempty(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            cfg.timeout_secs = secs;
        }
        cfg.sanitized()
    }

    /// Load from an explicit path. TOML or JSON, picked by extension then by content.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lookup config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing lookup config {}", path.display()))?;
        Ok(cfg.resolve_env_credentials().sanitized())
    }

    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        for candidate in ["config/lookup.toml", "config/lookup.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::from_env())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    fn resolve_env_credentials(mut self) -> Self {
        let c = &mut self.credentials;
        c.barcode_lookup_key = resolve_credential(c.barcode_lookup_key.take(), ENV_BARCODE_LOOKUP_KEY);
        c.barcode_spider_token =
            resolve_credential(c.barcode_spider_token.take(), ENV_BARCODE_SPIDER_TOKEN);
        c.upc_database_key = resolve_credential(c.upc_database_key.take(), ENV_UPC_DATABASE_KEY);
        if c.ean_search_token.trim().eq_ignore_ascii_case("env") {
            c.ean_search_token = env_nonempty(ENV_EAN_SEARCH_TOKEN).unwrap_or_else(|| "0".into());
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = DEFAULT_CONNECT_TIMEOUT_SECS;
        }
        // Keep first occurrence of each provider.
        let mut seen = Vec::with_capacity(self.provider_order.len());
        self.provider_order.retain(|k| {
            if seen.contains(k) {
                false
            } else {
                seen.push(*k);
                true
            }
        });
        if self.provider_order.is_empty() {
            self.provider_order = ProviderKind::DEFAULT_ORDER.to_vec();
        }
        for key in [
            &mut self.credentials.barcode_lookup_key,
            &mut self.credentials.barcode_spider_token,
            &mut self.credentials.upc_database_key,
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                *key = None;
            }
        }
        self
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn resolve_credential(value: Option<String>, env_name: &str) -> Option<String> {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("env") => {
            let resolved = env_nonempty(env_name);
            if resolved.is_none() {
                tracing::warn!(env = env_name, "credential set to ENV but variable is missing");
            }
            resolved
        }
        other => other,
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<LookupConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|_| anyhow!("unsupported lookup config format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_and_defaults() {
        let s = r#"
timeout_secs = 5
provider_order = ["open_food_facts", "ean_search", "open_food_facts"]

[credentials]
barcode_lookup_key = "abc"
upc_database_key = ""
"#;
        let cfg = parse_config(s, "toml").unwrap().sanitized();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(
            cfg.provider_order,
            vec![ProviderKind::OpenFoodFacts, ProviderKind::EanSearch]
        );
        assert_eq!(cfg.credentials.barcode_lookup_key.as_deref(), Some("abc"));
        assert_eq!(cfg.credentials.upc_database_key, None);
        assert_eq!(cfg.credentials.ean_search_token, "0");
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn json_without_hint_and_empty_order_falls_back() {
        let s = r#"{ "provider_order": [], "timeout_secs": 0 }"#;
        let cfg = parse_config(s, "").unwrap().sanitized();
        assert_eq!(cfg.provider_order, ProviderKind::DEFAULT_ORDER.to_vec());
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_config("not = [valid", "").is_err());
    }

    #[test]
    fn rooted_endpoints_keep_paths() {
        let e = Endpoints::rooted_at("http://127.0.0.1:9999/");
        assert_eq!(e.barcode_lookup, "http://127.0.0.1:9999/v3/products");
        assert_eq!(e.open_food_facts, "http://127.0.0.1:9999");
        assert_eq!(e.upc_database, "http://127.0.0.1:9999/product");
    }
}
