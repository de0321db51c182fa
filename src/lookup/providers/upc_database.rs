// src/lookup/providers/upc_database.rs
//! UPCDatabase: API key in the path. Flat payload gated by a `valid` flag.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{decode, get_json, info_text, lenient_text, require_credential, text_or};
use crate::barcode::NormalizedBarcode;
use crate::lookup::types::{ProductProvider, ProviderError};
use crate::product::{ProductRecord, ProductSource, UNKNOWN_BRAND, UNKNOWN_CATEGORY, UNKNOWN_PRODUCT};

const NAME: &str = "UPCDatabase";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resp {
    valid: Value,
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    brand: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    size: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    weight: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    color: Option<String>,
}

/// The API reports validity as the string `"true"`; a real boolean is accepted too.
fn is_valid_flag(v: &Value) -> bool {
    matches!(v, Value::Bool(true)) || v.as_str() == Some("true")
}

pub struct UpcDatabaseProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpcDatabaseProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn map_resp(barcode: &NormalizedBarcode, raw: Value, r: Resp) -> ProductRecord {
        let mut rec = ProductRecord::found(ProductSource::UpcDatabase, barcode);
        rec.name = text_or(&r.title, UNKNOWN_PRODUCT);
        rec.brand = text_or(&r.brand, UNKNOWN_BRAND);
        rec.category = text_or(&r.category, UNKNOWN_CATEGORY);
        rec.description = r.description.clone().unwrap_or_default();

        let mut info = Map::new();
        info.insert("size".into(), info_text(&r.size));
        info.insert("weight".into(), info_text(&r.weight));
        info.insert("color".into(), info_text(&r.color));
        rec.additional_info = info;

        rec.raw_data = Some(raw);
        rec
    }
}

#[async_trait]
impl ProductProvider for UpcDatabaseProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        let key = require_credential(NAME, &self.api_key)?;
        let url = format!("{}/{}/{}", self.base_url, barcode, key);
        let body = get_json(NAME, self.client.get(url)).await?;
        let resp: Resp = decode(NAME, &body)?;

        if is_valid_flag(&resp.valid) {
            Ok(Self::map_resp(barcode, body, resp))
        } else {
            Ok(ProductRecord::not_found(ProductSource::UpcDatabase, barcode))
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn source(&self) -> ProductSource {
        ProductSource::UpcDatabase
    }

    fn is_configured(&self) -> bool {
        require_credential(NAME, &self.api_key).is_ok()
    }
}
