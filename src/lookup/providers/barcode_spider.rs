// src/lookup/providers/barcode_spider.rs
//! BarcodeSpider: token required. Found only when `item_response.code` is 200.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    decimal, decode, first_price, first_text, get_json, info_text, lenient_text, require_credential,
    text_or,
};
use crate::barcode::NormalizedBarcode;
use crate::lookup::types::{ProductProvider, ProviderError};
use crate::product::{ProductRecord, ProductSource, UNKNOWN_BRAND, UNKNOWN_CATEGORY, UNKNOWN_PRODUCT};

const NAME: &str = "BarcodeSpider";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resp {
    item_response: Option<ItemResponse>,
    item_attributes: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemResponse {
    code: Value,
    item_attributes: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Attributes {
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    brand: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    image: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    description: Option<String>,
    lowest_recorded_price: Value,
    #[serde(deserialize_with = "lenient_text")]
    size: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    weight: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    color: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    model: Option<String>,
}

pub struct BarcodeSpiderProvider {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BarcodeSpiderProvider {
    pub fn new(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            token,
        }
    }

    fn map_item(barcode: &NormalizedBarcode, raw: Value, a: Attributes) -> ProductRecord {
        let mut rec = ProductRecord::found(ProductSource::BarcodeSpider, barcode);
        rec.name = text_or(&a.title, UNKNOWN_PRODUCT);
        rec.brand = text_or(&a.brand, UNKNOWN_BRAND);
        rec.category = text_or(&a.category, UNKNOWN_CATEGORY);
        rec.image = first_text(&[&a.image]);
        rec.description = a.description.clone().unwrap_or_default();
        rec.price = first_price(&[&a.lowest_recorded_price]);

        let mut info = Map::new();
        info.insert("size".into(), info_text(&a.size));
        info.insert("weight".into(), info_text(&a.weight));
        info.insert("color".into(), info_text(&a.color));
        info.insert("model".into(), info_text(&a.model));
        rec.additional_info = info;

        rec.raw_data = Some(raw);
        rec
    }
}

#[async_trait]
impl ProductProvider for BarcodeSpiderProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        let token = require_credential(NAME, &self.token)?;
        let req = self
            .client
            .get(&self.base_url)
            .query(&[("token", token), ("upc", barcode.as_str())]);
        let body = get_json(NAME, req).await?;
        let resp: Resp = decode(NAME, &body)?;

        let Some(item) = resp.item_response else {
            return Ok(ProductRecord::not_found(ProductSource::BarcodeSpider, barcode));
        };
        if decimal(&item.code) != Some(200.0) {
            return Ok(ProductRecord::not_found(ProductSource::BarcodeSpider, barcode));
        }
        // Attributes sit inside `item_response` in older payloads, beside it in newer ones.
        let raw = item
            .item_attributes
            .or(resp.item_attributes)
            .unwrap_or_else(|| Value::Object(Map::new()));
        let attrs: Attributes = decode(NAME, &raw)?;
        Ok(Self::map_item(barcode, raw, attrs))
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn source(&self) -> ProductSource {
        ProductSource::BarcodeSpider
    }

    fn is_configured(&self) -> bool {
        require_credential(NAME, &self.token).is_ok()
    }
}
