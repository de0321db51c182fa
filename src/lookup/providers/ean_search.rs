// src/lookup/providers/ean_search.rs
//! EAN-Search.org: free tier, rate limited. Answers with a JSON array.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{decode, get_json, info_text, lenient_text, text, text_or};
use crate::barcode::NormalizedBarcode;
use crate::lookup::types::{ProductProvider, ProviderError};
use crate::product::{ProductRecord, ProductSource, UNKNOWN_BRAND, UNKNOWN_CATEGORY};

const NAME: &str = "EAN-Search";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    #[serde(deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    vendor: Option<String>,
    #[serde(rename = "categoryName", alias = "category", deserialize_with = "lenient_text")]
    category: Option<String>,
    #[serde(rename = "issuingCountry", alias = "issuing_country", deserialize_with = "lenient_text")]
    issuing_country: Option<String>,
}

pub struct EanSearchProvider {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl EanSearchProvider {
    pub fn new(client: reqwest::Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }

    fn map_item(barcode: &NormalizedBarcode, raw: Value, item: Item, name: String) -> ProductRecord {
        let mut rec = ProductRecord::found(ProductSource::EanSearch, barcode);
        rec.description = name.clone();
        rec.name = name;
        rec.brand = text_or(&item.vendor, UNKNOWN_BRAND);
        rec.category = text_or(&item.category, UNKNOWN_CATEGORY);

        let mut info = Map::new();
        info.insert("issuing_country".into(), info_text(&item.issuing_country));
        rec.additional_info = info;

        rec.url = Some(format!("https://www.ean-search.org/?q={barcode}"));
        rec.raw_data = Some(raw);
        rec
    }
}

#[async_trait]
impl ProductProvider for EanSearchProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        let req = self.client.get(&self.base_url).query(&[
            ("token", self.token.as_str()),
            ("op", "barcode-lookup"),
            ("format", "json"),
            ("ean", barcode.as_str()),
        ]);
        let body = get_json(NAME, req).await?;

        // Errors come back as an object (`{"error": ...}`); treat like an empty list.
        let first = match body {
            Value::Array(items) => items.into_iter().next(),
            _ => None,
        };
        if let Some(raw) = first {
            let item: Item = decode(NAME, &raw)?;
            if let Some(name) = text(&item.name).map(str::to_string) {
                return Ok(Self::map_item(barcode, raw, item, name));
            }
        }
        Ok(ProductRecord::not_found(ProductSource::EanSearch, barcode))
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn source(&self) -> ProductSource {
        ProductSource::EanSearch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code(raw: &str) -> NormalizedBarcode {
        NormalizedBarcode::parse(raw).unwrap()
    }

    #[test]
    fn maps_first_item() {
        let raw = json!({
            "ean": "4006381333931",
            "name": "Stabilo Point 88",
            "categoryName": "Office Supplies",
            "issuingCountry": "DE"
        });
        let item: Item = decode(NAME, &raw).unwrap();
        let rec = EanSearchProvider::map_item(&code("4006381333931"), raw, item, "Stabilo Point 88".into());
        assert_eq!(rec.name, "Stabilo Point 88");
        assert_eq!(rec.description, "Stabilo Point 88");
        assert_eq!(rec.brand, UNKNOWN_BRAND);
        assert_eq!(rec.category, "Office Supplies");
        assert_eq!(rec.image, None);
        assert_eq!(rec.additional_info["issuing_country"], "DE");
        assert_eq!(rec.url.as_deref(), Some("https://www.ean-search.org/?q=4006381333931"));
    }
}
