// src/lookup/providers/barcode_lookup.rs
//! Barcode Lookup: comprehensive commercial database, API key required.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    decode, first_price, first_text, get_json, info_list, info_text, lenient_text,
    require_credential, text_or,
};
use crate::barcode::NormalizedBarcode;
use crate::lookup::types::{ProductProvider, ProviderError};
use crate::product::{ProductRecord, ProductSource, UNKNOWN_BRAND, UNKNOWN_CATEGORY, UNKNOWN_PRODUCT};

const NAME: &str = "Barcode Lookup";

#[derive(Debug, Default, Deserialize)]
struct Resp {
    #[serde(default)]
    products: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    #[serde(deserialize_with = "lenient_text")]
    barcode_number: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    product_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    brand: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    manufacturer: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    category: Option<String>,
    images: Value,
    #[serde(deserialize_with = "lenient_text")]
    image: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    description: Option<String>,
    msrp: Value,
    price: Value,
    #[serde(deserialize_with = "lenient_text")]
    currency: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    model: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    size: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    color: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    weight: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    dimension: Option<String>,
    features: Value,
    reviews: Value,
    stores: Value,
}

pub struct BarcodeLookupProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BarcodeLookupProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    fn map_product(barcode: &NormalizedBarcode, raw: Value, p: Product) -> ProductRecord {
        let mut rec = ProductRecord::found(ProductSource::BarcodeLookup, barcode);
        rec.name = first_text(&[&p.title, &p.product_name]).unwrap_or_else(|| UNKNOWN_PRODUCT.into());
        rec.brand = first_text(&[&p.brand, &p.manufacturer]).unwrap_or_else(|| UNKNOWN_BRAND.into());
        rec.category = text_or(&p.category, UNKNOWN_CATEGORY);
        rec.image = p
            .images
            .as_array()
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
            .map(str::to_string)
            .or_else(|| first_text(&[&p.image]));
        rec.description = first_text(&[&p.description, &p.title]).unwrap_or_default();
        rec.price = first_price(&[&p.msrp, &p.price]);
        rec.currency = Some(text_or(&p.currency, "USD"));

        let mut info = Map::new();
        info.insert(
            "upc".into(),
            p.barcode_number.clone().map(Value::String).unwrap_or(Value::Null),
        );
        info.insert("manufacturer".into(), info_text(&p.manufacturer));
        info.insert("model".into(), info_text(&p.model));
        info.insert("size".into(), info_text(&p.size));
        info.insert("color".into(), info_text(&p.color));
        info.insert("weight".into(), info_text(&p.weight));
        info.insert("dimensions".into(), info_text(&p.dimension));
        info.insert("features".into(), info_list(&p.features));
        info.insert("reviews".into(), info_list(&p.reviews));
        info.insert("stores".into(), info_list(&p.stores));
        rec.additional_info = info;

        rec.url = Some(format!("https://www.barcodelookup.com/{barcode}"));
        rec.raw_data = Some(raw);
        rec
    }
}

#[async_trait]
impl ProductProvider for BarcodeLookupProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        let key = require_credential(NAME, &self.api_key)?;
        let req = self.client.get(&self.base_url).query(&[
            ("barcode", barcode.as_str()),
            ("formatted", "y"),
            ("key", key),
        ]);
        let body = get_json(NAME, req).await?;
        let resp: Resp = decode(NAME, &body)?;

        match resp.products.into_iter().next() {
            Some(raw) => {
                let product: Product = decode(NAME, &raw)?;
                Ok(Self::map_product(barcode, raw, product))
            }
            None => Ok(ProductRecord::not_found(ProductSource::BarcodeLookup, barcode)),
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn source(&self) -> ProductSource {
        ProductSource::BarcodeLookup
    }

    fn is_configured(&self) -> bool {
        require_credential(NAME, &self.api_key).is_ok()
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
    fn maps_fields_with_fallbacks() {
        let raw = json!({
            "barcode_number": "012345678905",
            "product_name": "Cordless Drill",
            "manufacturer": "Acme Corp",
            "images": [],
            "image": "https://img.example/drill.jpg",
            "msrp": "",
            "price": "49.90",
            "features": ["18V", "2 batteries"],
            "stores": "n/a"
        });
        let p: Product = decode(NAME, &raw).unwrap();
        let rec = BarcodeLookupProvider::map_product(&code("012345678905"), raw.clone(), p);

        assert!(rec.found);
        assert_eq!(rec.name, "Cordless Drill");
        assert_eq!(rec.brand, "Acme Corp");
        assert_eq!(rec.category, UNKNOWN_CATEGORY);
        assert_eq!(rec.image.as_deref(), Some("https://img.example/drill.jpg"));
        assert_eq!(rec.description, "");
        assert_eq!(rec.price, Some(49.9));
        assert_eq!(rec.currency.as_deref(), Some("USD"));
        assert_eq!(rec.additional_info["upc"], "012345678905");
        assert_eq!(rec.additional_info["manufacturer"], "Acme Corp");
        assert_eq!(rec.additional_info["model"], "");
        assert_eq!(rec.additional_info["features"], json!(["18V", "2 batteries"]));
        assert_eq!(rec.additional_info["stores"], json!([]));
        assert_eq!(rec.url.as_deref(), Some("https://www.barcodelookup.com/012345678905"));
        assert_eq!(rec.raw_data, Some(raw));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        // Unroutable base URL: reaching the network would surface as Http, not MissingCredential.
        let p = BarcodeLookupProvider::new(reqwest::Client::new(), "http://127.0.0.1:9/v3/products", None);
        let code = NormalizedBarcode::parse("012345678905").unwrap();
        let err = p.lookup(&code).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential { .. }));
        assert!(!p.is_configured());
    }
}
