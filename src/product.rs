// src/product.rs
//! Unified product schema returned by every lookup, whichever database answered.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::barcode::NormalizedBarcode;

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Which database produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductSource {
    #[serde(rename = "Barcode Lookup")]
    BarcodeLookup,
    #[serde(rename = "OpenFoodFacts")]
    OpenFoodFacts,
    #[serde(rename = "EAN-Search")]
    EanSearch,
    #[serde(rename = "BarcodeSpider")]
    BarcodeSpider,
    #[serde(rename = "UPCDatabase")]
    UpcDatabase,
    #[serde(rename = "Fallback")]
    Fallback,
}

impl ProductSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BarcodeLookup => "Barcode Lookup",
            Self::OpenFoodFacts => "OpenFoodFacts",
            Self::EanSearch => "EAN-Search",
            Self::BarcodeSpider => "BarcodeSpider",
            Self::UpcDatabase => "UPCDatabase",
            Self::Fallback => "Fallback",
        }
    }
}

impl fmt::Display for ProductSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutri-Score letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutritionGrade {
    /// Case-insensitive; `"unknown"`, `"not-applicable"` and friends yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            "e" => Some(Self::E),
            _ => None,
        }
    }
}

/// Per-100g amounts. `None` means the database did not report the nutrient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
}

impl NutritionFacts {
    /// Known nutrients as `(name, amount)` pairs, in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("energy", self.energy),
            ("fat", self.fat),
            ("saturatedFat", self.saturated_fat),
            ("carbohydrates", self.carbohydrates),
            ("sugars", self.sugars),
            ("protein", self.protein),
            ("fiber", self.fiber),
            ("salt", self.salt),
            ("sodium", self.sodium),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// The record handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub found: bool,
    pub source: ProductSource,
    pub barcode: NormalizedBarcode,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub image: Option<String>,
    pub description: String,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition: Option<NutritionFacts>,
    pub nutrition_grade: Option<NutritionGrade>,
    pub nova_group: Option<u8>,
    #[serde(default)]
    pub additional_info: Map<String, Value>,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unknown: Option<bool>,
    pub raw_data: Option<Value>,
}

impl ProductRecord {
    /// A found record with the display placeholders filled in; adapters
    /// overwrite what their database supplies.
    pub fn found(source: ProductSource, barcode: &NormalizedBarcode) -> Self {
        Self {
            found: true,
            source,
            barcode: barcode.clone(),
            name: UNKNOWN_PRODUCT.to_string(),
            brand: UNKNOWN_BRAND.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            image: None,
            description: String::new(),
            price: None,
            currency: None,
            ingredients: None,
            nutrition: None,
            nutrition_grade: None,
            nova_group: None,
            additional_info: Map::new(),
            url: None,
            is_unknown: None,
            raw_data: None,
        }
    }

    /// "This database has nothing for the code."
    pub fn not_found(source: ProductSource, barcode: &NormalizedBarcode) -> Self {
        Self {
            found: false,
            ..Self::found(source, barcode)
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.is_unknown.unwrap_or(false)
    }

    /// Plain-text summary for the platform share sheet.
    pub fn share_message(&self) -> String {
        let mut out = format!(
            "{} by {}\nBarcode: {}\nCategory: {}",
            self.name, self.brand, self.barcode, self.category
        );
        if let Some(price) = self.price {
            out.push_str(&format!("\nPrice: {price}"));
            if let Some(cur) = &self.currency {
                out.push(' ');
                out.push_str(cur);
            }
        }
        out
    }
}

/// One hit from a free-text product search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    pub brand: String,
    pub barcode: String,
    pub image: Option<String>,
    pub category: String,
    pub nutrition_grade: Option<NutritionGrade>,
}

/// External search page for a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchLink {
    pub name: &'static str,
    pub url: String,
}

/// Web searches offered next to a scanned product code.
pub fn product_search_links(barcode: &str) -> Vec<SearchLink> {
    vec![
        SearchLink {
            name: "Google Shopping",
            url: format!("https://www.google.com/search?tbm=shop&q={barcode}"),
        },
        SearchLink {
            name: "Barcode Lookup",
            url: format!("https://www.barcodelookup.com/{barcode}"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> NormalizedBarcode {
        NormalizedBarcode::parse(raw).unwrap()
    }

    #[test]
    fn grade_parse_is_lenient() {
        assert_eq!(NutritionGrade::parse("a"), Some(NutritionGrade::A));
        assert_eq!(NutritionGrade::parse(" E "), Some(NutritionGrade::E));
        assert_eq!(NutritionGrade::parse("unknown"), None);
        assert_eq!(NutritionGrade::parse(""), None);
    }

    #[test]
    fn nutrition_entries_skip_unknown() {
        let n = NutritionFacts {
            energy: Some(380.0),
            fat: Some(0.0),
            ..Default::default()
        };
        assert_eq!(n.entries(), vec![("energy", 380.0), ("fat", 0.0)]);
        assert!(NutritionFacts::default().is_empty());
    }

    #[test]
    fn serializes_camel_case_with_display_source() {
        let mut rec = ProductRecord::found(ProductSource::EanSearch, &code("12345678"));
        rec.nutrition_grade = Some(NutritionGrade::B);
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["source"], "EAN-Search");
        assert_eq!(v["nutritionGrade"], "B");
        assert!(v.get("additionalInfo").is_some());
        assert!(v.get("isUnknown").is_none());
        assert_eq!(v["name"], UNKNOWN_PRODUCT);
        assert_eq!(v["barcode"], "12345678");
    }

    #[test]
    fn record_json_reads_back_only_with_product_code() {
        let rec = ProductRecord::found(ProductSource::OpenFoodFacts, &code("4006381333931"));
        let mut v = serde_json::to_value(&rec).unwrap();
        let back: ProductRecord = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(back.barcode, "4006381333931");

        v["barcode"] = Value::String("hello".into());
        let err = serde_json::from_value::<ProductRecord>(v).unwrap_err();
        assert!(err.to_string().contains("not a recognized product code"));
    }

    #[test]
    fn share_message_includes_price_only_when_known() {
        let mut rec = ProductRecord::found(ProductSource::BarcodeLookup, &code("012345678905"));
        rec.name = "Widget".into();
        rec.brand = "Acme".into();
        rec.category = "Tools".into();
        assert_eq!(
            rec.share_message(),
            "Widget by Acme\nBarcode: 012345678905\nCategory: Tools"
        );
        rec.price = Some(19.99);
        rec.currency = Some("USD".into());
        assert!(rec.share_message().ends_with("\nPrice: 19.99 USD"));
    }

    #[test]
    fn search_links_embed_code() {
        let links = product_search_links("4006381333931");
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].url, "https://www.barcodelookup.com/4006381333931");
    }
}
