// src/lookup/providers/open_food_facts.rs
//! OpenFoodFacts: free, food-focused, no credential. Also backs free-text search.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{decimal, decode, first_text, get_json, info_text, lenient_text, text, text_or};
use crate::barcode::NormalizedBarcode;
use crate::lookup::types::{ProductProvider, ProviderError};
use crate::product::{
    NutritionFacts, NutritionGrade, ProductRecord, ProductSource, ProductSummary, UNKNOWN_BRAND,
    UNKNOWN_CATEGORY, UNKNOWN_PRODUCT,
};

const NAME: &str = "OpenFoodFacts";
const FOOD_CATEGORY: &str = "Food & Beverages";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Resp {
    status: Value,
    product: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Product {
    #[serde(deserialize_with = "lenient_text")]
    code: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    product_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    product_name_en: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    generic_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    brands: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    categories: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    image_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    image_front_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    ingredients_text: Option<String>,
    nutriments: Value,
    #[serde(deserialize_with = "lenient_text")]
    nutrition_grade_fr: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    nutriscore_grade: Option<String>,
    nova_group: Value,
    #[serde(deserialize_with = "lenient_text")]
    countries: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    stores: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    packaging: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    labels: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    allergens: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    traces: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    quantity: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    serving_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResp {
    products: Vec<Value>,
}

pub struct OpenFoodFactsProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Free-text product search; at most `limit` summaries.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductSummary>, ProviderError> {
        let page_size = limit.to_string();
        let req = self
            .client
            .get(format!("{}/cgi/search.pl", self.base_url))
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ]);
        let body = get_json(NAME, req).await?;
        let resp: SearchResp = decode(NAME, &body)?;

        // Entries that are not product objects are skipped, not fatal.
        Ok(resp
            .products
            .iter()
            .filter_map(|raw| Product::deserialize(raw).ok())
            .take(limit)
            .map(|p| ProductSummary {
                name: first_text(&[&p.product_name, &p.product_name_en])
                    .unwrap_or_else(|| UNKNOWN_PRODUCT.into()),
                brand: text_or(&p.brands, UNKNOWN_BRAND),
                barcode: p.code.clone().unwrap_or_default(),
                image: first_text(&[&p.image_url, &p.image_front_url]),
                category: text_or(&p.categories, UNKNOWN_CATEGORY),
                nutrition_grade: text(&p.nutrition_grade_fr).and_then(NutritionGrade::parse),
            })
            .collect())
    }

    fn map_product(barcode: &NormalizedBarcode, raw: Value, p: Product) -> ProductRecord {
        let mut rec = ProductRecord::found(ProductSource::OpenFoodFacts, barcode);
        rec.name = first_text(&[&p.product_name, &p.product_name_en])
            .unwrap_or_else(|| UNKNOWN_PRODUCT.into());
        rec.brand = text_or(&p.brands, UNKNOWN_BRAND);
        rec.category = text_or(&p.categories, FOOD_CATEGORY);
        rec.image = first_text(&[&p.image_url, &p.image_front_url]);
        rec.description = first_text(&[&p.generic_name, &p.product_name]).unwrap_or_default();
        rec.ingredients = first_text(&[&p.ingredients_text]);
        rec.nutrition = p.nutriments.as_object().and_then(extract_nutrition);
        rec.nutrition_grade = first_text(&[&p.nutrition_grade_fr, &p.nutriscore_grade])
            .as_deref()
            .and_then(NutritionGrade::parse);
        rec.nova_group = decimal(&p.nova_group)
            .filter(|g| (1.0..=4.0).contains(g) && g.fract() == 0.0)
            .map(|g| g as u8);

        let mut info = Map::new();
        info.insert("countries".into(), info_text(&p.countries));
        info.insert("stores".into(), info_text(&p.stores));
        info.insert("packaging".into(), info_text(&p.packaging));
        info.insert("labels".into(), info_text(&p.labels));
        info.insert("allergens".into(), info_text(&p.allergens));
        info.insert("traces".into(), info_text(&p.traces));
        info.insert("quantity".into(), info_text(&p.quantity));
        info.insert("servingSize".into(), info_text(&p.serving_size));
        rec.additional_info = info;

        rec.url = Some(format!("https://world.openfoodfacts.org/product/{barcode}"));
        rec.raw_data = Some(raw);
        rec
    }
}

/// Per-100g nutrients from the `nutriments` map. `None` when none are present.
pub fn extract_nutrition(nutriments: &Map<String, Value>) -> Option<NutritionFacts> {
    let get = |key: &str| nutriments.get(key).and_then(decimal);

    let energy = get("energy-kcal_100g").or_else(|| get("energy_100g"));
    let facts = NutritionFacts {
        energy,
        energy_unit: energy.map(|_| "kcal".to_string()),
        fat: get("fat_100g"),
        saturated_fat: get("saturated-fat_100g"),
        carbohydrates: get("carbohydrates_100g"),
        sugars: get("sugars_100g"),
        protein: get("proteins_100g"),
        fiber: get("fiber_100g"),
        salt: get("salt_100g"),
        sodium: get("sodium_100g"),
    };
    (!facts.is_empty()).then_some(facts)
}

fn is_found_status(status: &Value) -> bool {
    decimal(status) == Some(1.0)
}

#[async_trait]
impl ProductProvider for OpenFoodFactsProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        let body = get_json(NAME, self.client.get(url)).await?;
        let resp: Resp = decode(NAME, &body)?;

        match resp.product {
            Some(raw) if is_found_status(&resp.status) && raw.is_object() => {
                let product: Product = decode(NAME, &raw)?;
                Ok(Self::map_product(barcode, raw, product))
            }
            _ => Ok(ProductRecord::not_found(ProductSource::OpenFoodFacts, barcode)),
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn source(&self) -> ProductSource {
        ProductSource::OpenFoodFacts
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
    fn nutrition_extracts_known_keys_only() {
        let n = json!({
            "energy-kcal_100g": 380,
            "energy_100g": 1590,
            "fat_100g": "1.5",
            "saturated-fat_100g": 0,
            "sugars_100g": null,
            "proteins_100g": 7.2,
            "vitamin-c_100g": 0.01
        });
        let facts = extract_nutrition(n.as_object().unwrap()).unwrap();
        assert_eq!(facts.energy, Some(380.0));
        assert_eq!(facts.energy_unit.as_deref(), Some("kcal"));
        assert_eq!(facts.fat, Some(1.5));
        assert_eq!(facts.saturated_fat, Some(0.0));
        assert_eq!(facts.sugars, None);
        assert_eq!(facts.protein, Some(7.2));
        assert_eq!(facts.salt, None);
    }

    #[test]
    fn nutrition_energy_falls_back_and_empty_is_none() {
        let n = json!({ "energy_100g": 1590 });
        assert_eq!(
            extract_nutrition(n.as_object().unwrap()).unwrap().energy,
            Some(1590.0)
        );
        let empty = json!({ "nova-group_100g": 4 });
        assert!(extract_nutrition(empty.as_object().unwrap()).is_none());
    }

    #[test]
    fn maps_food_product() {
        let raw = json!({
            "product_name": "",
            "product_name_en": "Oat Flakes",
            "categories": "",
            "image_front_url": "https://img.example/oats.jpg",
            "ingredients_text": "oats",
            "nutriscore_grade": "a",
            "nova_group": 1,
            "quantity": "500 g",
            "serving_size": "40 g"
        });
        let p: Product = decode(NAME, &raw).unwrap();
        let rec = OpenFoodFactsProvider::map_product(&code("3017620422003"), raw, p);
        assert_eq!(rec.name, "Oat Flakes");
        assert_eq!(rec.brand, UNKNOWN_BRAND);
        assert_eq!(rec.category, FOOD_CATEGORY);
        assert_eq!(rec.image.as_deref(), Some("https://img.example/oats.jpg"));
        assert_eq!(rec.description, "");
        assert_eq!(rec.ingredients.as_deref(), Some("oats"));
        assert_eq!(rec.nutrition, None);
        assert_eq!(rec.nutrition_grade, Some(NutritionGrade::A));
        assert_eq!(rec.nova_group, Some(1));
        assert_eq!(rec.additional_info["servingSize"], "40 g");
        assert_eq!(rec.additional_info["labels"], "");
        assert_eq!(
            rec.url.as_deref(),
            Some("https://world.openfoodfacts.org/product/3017620422003")
        );
    }

    #[test]
    fn status_accepts_number_or_string_one() {
        assert!(is_found_status(&json!(1)));
        assert!(is_found_status(&json!("1")));
        assert!(!is_found_status(&json!(0)));
        assert!(!is_found_status(&Value::Null));
    }
}
