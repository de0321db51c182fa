// src/lookup/fallback.rs
//! Placeholder record for codes no database knows. Never touches the network.

use serde_json::{json, Map, Value};

use crate::barcode::NormalizedBarcode;
use crate::product::{ProductRecord, ProductSource};

pub const DEFAULT_CATEGORY: &str = "General Merchandise";

// Heuristic, not GS1-authoritative. Kept literal.
const CATEGORY_BY_PREFIX: &[(&str, &str)] = &[
    ("300", "Food & Beverages"),
    ("400", "Food & Beverages"),
    ("500", "Food & Beverages"),
    ("600", "Food & Beverages"),
    ("700", "Food & Beverages"),
    ("800", "Books & Media"),
    ("900", "Books & Media"),
    ("978", "Books"),
    ("979", "Books"),
    ("012", "Pharmaceuticals"),
    ("013", "Pharmaceuticals"),
    ("030", "Health & Beauty"),
    ("031", "Health & Beauty"),
    ("000", "General Merchandise"),
    ("001", "General Merchandise"),
    ("020", "General Merchandise"),
    ("021", "General Merchandise"),
];

pub const SUGGESTED_ACTIONS: [&str; 3] = [
    "Search online manually",
    "Check manufacturer website",
    "Add to OpenFoodFacts database",
];

/// Category guess from the first three digits.
pub fn guess_category(barcode: &str) -> &'static str {
    let prefix = barcode.get(..3).unwrap_or(barcode);
    CATEGORY_BY_PREFIX
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Link for adding a missing product to OpenFoodFacts.
pub fn contribute_url(barcode: &str) -> String {
    format!("https://world.openfoodfacts.org/cgi/product_jqm2.pl?code={barcode}&action=display")
}

pub fn synthesize(barcode: &NormalizedBarcode) -> ProductRecord {
    let code = barcode.as_str();
    let mut rec = ProductRecord::found(ProductSource::Fallback, barcode);
    rec.category = guess_category(barcode.prefix()).to_string();
    rec.description = format!("Product with barcode {code}");

    let mut info = Map::new();
    info.insert(
        "note".into(),
        Value::String(
            "Product information not found in database. You can help by adding this product \
             to OpenFoodFacts or other product databases."
                .into(),
        ),
    );
    info.insert("suggestedActions".into(), json!(SUGGESTED_ACTIONS));
    rec.additional_info = info;

    rec.url = Some(contribute_url(code));
    rec.is_unknown = Some(true);
    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{UNKNOWN_BRAND, UNKNOWN_PRODUCT};

    #[test]
    fn every_listed_prefix_maps_literally() {
        let cases = [
            ("30012345", "Food & Beverages"),
            ("40012345", "Food & Beverages"),
            ("50012345", "Food & Beverages"),
            ("60012345", "Food & Beverages"),
            ("70012345", "Food & Beverages"),
            ("80012345", "Books & Media"),
            ("90012345", "Books & Media"),
            ("97812345", "Books"),
            ("97912345", "Books"),
            ("01212345", "Pharmaceuticals"),
            ("01312345", "Pharmaceuticals"),
            ("03012345", "Health & Beauty"),
            ("03112345", "Health & Beauty"),
            ("00012345", "General Merchandise"),
            ("00112345", "General Merchandise"),
            ("02012345", "General Merchandise"),
            ("02112345", "General Merchandise"),
        ];
        for (code, want) in cases {
            assert_eq!(guess_category(code), want, "prefix of {code}");
        }
    }

    #[test]
    fn unmapped_prefixes_default() {
        for code in ["40612345", "50612345", "12345678", "977123456789", "12"] {
            assert_eq!(guess_category(code), DEFAULT_CATEGORY, "{code}");
        }
    }

    #[test]
    fn synthesized_record_is_complete() {
        let code = NormalizedBarcode::parse("9780134685991").unwrap();
        let rec = synthesize(&code);
        assert!(rec.found);
        assert!(rec.is_unknown());
        assert_eq!(rec.source, ProductSource::Fallback);
        assert_eq!(rec.barcode, "9780134685991");
        assert_eq!(rec.name, UNKNOWN_PRODUCT);
        assert_eq!(rec.brand, UNKNOWN_BRAND);
        assert_eq!(rec.category, "Books");
        assert_eq!(rec.description, "Product with barcode 9780134685991");
        assert_eq!(rec.image, None);
        assert_eq!(rec.raw_data, None);
        assert_eq!(
            rec.additional_info["suggestedActions"],
            serde_json::json!(SUGGESTED_ACTIONS)
        );
        assert_eq!(
            rec.url.as_deref(),
            Some("https://world.openfoodfacts.org/cgi/product_jqm2.pl?code=9780134685991&action=display")
        );
    }
}
