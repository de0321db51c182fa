// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod barcode;
pub mod config;
pub mod lookup;
pub mod metrics;
pub mod product;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::barcode::{NormalizedBarcode, ScannedCode, Symbology, ValidationError};
pub use crate::config::LookupConfig;
pub use crate::lookup::types::{LookupEvent, LookupObserver, ProductProvider, ProviderError};
pub use crate::lookup::ProductResolver;
pub use crate::product::{NutritionFacts, NutritionGrade, ProductRecord, ProductSource};
